//! 比较工具的错误类型

use std::path::PathBuf;
use thiserror::Error;

/// MIPS 比较过程中的错误
#[derive(Error, Debug)]
pub enum CompareError {
    /// 当前运行的指标文件不存在
    #[error("file to compare does not exist: {}", path.display())]
    MissingInput { path: PathBuf },

    /// 输入无法解析为期望的键值结构
    #[error("malformed input in {origin}: {reason}")]
    MalformedInput { origin: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompareError {
    pub(crate) fn malformed(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CompareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_input() {
        let missing = CompareError::MissingInput {
            path: PathBuf::from("dhry.json"),
        };
        assert_eq!(
            missing.to_string(),
            "file to compare does not exist: dhry.json"
        );

        let malformed = CompareError::malformed("old.json", "best_mips_tcc is not a number");
        assert_eq!(
            malformed.to_string(),
            "malformed input in old.json: best_mips_tcc is not a number"
        );
    }
}
