//! 比较工具配置

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{CompareError, Result};

/// 默认回归阈值（20%）
pub const DEFAULT_TOLERANCE: f64 = 0.2;

/// 默认报告输出路径
pub const DEFAULT_REPORT_PATH: &str = "mips_issue_text.md";

/// MIPS 比较配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// 跟踪的指标序列
    pub series: Vec<SeriesSpec>,
    /// 严重回归的最小相对下降幅度
    pub tolerance: f64,
    /// 报告配置
    pub report: ReportConfig,
}

/// 单个指标序列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// 指标文件中的键，例如 `mips_tcc`
    pub key: String,
    /// 报告中显示的名称，例如 `TCCJIT`
    pub label: String,
}

/// 报告配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 报告格式
    pub format: ReportFormat,
    /// 输出路径
    pub output_path: PathBuf,
}

/// 报告格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown 格式（CI issue 评论）
    #[default]
    Markdown,
    /// JSON格式
    Json,
}

impl SeriesSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// 解析 `KEY` 或 `KEY=LABEL`；省略标签时使用键本身
    pub fn parse(spec: &str) -> Result<Self> {
        let (key, label) = match spec.split_once('=') {
            Some((key, label)) => (key.trim(), label.trim()),
            None => (spec.trim(), spec.trim()),
        };
        if key.is_empty() || label.is_empty() {
            return Err(CompareError::InvalidConfig(format!(
                "invalid series specification '{spec}', expected KEY or KEY=LABEL"
            )));
        }
        Ok(Self::new(key, label))
    }

    /// 历史文件中保存最佳值的键
    pub fn best_key(&self) -> String {
        format!("best_{}", self.key)
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            series: vec![
                SeriesSpec::new("mips_tcc", "TCCJIT"),
                SeriesSpec::new("mips_gcc", "GCCJIT"),
                SeriesSpec::new("mips_llvm", "LLVMJIT"),
            ],
            tolerance: DEFAULT_TOLERANCE,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: ReportFormat::Markdown,
            output_path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(CompareError::InvalidConfig(format!(
                "unsupported report format: {other}"
            ))),
        }
    }
}

impl CompareConfig {
    /// 从文件加载配置
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| CompareError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// 校验序列列表和阈值
    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(CompareError::InvalidConfig(
                "at least one series must be tracked".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for series in &self.series {
            if !seen.insert(series.key.as_str()) {
                return Err(CompareError::InvalidConfig(format!(
                    "duplicate series key: {}",
                    series.key
                )));
            }
        }

        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(CompareError::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }
}
