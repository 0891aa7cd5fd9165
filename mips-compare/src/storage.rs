//! 指标文件存储

use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{CompareError, Result};
use crate::record::Payload;

/// 指标记录存储接口
pub trait RecordStorage {
    /// 用于日志和错误信息的位置描述
    fn location(&self) -> String;

    /// 记录是否存在
    fn exists(&self) -> bool;

    /// 读取扁平 JSON 对象
    fn load(&self) -> Result<Payload>;

    /// 将扁平 JSON 对象写入暂存文件，提交后才覆盖原记录
    fn stage(&self, payload: &Payload) -> Result<StagedFile>;

    /// 覆盖写入扁平 JSON 对象
    fn store(&self, payload: &Payload) -> Result<()> {
        self.stage(payload)?.commit()
    }

    /// 以另一条记录的原始内容初始化本记录
    fn seed_from(&self, source: &Self) -> Result<()>
    where
        Self: Sized;
}

/// 与目标文件同目录的暂存文件
///
/// 未提交即丢弃时删除暂存文件，目标文件保持原样。
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// 在目标文件所在目录写入完整内容
    pub fn write(target: impl Into<PathBuf>, content: &[u8]) -> Result<Self> {
        let target = target.into();
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| CompareError::io(&target, e))?;
        temp.write_all(content)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| CompareError::io(&target, e))?;
        Ok(Self { temp, target })
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// 以重命名方式替换目标文件
    pub fn commit(self) -> Result<()> {
        let Self { temp, target } = self;
        temp.persist(&target)
            .map_err(|e| CompareError::io(&target, e.error))?;
        Ok(())
    }
}

/// 本地 JSON 文件存储实现
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStorage for JsonFileStorage {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> Result<Payload> {
        let content = fs::read_to_string(&self.path).map_err(|e| CompareError::io(&self.path, e))?;
        serde_json::from_str::<Payload>(&content)
            .map_err(|e| CompareError::malformed(self.location(), e.to_string()))
    }

    fn stage(&self, payload: &Payload) -> Result<StagedFile> {
        let content = serde_json::to_string(payload)?;
        let staged = StagedFile::write(&self.path, content.as_bytes())?;
        debug!("staged {} keys for {}", payload.len(), self.path.display());
        Ok(staged)
    }

    fn seed_from(&self, source: &Self) -> Result<()> {
        fs::copy(&source.path, &self.path).map_err(|e| CompareError::io(&self.path, e))?;
        Ok(())
    }
}
