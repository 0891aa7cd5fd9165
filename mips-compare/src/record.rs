//! 指标记录与历史最佳记录
//!
//! 当前运行文件和历史文件使用同一种扁平 JSON 对象：字符串键映射到标量值。
//! 当前运行文件必须包含每个序列的 `{key}`；历史文件可以包含
//! `best_{key}`、`best_revision` 和 `regressed_revision`。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::config::SeriesSpec;
use crate::error::{CompareError, Result};

/// 扁平 JSON 对象
pub type Payload = serde_json::Map<String, Value>;

/// 尚无最佳值时使用的占位值，避免除以零
pub const BEST_EPSILON: f64 = 1e-8;

pub const BEST_REVISION_KEY: &str = "best_revision";
pub const REGRESSED_REVISION_KEY: &str = "regressed_revision";

/// 一次测量中各序列的值（越大越好）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    values: BTreeMap<String, f64>,
}

/// 持久化的历史最佳记录
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// 各序列的历史最佳值；缺失的序列按 [`BEST_EPSILON`] 处理
    pub best: BTreeMap<String, f64>,
    /// 产生当前最佳值的修订
    pub best_revision: Option<String>,
    /// 首次检测到尚未解决的严重回归的修订
    pub regressed_revision: Option<String>,
}

impl MetricSet {
    pub fn new(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    /// 从当前运行的载荷中提取所有配置的序列
    pub fn from_payload(payload: &Payload, series: &[SeriesSpec], origin: &str) -> Result<Self> {
        let mut values = BTreeMap::new();
        for spec in series {
            let value = payload
                .get(&spec.key)
                .ok_or_else(|| {
                    CompareError::malformed(origin, format!("missing metric '{}'", spec.key))
                })?
                .as_f64()
                .ok_or_else(|| {
                    CompareError::malformed(origin, format!("metric '{}' is not a number", spec.key))
                })?;
            if !value.is_finite() || value <= 0.0 {
                return Err(CompareError::malformed(
                    origin,
                    format!("metric '{}' must be positive, got {value}", spec.key),
                ));
            }
            values.insert(spec.key.clone(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl HistoryRecord {
    /// 首次运行的基线：最佳值等于当前值，没有修订信息
    pub fn baseline(current: &MetricSet) -> Self {
        Self {
            best: current.iter().map(|(k, v)| (k.to_string(), v)).collect(),
            best_revision: None,
            regressed_revision: None,
        }
    }

    /// 从历史载荷解析；`null` 与缺失等价
    ///
    /// 所有序列的最佳值要么全部存在，要么全部缺失。
    pub fn from_payload(payload: &Payload, series: &[SeriesSpec], origin: &str) -> Result<Self> {
        let mut best = BTreeMap::new();
        for spec in series {
            let key = spec.best_key();
            match payload.get(&key) {
                None | Some(Value::Null) => {}
                Some(value) => {
                    let value = value.as_f64().ok_or_else(|| {
                        CompareError::malformed(origin, format!("'{key}' is not a number"))
                    })?;
                    if !value.is_finite() || value <= 0.0 {
                        return Err(CompareError::malformed(
                            origin,
                            format!("'{key}' must be positive, got {value}"),
                        ));
                    }
                    best.insert(spec.key.clone(), value);
                }
            }
        }

        if !best.is_empty() && best.len() != series.len() {
            let missing: Vec<String> = series
                .iter()
                .filter(|spec| !best.contains_key(&spec.key))
                .map(SeriesSpec::best_key)
                .collect();
            return Err(CompareError::malformed(
                origin,
                format!("incomplete best record, missing {}", missing.join(", ")),
            ));
        }

        Ok(Self {
            best,
            best_revision: optional_revision(payload, BEST_REVISION_KEY, origin)?,
            regressed_revision: optional_revision(payload, REGRESSED_REVISION_KEY, origin)?,
        })
    }

    /// 序列的最佳值，未记录时为 [`BEST_EPSILON`]
    pub fn best_for(&self, key: &str) -> f64 {
        self.best.get(key).copied().unwrap_or(BEST_EPSILON)
    }

    /// 将历史字段合并进当前运行的载荷；只写入实际记录过的最佳值
    pub fn merge_into(&self, payload: &mut Payload, series: &[SeriesSpec]) {
        for spec in series {
            if let Some(&best) = self.best.get(&spec.key) {
                payload.insert(spec.best_key(), Value::from(best));
            }
        }
        payload.insert(
            BEST_REVISION_KEY.to_string(),
            self.best_revision.clone().map_or(Value::Null, Value::String),
        );
        payload.insert(
            REGRESSED_REVISION_KEY.to_string(),
            self.regressed_revision
                .clone()
                .map_or(Value::Null, Value::String),
        );
    }
}

fn optional_revision(payload: &Payload, key: &str, origin: &str) -> Result<Option<String>> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(revision)) => Ok(Some(revision.clone())),
        Some(other) => Err(CompareError::malformed(
            origin,
            format!("'{key}' must be a string or null, got {other}"),
        )),
    }
}
