//! 回归判定算法
//!
//! 对每个序列计算相对历史最佳值的变化 `current / best - 1`，
//! 然后对全部序列整体判定：
//!
//! 1. 所有序列的变化都低于 `-tolerance`：严重回归，最佳值不变；
//! 2. 所有序列都严格超过最佳值：新的最佳值；
//! 3. 其他情况：无显著变化，若此前存在回归则清除。
//!
//! 提升方向不受阈值限制，只要求严格大于。

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{CompareConfig, SeriesSpec};
use crate::error::{CompareError, Result};
use crate::record::{HistoryRecord, MetricSet};

/// 整体判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// 严重回归；`introduced` 表示本次运行首次检测到
    MajorRegression { introduced: bool },
    /// 所有序列都创造了新的最佳值
    NewBest,
    /// 之前的严重回归已不再成立
    RegressionCleared,
    /// 无显著变化
    Unchanged,
}

/// 单个序列的比较结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub key: String,
    pub label: String,
    pub current_value: f64,
    /// 本次比较所用的历史最佳值（更新前）
    pub previous_best: f64,
    /// `current_value / previous_best - 1`
    pub relative_diff: f64,
    pub message: String,
}

/// 一次完整的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub revision: String,
    pub tolerance: f64,
    pub verdict: Verdict,
    /// 按配置顺序排列
    pub series: Vec<SeriesOutcome>,
    /// 更新前的历史记录
    pub previous: HistoryRecord,
    /// 更新后的历史记录
    pub updated: HistoryRecord,
}

/// 性能回归检测器
pub struct RegressionDetector {
    config: CompareConfig,
}

impl Verdict {
    pub fn is_major_regression(self) -> bool {
        matches!(self, Self::MajorRegression { .. })
    }

    fn message(self, series: &SeriesSpec, regressed_revision: Option<&str>) -> String {
        let revision = regressed_revision.unwrap_or("None");
        match self {
            Self::MajorRegression { introduced: true } => {
                format!("⚠ Major regression introduced in commit {revision} ⚠")
            }
            Self::MajorRegression { introduced: false } => {
                format!("⚠ Major regression since commit {revision} ⚠")
            }
            Self::NewBest => format!("🥇 New best performance for {}!", series.label),
            Self::RegressionCleared => "Regression cleared".to_string(),
            Self::Unchanged => format!("No significant performance change for {}", series.label),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MajorRegression { introduced: true } => write!(f, "major regression introduced"),
            Self::MajorRegression { introduced: false } => write!(f, "major regression"),
            Self::NewBest => write!(f, "new best"),
            Self::RegressionCleared => write!(f, "regression cleared"),
            Self::Unchanged => write!(f, "no significant change"),
        }
    }
}

impl RegressionDetector {
    /// 创建新的回归检测器
    pub fn new(config: CompareConfig) -> Self {
        Self { config }
    }

    /// 将当前测量与历史最佳记录比较，返回判定和更新后的记录
    ///
    /// 不做任何 I/O，相同输入总是得到相同结果。
    pub fn evaluate(
        &self,
        current: &MetricSet,
        history: &HistoryRecord,
        revision: &str,
    ) -> Result<Evaluation> {
        validate_revision(revision)?;
        self.config.validate()?;
        let tolerance = self.config.tolerance;

        let mut samples = Vec::with_capacity(self.config.series.len());
        for spec in &self.config.series {
            let value = current.get(&spec.key).ok_or_else(|| {
                CompareError::malformed("current metrics", format!("missing metric '{}'", spec.key))
            })?;
            let best = history.best_for(&spec.key);
            let relative_diff = value / best - 1.0;
            debug!(
                "{}: current {value}, best {best}, difference {:+.2}%",
                spec.key,
                relative_diff * 100.0
            );
            samples.push((spec, value, best, relative_diff));
        }

        let all_regressed = samples.iter().all(|&(_, _, _, diff)| diff < -tolerance);
        let all_improved = samples.iter().all(|&(_, value, best, _)| value > best);

        let mut updated = history.clone();
        let verdict = if all_regressed {
            let introduced = updated.regressed_revision.is_none();
            if introduced {
                updated.regressed_revision = Some(revision.to_string());
            }
            Verdict::MajorRegression { introduced }
        } else if all_improved {
            for &(spec, value, _, _) in &samples {
                updated.best.insert(spec.key.clone(), value);
            }
            updated.best_revision = Some(revision.to_string());
            updated.regressed_revision = None;
            Verdict::NewBest
        } else if updated.regressed_revision.take().is_some() {
            Verdict::RegressionCleared
        } else {
            Verdict::Unchanged
        };

        info!("{verdict} (commit {revision})");

        let series = samples
            .into_iter()
            .map(|(spec, value, best, relative_diff)| SeriesOutcome {
                key: spec.key.clone(),
                label: spec.label.clone(),
                current_value: value,
                previous_best: best,
                relative_diff,
                message: verdict.message(spec, updated.regressed_revision.as_deref()),
            })
            .collect();

        Ok(Evaluation {
            revision: revision.to_string(),
            tolerance,
            verdict,
            series,
            previous: history.clone(),
            updated,
        })
    }
}

/// 修订标识不能为空；空字符串只允许出现在历史文件中
pub(crate) fn validate_revision(revision: &str) -> Result<()> {
    if revision.is_empty() {
        return Err(CompareError::InvalidConfig(
            "revision identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}
