//! Dhrystone MIPS 最佳值跟踪与回归检测
//!
//! 本模块提供 CI 基准测试后的单次比较功能，包括：
//! - 指标与历史最佳记录解析
//! - 严重回归 / 新最佳值判定
//! - 历史记录更新与持久化
//! - 报告生成

pub mod config;
pub mod detector;
pub mod error;
pub mod record;
pub mod reporter;
pub mod runner;
pub mod storage;

pub use config::{CompareConfig, ReportConfig, ReportFormat, SeriesSpec};
pub use detector::{Evaluation, RegressionDetector, SeriesOutcome, Verdict};
pub use error::{CompareError, Result};
pub use record::{HistoryRecord, MetricSet, Payload};
pub use reporter::RegressionReporter;
pub use runner::{RunOptions, RunOutcome, compare_records, run_comparison};
pub use storage::{JsonFileStorage, RecordStorage};
