//! 单次比较流程：校验、初始化历史、加载、判定、持久化、报告

use log::{info, warn};
use std::path::PathBuf;

use crate::config::CompareConfig;
use crate::detector::{Evaluation, RegressionDetector, validate_revision};
use crate::error::{CompareError, Result};
use crate::record::{HistoryRecord, MetricSet};
use crate::reporter::RegressionReporter;
use crate::storage::{JsonFileStorage, RecordStorage};

/// 一次运行的输入
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// 当前运行的指标文件，持久化时原地覆盖
    pub current_path: PathBuf,
    /// 历史指标文件
    pub history_path: PathBuf,
    /// 当前运行的修订，例如 commit hash
    pub revision: String,
    /// 只计算和报告，不写回记录
    pub dry_run: bool,
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub evaluation: Evaluation,
    /// 历史文件缺失并已由当前文件初始化
    pub seeded: bool,
    /// 更新后的记录已写回
    pub persisted: bool,
    pub report_path: PathBuf,
}

/// 基于本地 JSON 文件执行一次比较
pub fn run_comparison(config: &CompareConfig, options: &RunOptions) -> Result<RunOutcome> {
    let current = JsonFileStorage::new(&options.current_path);
    let history = JsonFileStorage::new(&options.history_path);
    compare_records(config, &current, &history, &options.revision, options.dry_run)
}

/// 执行一次比较
///
/// 报告和更新后的记录先写入暂存文件，两者都写入成功后才替换目标文件，
/// 记录最后提交。历史记录初始化是唯一的提前副作用。
pub fn compare_records<S: RecordStorage>(
    config: &CompareConfig,
    current: &S,
    history: &S,
    revision: &str,
    dry_run: bool,
) -> Result<RunOutcome> {
    config.validate()?;
    validate_revision(revision)?;

    if !current.exists() {
        return Err(CompareError::MissingInput {
            path: PathBuf::from(current.location()),
        });
    }

    let seeded = !history.exists();
    if seeded {
        warn!(
            "file to compare against does not exist, assuming first compare: seeding {} from {}",
            history.location(),
            current.location()
        );
        history.seed_from(current)?;
    }

    let mut payload = current.load()?;
    let metrics = MetricSet::from_payload(&payload, &config.series, &current.location())?;
    let record = if seeded {
        HistoryRecord::baseline(&metrics)
    } else {
        HistoryRecord::from_payload(&history.load()?, &config.series, &history.location())?
    };

    let detector = RegressionDetector::new(config.clone());
    let evaluation = detector.evaluate(&metrics, &record, revision)?;

    let reporter = RegressionReporter::new(config.report.clone());
    let report = reporter.generate_report(&evaluation)?;

    let staged_report = reporter.stage_report(&report)?;
    let staged_record = if dry_run {
        None
    } else {
        evaluation.updated.merge_into(&mut payload, &config.series);
        Some(current.stage(&payload)?)
    };

    staged_report.commit()?;
    info!("report written to {}", reporter.output_path().display());

    match staged_record {
        Some(record) => {
            record.commit()?;
            info!("updated record written to {}", current.location());
        }
        None => info!("dry run, {} left unchanged", current.location()),
    }

    Ok(RunOutcome {
        evaluation,
        seeded,
        persisted: !dry_run,
        report_path: reporter.output_path().to_path_buf(),
    })
}
