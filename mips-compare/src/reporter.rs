//! 比较报告生成器

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::config::{ReportConfig, ReportFormat};
use crate::detector::Evaluation;
use crate::error::Result;
use crate::storage::StagedFile;

const FOOTER: &str =
    "<sub>This comment was created automatically, please do not change!</sub>\n";

/// 比较报告生成器
pub struct RegressionReporter {
    config: ReportConfig,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

impl RegressionReporter {
    /// 创建新的报告生成器
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    /// 生成报告内容
    pub fn generate_report(&self, evaluation: &Evaluation) -> Result<String> {
        match self.config.format {
            ReportFormat::Markdown => Ok(self.generate_markdown_report(evaluation)),
            ReportFormat::Json => self.generate_json_report(evaluation),
        }
    }

    /// 将报告写入暂存文件，提交后覆盖报告路径
    pub fn stage_report(&self, content: &str) -> Result<StagedFile> {
        StagedFile::write(&self.config.output_path, content.as_bytes())
    }

    /// 生成 Markdown 格式报告
    ///
    /// 展示的是更新前的最佳值及其修订，即本次比较所用的基准。
    fn generate_markdown_report(&self, evaluation: &Evaluation) -> String {
        let best_revision = evaluation
            .previous
            .best_revision
            .as_deref()
            .unwrap_or("None");

        // 数值保留小数点，例如 1100.0
        let mut report = String::new();
        for outcome in &evaluation.series {
            report.push_str(&format!(
                "**Status** (for commit {})**:** {}\n\n",
                evaluation.revision, outcome.message
            ));
            report.push_str(&format!(
                "**Current dhrystone MIPS for {}** **:** {:?}\n",
                outcome.label, outcome.current_value
            ));
            report.push_str(&format!(
                "**Previous best for {}** (recorded in commit {})**:** {:?}, difference {:+.2}%\n\n",
                outcome.label,
                best_revision,
                outcome.previous_best,
                outcome.relative_diff * 100.0
            ));
        }
        report.push('\n');
        report.push_str(FOOTER);
        report
    }

    /// 生成JSON格式报告
    fn generate_json_report(&self, evaluation: &Evaluation) -> Result<String> {
        let report = JsonReport {
            generated_at: Utc::now(),
            evaluation,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
