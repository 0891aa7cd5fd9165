//! 端到端比较流程测试
//!
//! 在临时目录中模拟 CI 的连续多次运行。

use anyhow::Result;
use mips_compare::{CompareConfig, ReportConfig, RunOptions, Verdict, run_comparison};
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

struct Pipeline {
    dir: TempDir,
    config: CompareConfig,
}

impl Pipeline {
    fn new() -> Result<Self> {
        let dir = tempdir()?;
        let config = CompareConfig {
            report: ReportConfig {
                output_path: dir.path().join("mips_issue_text.md"),
                ..ReportConfig::default()
            },
            ..CompareConfig::default()
        };
        Ok(Self { dir, config })
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    /// 写入本次基准测试结果并执行比较，然后像 CI 一样把结果保存为下一次的历史
    fn run(&self, revision: &str, tcc: f64, gcc: f64, llvm: f64) -> Result<Verdict> {
        write_metrics(&self.path("new.json"), tcc, gcc, llvm)?;
        let outcome = run_comparison(
            &self.config,
            &RunOptions {
                current_path: self.path("new.json"),
                history_path: self.path("old.json"),
                revision: revision.to_string(),
                dry_run: false,
            },
        )?;
        fs::copy(self.path("new.json"), self.path("old.json"))?;
        Ok(outcome.evaluation.verdict)
    }

    fn stored(&self) -> Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(self.path("new.json"))?)?)
    }

    fn report(&self) -> Result<String> {
        Ok(fs::read_to_string(self.path("mips_issue_text.md"))?)
    }
}

fn write_metrics(path: &Path, tcc: f64, gcc: f64, llvm: f64) -> Result<()> {
    let payload = json!({ "mips_tcc": tcc, "mips_gcc": gcc, "mips_llvm": llvm });
    fs::write(path, serde_json::to_string(&payload)?)?;
    Ok(())
}

#[test]
fn first_run_seeds_history_as_neutral_baseline() -> Result<()> {
    let pipeline = Pipeline::new()?;
    write_metrics(&pipeline.path("new.json"), 1000.0, 2000.0, 3000.0)?;

    let outcome = run_comparison(
        &pipeline.config,
        &RunOptions {
            current_path: pipeline.path("new.json"),
            history_path: pipeline.path("old.json"),
            revision: "c0ffee".to_string(),
            dry_run: false,
        },
    )?;

    assert!(outcome.seeded);
    assert!(pipeline.path("old.json").exists());
    assert_eq!(outcome.evaluation.verdict, Verdict::Unchanged);
    assert_eq!(outcome.evaluation.updated.best_for("mips_tcc"), 1000.0);
    assert_eq!(outcome.evaluation.updated.best_for("mips_gcc"), 2000.0);
    assert_eq!(outcome.evaluation.updated.best_for("mips_llvm"), 3000.0);
    assert_eq!(outcome.evaluation.updated.best_revision, None);
    assert_eq!(outcome.evaluation.updated.regressed_revision, None);

    let stored = pipeline.stored()?;
    assert_eq!(stored["best_mips_gcc"], json!(2000.0));
    assert_eq!(stored["best_revision"], Value::Null);
    assert_eq!(stored["regressed_revision"], Value::Null);

    assert!(
        pipeline
            .report()?
            .contains("No significant performance change for TCCJIT")
    );
    Ok(())
}

#[test]
fn regression_lifecycle_across_runs() -> Result<()> {
    let pipeline = Pipeline::new()?;

    assert_eq!(pipeline.run("r0", 1000.0, 2000.0, 3000.0)?, Verdict::Unchanged);
    assert_eq!(pipeline.run("r1", 1100.0, 2100.0, 3100.0)?, Verdict::NewBest);
    assert_eq!(pipeline.stored()?["best_revision"], json!("r1"));

    assert_eq!(
        pipeline.run("r2", 700.0, 1500.0, 2000.0)?,
        Verdict::MajorRegression { introduced: true }
    );
    assert!(
        pipeline
            .report()?
            .contains("⚠ Major regression introduced in commit r2 ⚠")
    );
    assert!(pipeline.report()?.contains("(recorded in commit r1)"));

    assert_eq!(
        pipeline.run("r3", 710.0, 1510.0, 2010.0)?,
        Verdict::MajorRegression { introduced: false }
    );
    assert!(pipeline.report()?.contains("⚠ Major regression since commit r2 ⚠"));
    assert_eq!(pipeline.stored()?["regressed_revision"], json!("r2"));
    assert_eq!(pipeline.stored()?["best_mips_tcc"], json!(1100.0));

    assert_eq!(
        pipeline.run("r4", 1050.0, 2000.0, 3000.0)?,
        Verdict::RegressionCleared
    );
    assert_eq!(pipeline.stored()?["regressed_revision"], Value::Null);
    assert_eq!(pipeline.stored()?["best_revision"], json!("r1"));

    assert_eq!(pipeline.run("r5", 1050.0, 2000.0, 3000.0)?, Verdict::Unchanged);
    Ok(())
}

#[test]
fn dry_run_is_repeatable() -> Result<()> {
    let pipeline = Pipeline::new()?;
    pipeline.run("base", 1000.0, 2000.0, 3000.0)?;
    write_metrics(&pipeline.path("new.json"), 1100.0, 1900.0, 3100.0)?;

    let options = RunOptions {
        current_path: pipeline.path("new.json"),
        history_path: pipeline.path("old.json"),
        revision: "mixed".to_string(),
        dry_run: true,
    };
    let first = run_comparison(&pipeline.config, &options)?;
    let second = run_comparison(&pipeline.config, &options)?;

    assert_eq!(first.evaluation, second.evaluation);
    assert_eq!(first.evaluation.verdict, Verdict::Unchanged);
    assert!(pipeline.stored()?.get("best_mips_tcc").is_none());
    Ok(())
}

#[test]
fn custom_tolerance_changes_verdict() -> Result<()> {
    let mut pipeline = Pipeline::new()?;
    pipeline.run("base", 1000.0, 2000.0, 3000.0)?;

    // 10% 的下降在默认 20% 阈值下不算严重回归
    assert_eq!(pipeline.run("dip", 900.0, 1800.0, 2700.0)?, Verdict::Unchanged);

    pipeline.config.tolerance = 0.05;
    assert_eq!(
        pipeline.run("dip2", 900.0, 1800.0, 2700.0)?,
        Verdict::MajorRegression { introduced: true }
    );
    Ok(())
}
