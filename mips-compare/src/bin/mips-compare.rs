use clap::{Arg, ArgAction, Command, value_parser};
use log::info;
use mips_compare::{CompareConfig, ReportFormat, RunOptions, SeriesSpec, run_comparison};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let matches = Command::new("mips-compare")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compare dhrystone MIPS results against the recorded best and flag regressions")
        .arg(
            Arg::new("new_file")
                .value_name("NEW_FILE")
                .help("Metrics of the current run; updated in place unless --no_update")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("old_file")
                .value_name("OLD_FILE")
                .help("Metrics holding the recorded best; seeded from NEW_FILE when missing")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("revision")
                .value_name("REVISION")
                .help("Revision of the current run, e.g. a git commit hash")
                .required(true),
        )
        .arg(
            Arg::new("tolerance")
                .short('t')
                .long("tolerance")
                .value_name("FRACTION")
                .help("Relative drop on every series that counts as a major regression [default: 0.2]")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("no_update")
                .short('n')
                .long("no_update")
                .visible_alias("no-update")
                .help("Compute and report, but do not write the updated record")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Report file path [default: mips_issue_text.md]")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Report format (markdown, json)"),
        )
        .arg(
            Arg::new("series")
                .short('s')
                .long("series")
                .value_name("KEY[=LABEL]")
                .help("Tracked series; repeat for each one (replaces the default TCC/GCC/LLVM set)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => CompareConfig::from_file(path)?,
        None => CompareConfig::default(),
    };

    // Override config with command line arguments
    if let Some(tolerance) = matches.get_one::<f64>("tolerance") {
        config.tolerance = *tolerance;
    }
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        config.report.output_path = output.clone();
    }
    if let Some(format) = matches.get_one::<String>("format") {
        config.report.format = format.parse::<ReportFormat>()?;
    }
    if let Some(series) = matches.get_many::<String>("series") {
        config.series = series
            .map(|spec| SeriesSpec::parse(spec))
            .collect::<Result<_, _>>()?;
    }

    let options = RunOptions {
        current_path: matches
            .get_one::<PathBuf>("new_file")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("NEW_FILE is required"))?,
        history_path: matches
            .get_one::<PathBuf>("old_file")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("OLD_FILE is required"))?,
        revision: matches
            .get_one::<String>("revision")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("REVISION is required"))?,
        dry_run: matches.get_flag("no_update"),
    };

    let outcome = run_comparison(&config, &options)?;

    info!("Verdict: {}", outcome.evaluation.verdict);
    for series in &outcome.evaluation.series {
        info!(
            "  {}: {} (best {}, {:+.2}%)",
            series.label,
            series.current_value,
            series.previous_best,
            series.relative_diff * 100.0
        );
    }

    Ok(())
}
