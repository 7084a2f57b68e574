//! Metrics Diff Tool
//!
//! Compares two metrics reports and flags regressions.
//!
//! Exit codes:
//! - 0: every metric within range
//! - 1: warnings
//! - 2: failures, or unreadable input
//!
//! Usage:
//!   metrics-diff baseline.json current.json
//!   metrics-diff baseline.json current.json --format json
//!   metrics-diff baseline.json current.json --threshold-warning 0.05 --threshold-failure 0.10

use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use tilemine_testkit::{load_metrics, MetricsReport};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare tilemine metrics reports", long_about = None)]
struct Args {
    /// Baseline report
    baseline: PathBuf,

    /// Report to check against the baseline
    current: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Relative degradation that triggers a warning
    #[arg(long, default_value_t = 0.05)]
    threshold_warning: f64,

    /// Relative degradation that triggers a failure
    #[arg(long, default_value_t = 0.10)]
    threshold_failure: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// How a metric is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    LowerIsBetter,
    HigherIsBetter,
    /// Determinism counters: any change fails.
    Exact,
}

#[derive(Debug)]
struct MetricDiff {
    name: String,
    baseline: f64,
    current: f64,
    change_percent: f64,
    status: DiffStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffStatus {
    Pass,
    Warning,
    Failure,
}

impl DiffStatus {
    fn label(self) -> &'static str {
        match self {
            DiffStatus::Pass => "PASS",
            DiffStatus::Warning => "WARN",
            DiffStatus::Failure => "FAIL",
        }
    }
}

struct Thresholds {
    warning: f64,
    failure: f64,
}

fn compare_metric(
    name: &str,
    baseline: f64,
    current: f64,
    thresholds: &Thresholds,
    direction: Direction,
) -> MetricDiff {
    let change_percent = if baseline == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        (current - baseline) / baseline * 100.0
    };

    // positive = worse
    let degradation = match direction {
        Direction::LowerIsBetter => change_percent,
        Direction::HigherIsBetter => -change_percent,
        Direction::Exact => change_percent.abs(),
    };

    let status = if direction == Direction::Exact && baseline != current {
        DiffStatus::Failure
    } else if degradation > thresholds.failure * 100.0 {
        DiffStatus::Failure
    } else if degradation > thresholds.warning * 100.0 {
        DiffStatus::Warning
    } else {
        DiffStatus::Pass
    };

    MetricDiff {
        name: name.to_string(),
        baseline,
        current,
        change_percent,
        status,
    }
}

fn compare_reports(
    baseline: &MetricsReport,
    current: &MetricsReport,
    thresholds: &Thresholds,
) -> Vec<MetricDiff> {
    let mut diffs = Vec::new();
    let mut push = |name: &str, b: f64, c: f64, direction| {
        diffs.push(compare_metric(name, b, c, thresholds, direction));
    };

    if let (Some(b), Some(c)) = (&baseline.terrain, &current.terrain) {
        push(
            "terrain.avg_classify_time_ns",
            b.avg_classify_time_ns,
            c.avg_classify_time_ns,
            Direction::LowerIsBetter,
        );
        push(
            "terrain.tiles_per_second",
            b.tiles_per_second,
            c.tiles_per_second,
            Direction::HigherIsBetter,
        );
        if b.tiles_classified == c.tiles_classified {
            push(
                "terrain.road_fraction",
                b.road_fraction,
                c.road_fraction,
                Direction::Exact,
            );
        }
    }

    if let (Some(b), Some(c)) = (&baseline.resources, &current.resources) {
        push(
            "resources.avg_pass_time_us",
            b.avg_pass_time_us,
            c.avg_pass_time_us,
            Direction::LowerIsBetter,
        );
        push(
            "resources.nodes_spawned",
            b.nodes_spawned as f64,
            c.nodes_spawned as f64,
            Direction::Exact,
        );
        push(
            "resources.spacing_violations",
            b.spacing_violations as f64,
            c.spacing_violations as f64,
            Direction::LowerIsBetter,
        );
    }

    if let (Some(b), Some(c)) = (&baseline.mining, &current.mining) {
        push(
            "mining.extractions",
            b.extractions as f64,
            c.extractions as f64,
            Direction::Exact,
        );
    }

    push(
        "execution.duration_seconds",
        baseline.test_execution.duration_seconds,
        current.test_execution.duration_seconds,
        Direction::LowerIsBetter,
    );

    diffs
}

fn count(diffs: &[MetricDiff], status: DiffStatus) -> usize {
    diffs.iter().filter(|d| d.status == status).count()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

fn print_text_report(diffs: &[MetricDiff], baseline: &MetricsReport, current: &MetricsReport, args: &Args) {
    println!("Metrics Diff Report");
    println!();
    println!("Baseline:  {}", args.baseline.display());
    println!("Current:   {}", args.current.display());
    println!("Test:      {} → {}", baseline.test_name, current.test_name);
    println!("Result:    {:?} → {:?}", baseline.result, current.result);
    println!(
        "Thresholds: warning {}%, failure {}%",
        args.threshold_warning * 100.0,
        args.threshold_failure * 100.0
    );
    println!();

    println!("┌────────────────────────────────────┬──────────────┬──────────────┬──────────┬────────┐");
    println!("│ Metric                             │ Baseline     │ Current      │ Change   │ Status │");
    println!("├────────────────────────────────────┼──────────────┼──────────────┼──────────┼────────┤");
    for diff in diffs {
        println!(
            "│ {:<34} │ {:>12.3} │ {:>12.3} │ {:>7.2}% │ {:<6} │",
            truncate(&diff.name, 34),
            diff.baseline,
            diff.current,
            diff.change_percent,
            diff.status.label()
        );
    }
    println!("└────────────────────────────────────┴──────────────┴──────────────┴──────────┴────────┘");
    println!();

    let failed = count(diffs, DiffStatus::Failure);
    let warned = count(diffs, DiffStatus::Warning);
    println!(
        "Summary: {} passed, {} warnings, {} failed ({} total)",
        count(diffs, DiffStatus::Pass),
        warned,
        failed,
        diffs.len()
    );
}

fn print_json_report(diffs: &[MetricDiff]) -> serde_json::Result<()> {
    let metrics: Vec<_> = diffs
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "baseline": d.baseline,
                "current": d.current,
                "change_percent": d.change_percent,
                "status": d.status.label(),
            })
        })
        .collect();
    let report = json!({
        "metrics": metrics,
        "summary": {
            "total": diffs.len(),
            "passed": count(diffs, DiffStatus::Pass),
            "warnings": count(diffs, DiffStatus::Warning),
            "failures": count(diffs, DiffStatus::Failure),
        },
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() {
    let args = Args::parse();
    let thresholds = Thresholds {
        warning: args.threshold_warning,
        failure: args.threshold_failure,
    };

    let load = |path: &PathBuf, what: &str| match load_metrics(path) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error loading {}: {:#}", what, e);
            process::exit(2);
        }
    };
    let baseline = load(&args.baseline, "baseline");
    let current = load(&args.current, "current");

    let diffs = compare_reports(&baseline, &current, &thresholds);

    match args.format {
        OutputFormat::Text => print_text_report(&diffs, &baseline, &current, &args),
        OutputFormat::Json => {
            if let Err(e) = print_json_report(&diffs) {
                eprintln!("Error formatting report: {}", e);
                process::exit(2);
            }
        }
    }

    if count(&diffs, DiffStatus::Failure) > 0 {
        process::exit(2);
    } else if count(&diffs, DiffStatus::Warning) > 0 {
        process::exit(1);
    }
}
