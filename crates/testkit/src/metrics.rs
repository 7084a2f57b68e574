//! Metrics reports exported by worldtests.
//!
//! Reports are written as JSON under `target/metrics/` and compared between
//! runs by the `metrics-diff` tool to catch performance or determinism
//! regressions.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Top-level metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Test identifier.
    pub test_name: String,

    /// Collection time (RFC 3339).
    pub timestamp: String,

    /// Git commit hash, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,

    /// Overall result.
    pub result: TestResult,

    /// Terrain classification metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,

    /// Resource generation metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceMetrics>,

    /// Mining session metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mining: Option<MiningMetrics>,

    /// Test execution metrics.
    pub test_execution: TestExecutionMetrics,
}

/// Overall test result status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    /// All validations passed.
    Pass,
    /// At least one validation failed.
    Fail,
    /// Not run.
    Skip,
}

/// Terrain classification throughput and distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Tiles classified.
    pub tiles_classified: usize,

    /// Average time per classification (nanoseconds).
    pub avg_classify_time_ns: f64,

    /// Total classification time (milliseconds).
    pub total_time_ms: f64,

    /// Classification throughput.
    pub tiles_per_second: f64,

    /// Tile count per display name.
    pub biome_counts: BTreeMap<String, usize>,

    /// Share of classified tiles that were road.
    pub road_fraction: f64,
}

/// Resource generation results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// Generation passes run.
    pub generation_passes: usize,

    /// Nodes created across all passes.
    pub nodes_spawned: usize,

    /// Average time per pass (microseconds).
    pub avg_pass_time_us: f64,

    /// Node count per kind name.
    pub by_kind: BTreeMap<String, usize>,

    /// Smallest distance between two node centers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_center_spacing: Option<f64>,

    /// Node pairs closer than the minimum spacing.
    pub spacing_violations: usize,
}

/// Mining session results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningMetrics {
    /// Ticks simulated.
    pub ticks: u64,

    /// Units extracted.
    pub extractions: u64,

    /// Nodes that reached depletion.
    pub nodes_depleted: usize,

    /// Average ticks between extractions.
    pub avg_ticks_per_extraction: f64,
}

/// Test execution metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    /// Wall-clock duration (seconds).
    pub duration_seconds: f64,

    /// Assertions evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,

    /// Assertions that held.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validations_passed: Option<usize>,
}

/// Builder for [`MetricsReport`].
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a passing report stamped with the current time.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                commit_hash: None,
                result: TestResult::Pass,
                terrain: None,
                resources: None,
                mining: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    /// Set the result.
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    /// Set the result from a pass/fail flag.
    pub fn passed(self, passed: bool) -> Self {
        self.result(if passed { TestResult::Pass } else { TestResult::Fail })
    }

    /// Set the commit hash.
    pub fn commit_hash(mut self, hash: impl Into<String>) -> Self {
        self.report.commit_hash = Some(hash.into());
        self
    }

    /// Set terrain metrics.
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    /// Set resource metrics.
    pub fn resources(mut self, metrics: ResourceMetrics) -> Self {
        self.report.resources = Some(metrics);
        self
    }

    /// Set mining metrics.
    pub fn mining(mut self, metrics: MiningMetrics) -> Self {
        self.report.mining = Some(metrics);
        self
    }

    /// Set execution metrics.
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Finish the report.
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Writes [`MetricsReport`]s as pretty JSON.
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Sink writing to `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating metrics directory {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    /// Sink at `target/metrics/<test_name>.json` under the current directory.
    pub fn for_test(test_name: &str) -> Result<Self> {
        let dir = std::env::current_dir().context("resolving current directory")?;
        Self::create(dir.join("target/metrics").join(format!("{test_name}.json")))
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `report`, replacing any previous file.
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Load a report written by [`MetricsSink`].
pub fn load_metrics(path: &Path) -> Result<MetricsReport> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn sample_report() -> MetricsReport {
        MetricsReportBuilder::new("field_example")
            .passed(true)
            .terrain(TerrainMetrics {
                tiles_classified: 90_000,
                avg_classify_time_ns: 410.0,
                total_time_ms: 36.9,
                tiles_per_second: 2_439_024.0,
                biome_counts: BTreeMap::from([("Meadow".to_string(), 40_000)]),
                road_fraction: 0.06,
            })
            .resources(ResourceMetrics {
                generation_passes: 4,
                nodes_spawned: 31,
                avg_pass_time_us: 820.0,
                by_kind: BTreeMap::from([("Coal".to_string(), 12)]),
                min_center_spacing: Some(188.5),
                spacing_violations: 0,
            })
            .execution(TestExecutionMetrics {
                duration_seconds: 0.4,
                assertions_checked: Some(31),
                validations_passed: Some(31),
            })
            .build()
    }

    #[test]
    fn metrics_report_survives_json() {
        let json = serde_json::to_string_pretty(&sample_report()).unwrap();
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.test_name, "field_example");
        assert_eq!(parsed.result, TestResult::Pass);
        assert_eq!(parsed.resources.as_ref().unwrap().nodes_spawned, 31);
        assert!(parsed.mining.is_none());
        assert!(!json.contains("\"mining\""));
    }

    #[test]
    fn metrics_sink_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "tilemine-metrics-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let report = MetricsReportBuilder::new("sink_test").passed(false).build();
        let sink = MetricsSink::create(&path).unwrap();
        sink.write(&report).unwrap();

        let loaded = load_metrics(sink.path()).unwrap();
        assert_eq!(loaded.result, TestResult::Fail);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"result\": \"fail\""));

        fs::remove_file(&path).ok();
    }
}
