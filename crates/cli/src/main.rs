use std::{
    collections::BTreeMap,
    env,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, Result};
use tilemine_core::{WorldPos, WorldSeed};
use tilemine_testkit::{
    MetricsReport, MetricsReportBuilder, MetricsSink, MiningMetrics, ResourceMetrics,
    TestExecutionMetrics,
};
use tilemine_world::{AgentInput, World, WorldSettings};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
    tracing::info!("booting tilemine smoke session");
    let config = config_from_args()?;
    let report = smoke_session(&config)?;
    write_report(&report, &config.metrics)?;
    Ok(())
}

struct CliConfig {
    seed: WorldSeed,
    ticks: u64,
    metrics: PathBuf,
}

fn config_from_args() -> Result<CliConfig> {
    config_from_iter(env::args().skip(1))
}

fn config_from_iter<I>(mut args: I) -> Result<CliConfig>
where
    I: Iterator<Item = String>,
{
    let mut seed = WorldSettings::default().seed;
    let mut ticks = 600;
    let mut metrics_path: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().context("--seed requires a value")?;
                seed = value
                    .parse::<i64>()
                    .map(WorldSeed::from)
                    .with_context(|| format!("invalid seed `{value}`"))?;
            }
            "--ticks" => {
                let value = args.next().context("--ticks requires a value")?;
                ticks = value
                    .parse()
                    .with_context(|| format!("invalid tick count `{value}`"))?;
            }
            "--metrics" => metrics_path = args.next().map(PathBuf::from),
            _ => {}
        }
    }
    Ok(CliConfig {
        seed,
        ticks,
        metrics: metrics_path.unwrap_or_else(|| PathBuf::from("target/metrics/smoke_session.json")),
    })
}

/// Walk east while holding the mine action and collect what happens.
fn smoke_session(config: &CliConfig) -> Result<MetricsReport> {
    let started = Instant::now();
    let settings = WorldSettings {
        seed: config.seed,
        ..WorldSettings::default()
    };
    let mut world = World::new(settings, WorldPos::default()).context("invalid world settings")?;
    let initial_nodes = world.field().total_nodes();

    let input = AgentInput {
        move_x: 1.0,
        move_y: 0.0,
        mine: true,
    };
    let mut passes = 1;
    let mut spawned = initial_nodes;
    let mut extractions = 0u64;
    for _ in 0..config.ticks {
        let report = world.step(&input, 0.05);
        if report.regenerated {
            passes += 1;
            spawned += report.spawned;
        }
        if let Some(extraction) = report.extraction {
            extractions += u64::from(extraction.quantity);
            tracing::info!(
                tick = report.tick.0,
                node = %extraction.node,
                kind = %extraction.kind,
                "extracted"
            );
        }
    }

    let mut by_kind = BTreeMap::new();
    for node in world.field().nodes() {
        *by_kind.entry(node.kind().to_string()).or_insert(0) += 1;
    }
    let depleted = world.field().total_nodes() - world.field().active_nodes();
    tracing::info!(
        nodes = world.field().total_nodes(),
        extractions,
        agent = ?world.agent(),
        "smoke session finished"
    );

    Ok(MetricsReportBuilder::new("smoke_session")
        .resources(ResourceMetrics {
            generation_passes: passes,
            nodes_spawned: spawned,
            avg_pass_time_us: 0.0,
            by_kind,
            min_center_spacing: None,
            spacing_violations: 0,
        })
        .mining(MiningMetrics {
            ticks: config.ticks,
            extractions,
            nodes_depleted: depleted,
            avg_ticks_per_extraction: if extractions == 0 {
                0.0
            } else {
                config.ticks as f64 / extractions as f64
            },
        })
        .execution(TestExecutionMetrics {
            duration_seconds: started.elapsed().as_secs_f64(),
            ..TestExecutionMetrics::default()
        })
        .build())
}

fn write_report(report: &MetricsReport, path: &Path) -> Result<()> {
    MetricsSink::create(path)?.write(report)?;
    tracing::info!(path = %path.display(), "wrote session metrics");
    Ok(())
}
