use crate::config::SessionConfig;
use crate::scripted_input::ScriptedInputPlayer;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tilemine_core::{WorldPos, WorldSeed};
use tilemine_testkit::{EventRecord, JsonlSink};
use tilemine_world::{AgentInput, TickReport, World};
use tracing::{debug, info};

pub struct HeadlessConfig {
    pub session: SessionConfig,
    pub events: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

/// End-of-run digest written by `--summary`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub seed: WorldSeed,
    pub ticks: u64,
    pub agent: WorldPos,
    pub extractions: BTreeMap<String, u64>,
    pub generation_passes: u64,
    pub nodes_total: usize,
    pub nodes_active: usize,
    pub nodes_by_kind: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct GenerationEvent {
    spawned: usize,
    total: usize,
}

pub fn run(cfg: HeadlessConfig) -> Result<RunSummary> {
    let mut player = match &cfg.session.script {
        Some(path) => Some(ScriptedInputPlayer::from_path(path)?),
        None => None,
    };
    let mut events = match &cfg.events {
        Some(path) => Some(JsonlSink::create(path)?),
        None => None,
    };

    let summary = run_session(&cfg.session, player.as_mut(), events.as_mut())?;

    if let Some(sink) = events.as_mut() {
        sink.flush()?;
        info!(written = sink.written(), "event log closed");
    }
    if let Some(path) = &cfg.summary {
        write_summary(&summary, path)?;
    }
    Ok(summary)
}

/// Step a fresh world for `session.ticks` ticks.
pub fn run_session(
    session: &SessionConfig,
    mut player: Option<&mut ScriptedInputPlayer>,
    mut events: Option<&mut JsonlSink>,
) -> Result<RunSummary> {
    let mut world = World::new(session.world.clone(), WorldPos::default())
        .context("invalid world settings")?;
    info!(
        seed = session.world.seed.0,
        ticks = session.ticks,
        nodes = world.field().total_nodes(),
        "headless session started"
    );

    let mut extractions = BTreeMap::new();
    let mut passes = 1;
    let mut script_done = false;
    for _ in 0..session.ticks {
        let input = match player.as_deref_mut() {
            Some(player) => {
                let input = player.advance(session.tick_seconds);
                if !script_done && player.on_last_step() {
                    script_done = true;
                    debug!(tick = world.tick().0, "script reached its final step");
                }
                input
            }
            None => AgentInput::default(),
        };
        let report = world.step(&input, session.tick_seconds);
        if report.regenerated {
            passes += 1;
        }
        if let Some(extraction) = report.extraction {
            *extractions.entry(extraction.kind.to_string()).or_insert(0) +=
                u64::from(extraction.quantity);
        }
        if let Some(sink) = events.as_deref_mut() {
            record_events(sink, &world, &input, &report)?;
        }
    }

    let field = world.field();
    let mut nodes_by_kind = BTreeMap::new();
    for node in field.nodes() {
        *nodes_by_kind.entry(node.kind().to_string()).or_insert(0) += 1;
    }
    let summary = RunSummary {
        seed: session.world.seed,
        ticks: world.tick().0,
        agent: world.agent(),
        extractions,
        generation_passes: passes,
        nodes_total: field.total_nodes(),
        nodes_active: field.active_nodes(),
        nodes_by_kind,
    };
    info!(
        agent = ?summary.agent,
        nodes = summary.nodes_total,
        passes = summary.generation_passes,
        "headless session finished"
    );
    Ok(summary)
}

fn record_events(
    sink: &mut JsonlSink,
    world: &World,
    input: &AgentInput,
    report: &TickReport,
) -> Result<()> {
    if let Some(extraction) = &report.extraction {
        sink.write(&EventRecord {
            tick: report.tick,
            kind: "extraction",
            payload: extraction,
        })?;
    }
    if report.regenerated {
        sink.write(&EventRecord {
            tick: report.tick,
            kind: "generation",
            payload: &GenerationEvent {
                spawned: report.spawned,
                total: world.field().total_nodes(),
            },
        })?;
    }
    if input.mine && report.mining.is_none() {
        debug!(tick = report.tick.0, "mine held with nothing in range");
    }
    Ok(())
}

fn write_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary {}", path.display()))?;
    info!(path = %path.display(), "wrote run summary");
    Ok(())
}
