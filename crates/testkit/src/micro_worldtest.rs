//! Tick-stepped snapshot tests.
//!
//! A micro-worldtest steps a small simulation a fixed number of ticks,
//! captures a serializable view of it along the way and compares the
//! resulting report against a golden JSON file.

use crate::snapshot::assert_json_snapshot;
use anyhow::{ensure, Result};
use serde::Serialize;
use std::path::PathBuf;
use tilemine_core::SimTick;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Name written into the report.
    pub name: String,
    /// Number of steps to run.
    pub ticks: u64,
    /// Capture a frame every this many ticks. The initial and final ticks are
    /// always captured.
    pub capture_every: u64,
    /// Golden JSON location.
    pub snapshot_path: PathBuf,
}

impl MicroWorldtestConfig {
    /// Config capturing every tick.
    pub fn new(name: impl Into<String>, ticks: u64, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            ticks,
            capture_every: 1,
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Capture only every `every` ticks.
    pub fn capture_every(mut self, every: u64) -> Self {
        self.capture_every = every;
        self
    }
}

/// Snapshot captured at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// Captured view.
    pub snapshot: S,
}

/// Full report compared against the golden.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestReport<S> {
    /// Test name.
    pub name: String,
    /// Captured frames in tick order.
    pub frames: Vec<MicroWorldtestFrame<S>>,
}

/// Run a micro-worldtest and assert (or record) its golden.
///
/// `step` is called once per tick with the tick being simulated; `snapshot`
/// is called with the tick reached. The report is returned for further
/// assertions once it matched the golden.
pub fn run_micro_worldtest<State, Snapshot, StepFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<MicroWorldtestReport<Snapshot>>
where
    Snapshot: Serialize,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    ensure!(config.capture_every > 0, "capture_every must be positive");

    let mut tick = SimTick::ZERO;
    let mut frames = vec![MicroWorldtestFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    }];

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        if tick.0 % config.capture_every == 0 || tick.0 == config.ticks {
            frames.push(MicroWorldtestFrame {
                tick: tick.0,
                snapshot: snapshot(tick, &state),
            });
        }
    }

    let report = MicroWorldtestReport {
        name: config.name,
        frames,
    };
    assert_json_snapshot(&config.snapshot_path, &report)?;
    Ok(report)
}
