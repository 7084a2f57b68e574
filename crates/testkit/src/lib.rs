#![warn(missing_docs)]
//! Deterministic testing surfaces: golden snapshots, micro-worldtests,
//! metrics reports and a JSONL event log.

mod metrics;
mod micro_worldtest;
mod snapshot;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tilemine_core::SimTick;

pub use metrics::*;
pub use micro_worldtest::*;
pub use snapshot::*;

/// One line of a session event log.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a, P: Serialize> {
    /// Tick the event happened on.
    pub tick: SimTick,
    /// Event label, e.g. `extraction`.
    pub kind: &'a str,
    /// Event body.
    pub payload: &'a P,
}

/// Writes newline-delimited JSON records.
pub struct JsonlSink {
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlSink {
    /// Create (or truncate) a log at `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one record.
    pub fn write<P: Serialize>(&mut self, event: &EventRecord<'_, P>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flushing event log")
    }
}
