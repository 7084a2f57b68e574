mod config;
mod headless;
mod scripted_input;

use anyhow::Result;
use config::SessionConfig;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tilemine_core::WorldSeed;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let opts = CliOptions::parse(env::args().skip(1));
    if opts.help {
        print_usage();
        return Ok(());
    }

    let session = opts.apply(match &opts.config {
        Some(path) => SessionConfig::load_from_path(path),
        None => SessionConfig::load(),
    });
    if let Some(path) = &opts.write_config {
        session.save_to_path(path)?;
        tracing::info!(path = %path.display(), "wrote resolved session config");
        return Ok(());
    }
    let summary = headless::run(HeadlessConfig {
        session,
        events: opts.events.clone(),
        summary: opts.summary.clone(),
    })?;

    if opts.summary.is_none() {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn print_usage() {
    println!(
        "usage: tilemine [--config <path>] [--ticks <n>] [--seed <n>] [--script <path>] \
         [--summary <path>] [--events <path>] [--write-config <path>]"
    );
}

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    ticks: Option<u64>,
    seed: Option<i64>,
    script: Option<PathBuf>,
    summary: Option<PathBuf>,
    events: Option<PathBuf>,
    write_config: Option<PathBuf>,
    help: bool,
}

impl CliOptions {
    fn parse<I>(mut args: I) -> Self
    where
        I: Iterator<Item = String>,
    {
        let mut opts = CliOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    if let Some(path) = args.next() {
                        opts.config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--config requires a file path");
                    }
                }
                "--ticks" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<u64>() {
                            Ok(value) => opts.ticks = Some(value),
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--ticks must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--ticks requires an integer");
                    }
                }
                "--seed" => {
                    if let Some(raw) = args.next() {
                        match raw.parse::<i64>() {
                            Ok(value) => opts.seed = Some(value),
                            Err(err) => {
                                tracing::error!(%err, value = %raw, "--seed must be an integer");
                            }
                        }
                    } else {
                        tracing::error!("--seed requires an integer");
                    }
                }
                "--script" => {
                    if let Some(path) = args.next() {
                        opts.script = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--script requires a file path");
                    }
                }
                "--summary" => {
                    if let Some(path) = args.next() {
                        opts.summary = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--summary requires a file path");
                    }
                }
                "--events" => {
                    if let Some(path) = args.next() {
                        opts.events = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--events requires a file path");
                    }
                }
                "--write-config" => {
                    if let Some(path) = args.next() {
                        opts.write_config = Some(PathBuf::from(path));
                    } else {
                        tracing::error!("--write-config requires a file path");
                    }
                }
                "--help" | "-h" => opts.help = true,
                other => tracing::warn!(arg = other, "ignoring unknown argument"),
            }
        }
        opts
    }

    /// Command-line flags win over the config file.
    fn apply(&self, mut session: SessionConfig) -> SessionConfig {
        if let Some(ticks) = self.ticks {
            session.ticks = ticks;
        }
        if let Some(seed) = self.seed {
            session.world.seed = WorldSeed::from(seed);
        }
        if let Some(script) = &self.script {
            session.script = Some(script.clone());
        }
        session
    }
}
