use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tilemine_world::WorldSettings;
use tracing::warn;

pub const DEFAULT_SESSION_PATH: &str = "config/session.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of ticks the headless run lasts.
    pub ticks: u64,
    /// Simulated seconds per tick.
    pub tick_seconds: f32,
    /// Scripted agent input (JSON). Without one the agent stands still.
    pub script: Option<PathBuf>,
    pub world: WorldSettings,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ticks: 1200,
            // 20 ticks per second
            tick_seconds: 0.05,
            script: None,
            world: WorldSettings::default(),
        }
    }
}

impl SessionConfig {
    /// Load session configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_SESSION_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SessionConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SessionConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_SESSION_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Session config not found at {}. Using defaults",
                        path.display()
                    );
                }
                SessionConfig::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
