use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path};
use tilemine_world::AgentInput;

#[derive(Debug, Deserialize)]
struct ScriptedInputFile {
    steps: Vec<ScriptedStep>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ScriptedStep {
    /// Seconds this step is held.
    duration: f32,
    #[serde(default)]
    move_x: f32,
    #[serde(default)]
    move_y: f32,
    #[serde(default)]
    mine: bool,
}

/// Replays a fixed sequence of agent inputs against simulated time.
pub struct ScriptedInputPlayer {
    steps: Vec<ScriptedStep>,
    index: usize,
    time_in_step: f32,
}

impl ScriptedInputPlayer {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("invalid script {}", path.display()))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        let file: ScriptedInputFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("scripted input file contains no steps");
        }
        if let Some(step) = file
            .steps
            .iter()
            .find(|step| !step.duration.is_finite() || step.duration <= 0.0)
        {
            anyhow::bail!("step duration must be positive (got {})", step.duration);
        }
        Ok(Self {
            steps: file.steps,
            index: 0,
            time_in_step: 0.0,
        })
    }

    /// Whether the final step has been reached. The final step repeats forever.
    pub fn on_last_step(&self) -> bool {
        self.index + 1 >= self.steps.len()
    }

    pub fn advance(&mut self, dt: f32) -> AgentInput {
        if self.steps.is_empty() {
            return AgentInput::default();
        }

        self.time_in_step += dt;
        while self.index < self.steps.len() && self.time_in_step >= self.steps[self.index].duration
        {
            self.time_in_step -= self.steps[self.index].duration;
            if self.index + 1 < self.steps.len() {
                self.index += 1;
            } else {
                self.time_in_step = 0.0;
                break;
            }
        }

        let step = self.steps.get(self.index).cloned().unwrap_or_default();
        step.into_agent_input()
    }
}

impl ScriptedStep {
    fn into_agent_input(self) -> AgentInput {
        AgentInput {
            move_x: self.move_x,
            move_y: self.move_y,
            mine: self.mine,
        }
    }
}
