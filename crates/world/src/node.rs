//! Resource nodes and their mining state machine.

use crate::resource::ResourceKind;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tilemine_core::{Rgba, WorldPos};

/// Half the agent's footprint; agent positions are top-left corners.
pub const AGENT_HALF_EXTENT: f32 = 25.0;
/// Smallest visual size a spawned node can have.
pub const MIN_NODE_SIZE: f32 = 40.0;
/// Width of the visual size range above [`MIN_NODE_SIZE`].
pub const NODE_SIZE_SPREAD: f32 = 20.0;
/// Amount stored by inexhaustible nodes.
pub const INFINITE_AMOUNT: u32 = u32::MAX;

const DEPLETED_COLOR: Rgba = Rgba::rgba(0.3, 0.3, 0.3, 0.5);

/// Stable handle of a node, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable mining state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    Idle,
    Mining,
    Depleted,
}

/// A deposit on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    id: NodeId,
    kind: ResourceKind,
    pos: WorldPos,
    size: f32,
    amount: u32,
    max_amount: u32,
    depleted: bool,
    mining_progress: f32,
    being_mined: bool,
}

impl ResourceNode {
    /// Roll a fresh node's size and richness from `rng`.
    pub fn spawn<R: Rng + ?Sized>(id: NodeId, kind: ResourceKind, pos: WorldPos, rng: &mut R) -> Self {
        let size = rng.gen_range(MIN_NODE_SIZE..MIN_NODE_SIZE + NODE_SIZE_SPREAD);
        let max_amount = match kind.amount_range() {
            Some((min, max)) => rng.gen_range(min..=max),
            None => INFINITE_AMOUNT,
        };
        Self::with_amount(id, kind, pos, size, max_amount)
    }

    /// Build a full node with an explicit richness.
    ///
    /// Inexhaustible kinds ignore `max_amount` and store [`INFINITE_AMOUNT`].
    pub fn with_amount(id: NodeId, kind: ResourceKind, pos: WorldPos, size: f32, max_amount: u32) -> Self {
        let max_amount = if kind.is_infinite() {
            INFINITE_AMOUNT
        } else {
            max_amount
        };
        Self {
            id,
            kind,
            pos,
            size,
            amount: max_amount,
            max_amount,
            depleted: !kind.is_infinite() && max_amount == 0,
            mining_progress: 0.0,
            being_mined: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Top-left corner of the footprint.
    pub fn pos(&self) -> WorldPos {
        self.pos
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Geometric center of the footprint.
    pub fn center(&self) -> WorldPos {
        self.pos.offset(self.size / 2.0, self.size / 2.0)
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn max_amount(&self) -> u32 {
        self.max_amount
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    pub fn is_infinite(&self) -> bool {
        self.kind.is_infinite()
    }

    pub fn is_being_mined(&self) -> bool {
        self.being_mined
    }

    /// Progress toward the next unit, in `[0, 1)`.
    pub fn mining_progress(&self) -> f32 {
        self.mining_progress
    }

    pub fn state(&self) -> NodeState {
        if self.depleted {
            NodeState::Depleted
        } else if self.being_mined {
            NodeState::Mining
        } else {
            NodeState::Idle
        }
    }

    /// Advance mining by `delta * mining_speed`.
    ///
    /// Returns `true` when a unit was extracted during this call. Depleted
    /// nodes are left untouched and always return `false`.
    pub fn mine(&mut self, delta: f32, mining_speed: f32) -> bool {
        if self.depleted {
            return false;
        }

        self.being_mined = true;
        self.mining_progress += (delta * mining_speed).max(0.0);

        if self.mining_progress < 1.0 {
            return false;
        }

        self.mining_progress = 0.0;
        if !self.kind.is_infinite() {
            self.amount = self.amount.saturating_sub(1);
            if self.amount == 0 {
                self.depleted = true;
            }
        }
        true
    }

    /// Interrupt mining; partial progress is lost.
    pub fn stop_mining(&mut self) {
        self.being_mined = false;
        self.mining_progress = 0.0;
    }

    /// Remaining share of the original amount, `1.0` for inexhaustible nodes.
    pub fn remaining_ratio(&self) -> f32 {
        if self.kind.is_infinite() || self.max_amount == 0 {
            return 1.0;
        }
        self.amount as f32 / self.max_amount as f32
    }

    fn richness_scale(&self) -> f32 {
        0.5 + 0.5 * self.remaining_ratio()
    }

    /// Color a renderer should draw this node with.
    pub fn display_color(&self) -> Rgba {
        if self.depleted {
            return DEPLETED_COLOR;
        }
        let base = self.kind.color();
        if self.kind.is_infinite() {
            return base;
        }
        Rgba::rgb(base.r, base.g, base.b).scaled(self.richness_scale())
    }

    /// Size a renderer should draw this node with.
    pub fn display_size(&self) -> f32 {
        if self.depleted {
            return self.size * 0.5;
        }
        if self.kind.is_infinite() {
            return self.size;
        }
        self.size * self.richness_scale()
    }

    /// Distance from the node center to the center of an agent at `(agent_x, agent_y)`.
    pub fn distance_to_agent(&self, agent_x: f32, agent_y: f32) -> f32 {
        let agent_center = WorldPos::new(agent_x + AGENT_HALF_EXTENT, agent_y + AGENT_HALF_EXTENT);
        self.center().distance(agent_center)
    }

    pub fn is_in_range(&self, agent_x: f32, agent_y: f32, range: f32) -> bool {
        self.distance_to_agent(agent_x, agent_y) <= range
    }

    /// Tooltip text, e.g. `Iron: 37/80` or `Oil (infinite)`.
    pub fn info_text(&self) -> String {
        if self.kind.is_infinite() {
            format!("{} (infinite)", self.kind.display_name())
        } else {
            format!("{}: {}/{}", self.kind.display_name(), self.amount, self.max_amount)
        }
    }
}
