//! World session: agent movement, streaming generation and mining.
//!
//! [`World`] holds no generation logic of its own; it feeds the agent
//! position into [`ResourceField`] and [`TerrainField`] once per tick.

use crate::field::ResourceField;
use crate::node::{NodeId, ResourceNode};
use crate::resource::ResourceKind;
use crate::terrain::{TerrainField, TileType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilemine_core::{SimTick, TileCoord, WorldPos, WorldSeed};
use tracing::{debug, info, instrument};

/// Tunables of a world session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// World seed.
    pub seed: WorldSeed,
    /// Half-width, in tiles, of each generation pass.
    pub spawn_radius_tiles: i32,
    /// Tiles the agent must travel on one axis before the next pass.
    pub regen_threshold_tiles: i32,
    /// Reach used when picking a node to mine, in world units.
    pub mining_range: f32,
    /// Mining progress gained per second.
    pub mining_speed: f32,
    /// Agent movement speed in world units per second.
    pub agent_speed: f32,
    /// Agent footprint edge length.
    pub agent_size: f32,
    /// Pins node jitter, size and richness when set.
    pub cosmetic_seed: Option<u64>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            seed: WorldSeed(21_343_124),
            spawn_radius_tiles: 50,
            regen_threshold_tiles: 20,
            mining_range: 100.0,
            mining_speed: 1.5,
            agent_speed: 200.0,
            agent_size: 50.0,
            cosmetic_seed: None,
        }
    }
}

/// Rejected [`WorldSettings`] value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} must not be negative (got {value})")]
    NegativeTiles { field: &'static str, value: i32 },
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidMeasure { field: &'static str, value: f32 },
}

impl WorldSettings {
    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("spawn_radius_tiles", self.spawn_radius_tiles),
            ("regen_threshold_tiles", self.regen_threshold_tiles),
        ] {
            if value < 0 {
                return Err(SettingsError::NegativeTiles { field, value });
            }
        }
        for (field, value) in [
            ("mining_range", self.mining_range),
            ("mining_speed", self.mining_speed),
            ("agent_speed", self.agent_speed),
            ("agent_size", self.agent_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidMeasure { field, value });
            }
        }
        Ok(())
    }
}

/// Per-tick agent intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentInput {
    /// Horizontal direction, usually in `[-1, 1]`.
    pub move_x: f32,
    /// Vertical direction, usually in `[-1, 1]`.
    pub move_y: f32,
    /// Whether the mine action is held.
    pub mine: bool,
}

/// One unit pulled out of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub node: NodeId,
    pub kind: ResourceKind,
    pub quantity: u32,
}

/// What happened during one [`World::step`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    /// Tick number after the step.
    pub tick: SimTick,
    pub extraction: Option<Extraction>,
    /// Whether a generation pass ran.
    pub regenerated: bool,
    /// Nodes created by that pass.
    pub spawned: usize,
    /// Node held for mining at the end of the step.
    pub mining: Option<NodeId>,
}

/// A running world with a single agent.
#[derive(Debug, Clone)]
pub struct World {
    settings: WorldSettings,
    field: ResourceField,
    agent: WorldPos,
    last_generation: TileCoord,
    mining: Option<NodeId>,
    tick: SimTick,
}

impl World {
    /// Start a session with the agent's top-left corner at `start`.
    pub fn new(settings: WorldSettings, start: WorldPos) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut field = match settings.cosmetic_seed {
            Some(cosmetic) => ResourceField::with_cosmetic_seed(settings.seed, cosmetic),
            None => ResourceField::new(settings.seed),
        };
        let tile = TileCoord::containing(start);
        let spawned = field.generate_resources_in_area(tile.x, tile.y, settings.spawn_radius_tiles);
        info!(seed = settings.seed.0, %tile, spawned, "world session started");

        Ok(Self {
            settings,
            field,
            agent: start,
            last_generation: tile,
            mining: None,
            tick: SimTick::ZERO,
        })
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn field(&self) -> &ResourceField {
        &self.field
    }

    pub fn terrain(&self) -> &TerrainField {
        self.field.terrain()
    }

    /// Agent top-left corner.
    pub fn agent(&self) -> WorldPos {
        self.agent
    }

    pub fn agent_center(&self) -> WorldPos {
        let half = self.settings.agent_size / 2.0;
        self.agent.offset(half, half)
    }

    pub fn agent_tile(&self) -> TileCoord {
        TileCoord::containing(self.agent)
    }

    /// Tile around which the last generation pass ran.
    pub fn last_generation_tile(&self) -> TileCoord {
        self.last_generation
    }

    /// Node currently held for mining.
    pub fn mining_node(&self) -> Option<&ResourceNode> {
        self.mining.and_then(|id| self.field.node(id))
    }

    pub fn tick(&self) -> SimTick {
        self.tick
    }

    /// Teleport the agent. Any mining in progress is interrupted.
    pub fn place_agent(&mut self, pos: WorldPos) {
        self.release_mining();
        self.agent = pos;
    }

    /// Drop depleted nodes from the field.
    pub fn cleanup_depleted(&mut self) -> usize {
        self.field.cleanup_depleted()
    }

    /// Advance the session by `delta` seconds.
    #[instrument(level = "trace", skip(self, input), fields(tick = self.tick.0))]
    pub fn step(&mut self, input: &AgentInput, delta: f32) -> TickReport {
        let distance = self.settings.agent_speed * delta;
        self.agent = self
            .agent
            .offset(input.move_x * distance, input.move_y * distance);

        let (regenerated, spawned) = self.update_generation();
        let extraction = self.update_mining(input.mine, delta);

        self.tick = self.tick.advance(1);
        TickReport {
            tick: self.tick,
            extraction,
            regenerated,
            spawned,
            mining: self.mining,
        }
    }

    fn update_generation(&mut self) -> (bool, usize) {
        let tile = self.agent_tile();
        let threshold = i64::from(self.settings.regen_threshold_tiles);
        let dx = (i64::from(tile.x) - i64::from(self.last_generation.x)).abs();
        let dy = (i64::from(tile.y) - i64::from(self.last_generation.y)).abs();
        if dx <= threshold && dy <= threshold {
            return (false, 0);
        }

        let spawned = self
            .field
            .generate_resources_in_area(tile.x, tile.y, self.settings.spawn_radius_tiles);
        debug!(%tile, spawned, "regenerated resources around agent");
        self.last_generation = tile;
        (true, spawned)
    }

    fn release_mining(&mut self) {
        if let Some(id) = self.mining.take() {
            if let Some(node) = self.field.node_mut(id) {
                node.stop_mining();
            }
            debug!(node = %id, "mining released");
        }
    }

    fn update_mining(&mut self, requested: bool, delta: f32) -> Option<Extraction> {
        if !requested {
            self.release_mining();
            return None;
        }

        if self.mining.is_none() {
            self.mining = self
                .field
                .find_nearest_node(self.agent.x, self.agent.y, self.settings.mining_range)
                .map(|node| node.id());
        }

        let id = self.mining?;
        let Some(node) = self.field.node_mut(id) else {
            // removed by a cleanup sweep while held
            self.mining = None;
            return None;
        };

        let extraction = node.mine(delta, self.settings.mining_speed).then(|| Extraction {
            node: id,
            kind: node.kind(),
            quantity: 1,
        });
        if let Some(extraction) = &extraction {
            debug!(node = %id, kind = %extraction.kind, "extracted unit");
        }
        if node.is_depleted() {
            info!(node = %id, kind = %node.kind(), "node depleted");
            self.mining = None;
        }
        extraction
    }

    /// Nodes inside a `view_w` by `view_h` camera centered on the agent.
    pub fn visible_nodes(&self, view_w: f32, view_h: f32) -> Vec<&ResourceNode> {
        let center = self.agent_center();
        self.field.nodes_in_area(
            center.x - view_w / 2.0,
            center.y - view_h / 2.0,
            center.x + view_w / 2.0,
            center.y + view_h / 2.0,
        )
    }

    /// Classified tiles within `radius` of the agent's tile, row by row.
    pub fn visible_tiles(&self, radius: i32) -> Vec<(TileCoord, TileType)> {
        let center = self.agent_tile();
        let radius = radius.max(0);
        let terrain = self.terrain();
        (center.y.saturating_sub(radius)..=center.y.saturating_add(radius))
            .flat_map(|y| {
                (center.x.saturating_sub(radius)..=center.x.saturating_add(radius))
                    .map(move |x| TileCoord::new(x, y))
            })
            .map(|coord| (coord, terrain.classify_coord(coord)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_42() -> WorldSettings {
        WorldSettings {
            seed: WorldSeed(42),
            cosmetic_seed: Some(7),
            ..WorldSettings::default()
        }
    }

    fn park_on(world: &mut World, kind: ResourceKind) -> NodeId {
        let node = world
            .field()
            .nodes()
            .iter()
            .find(|n| n.kind() == kind)
            .expect("kind present");
        let (id, center) = (node.id(), node.center());
        world.place_agent(WorldPos::new(center.x - 25.0, center.y - 25.0));
        id
    }

    const MINE: AgentInput = AgentInput {
        move_x: 0.0,
        move_y: 0.0,
        mine: true,
    };

    #[test]
    fn test_defaults_validate() {
        assert_eq!(WorldSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = WorldSettings {
            spawn_radius_tiles: -1,
            ..WorldSettings::default()
        };
        assert!(matches!(bad.validate(), Err(SettingsError::NegativeTiles { field: "spawn_radius_tiles", .. })));

        let bad = WorldSettings {
            mining_speed: f32::NAN,
            ..WorldSettings::default()
        };
        assert!(matches!(bad.validate(), Err(SettingsError::InvalidMeasure { field: "mining_speed", .. })));
        assert!(World::new(bad, WorldPos::default()).is_err());
    }

    #[test]
    fn test_new_generates_around_start() {
        let world = World::new(settings_42(), WorldPos::new(10.0, 10.0)).unwrap();
        assert_eq!(world.field().total_nodes(), 8);
        assert_eq!(world.last_generation_tile(), TileCoord::new(0, 0));
    }

    #[test]
    fn test_extraction_every_fourteen_ticks() {
        let mut world = World::new(settings_42(), WorldPos::default()).unwrap();
        let oil = park_on(&mut world, ResourceKind::Oil);

        let extraction_ticks: Vec<u64> = (0..42)
            .filter_map(|_| {
                let report = world.step(&MINE, 0.05);
                report.extraction.map(|e| {
                    assert_eq!(e.node, oil);
                    assert_eq!(e.kind, ResourceKind::Oil);
                    assert_eq!(e.quantity, 1);
                    report.tick.0
                })
            })
            .collect();
        assert_eq!(extraction_ticks, vec![14, 28, 42]);
    }

    #[test]
    fn test_release_resets_progress() {
        let mut world = World::new(settings_42(), WorldPos::default()).unwrap();
        let iron = park_on(&mut world, ResourceKind::Iron);

        for _ in 0..10 {
            world.step(&MINE, 0.05);
        }
        assert_eq!(world.mining_node().map(|n| n.id()), Some(iron));

        let report = world.step(&AgentInput::default(), 0.05);
        assert_eq!(report.mining, None);
        let node = world.field().node(iron).unwrap();
        assert_eq!(node.mining_progress(), 0.0);
        assert!(!node.is_being_mined());

        // progress starts over
        let reports: Vec<_> = (0..13).map(|_| world.step(&MINE, 0.05)).collect();
        assert!(reports.iter().all(|r| r.extraction.is_none()));
        assert!(world.step(&MINE, 0.05).extraction.is_some());
    }

    #[test]
    fn test_depleted_node_is_released() {
        let mut world = World::new(settings_42(), WorldPos::default()).unwrap();
        let coal = park_on(&mut world, ResourceKind::Coal);
        let amount = world.field().node(coal).unwrap().amount();

        let mut extracted = 0;
        for _ in 0..amount {
            let report = world.step(&MINE, 1.0);
            assert!(report.extraction.is_some());
            extracted += 1;
        }
        assert_eq!(extracted, amount);
        assert!(world.field().node(coal).unwrap().is_depleted());
        assert!(world.mining_node().is_none());
        assert_eq!(world.cleanup_depleted(), 1);
    }

    #[test]
    fn test_nothing_in_range_mines_nothing() {
        let mut world = World::new(settings_42(), WorldPos::default()).unwrap();
        // the origin sits on a road crossing where nothing spawns
        let report = world.step(&MINE, 1.0);
        assert_eq!(report.mining, None);
        assert_eq!(report.extraction, None);
    }

    #[test]
    fn test_regeneration_past_threshold() {
        let mut world = World::new(settings_42(), WorldPos::default()).unwrap();
        let east = AgentInput {
            move_x: 1.0,
            ..AgentInput::default()
        };

        // 10 units per tick; tile 21 is reached after 68 ticks
        for _ in 0..67 {
            assert!(!world.step(&east, 0.05).regenerated);
        }
        let report = world.step(&east, 0.05);
        assert!(report.regenerated);
        assert_eq!(world.agent_tile(), TileCoord::new(21, 0));
        assert_eq!(world.last_generation_tile(), TileCoord::new(21, 0));
        assert_eq!(world.field().total_nodes(), 8 + report.spawned);
    }

    #[test]
    fn test_visible_queries() {
        let world = World::new(settings_42(), WorldPos::new(-25.0, -25.0)).unwrap();
        assert_eq!(world.visible_tiles(2).len(), 25);
        assert!(world.visible_tiles(-3).len() == 1);

        let everything = world.visible_nodes(1.0e6, 1.0e6);
        assert_eq!(everything.len(), world.field().total_nodes());
        assert!(world.visible_nodes(10.0, 10.0).is_empty());
    }
}
