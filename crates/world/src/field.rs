//! Resource field: node ownership, generation and spatial queries.

use crate::node::{NodeId, ResourceNode, AGENT_HALF_EXTENT};
use crate::noise::lattice_unit;
use crate::resource::ResourceKind;
use crate::terrain::{TerrainField, TileType};
use rand::rngs::StdRng;
use rand::Rng;
use tilemine_core::{cosmetic_rng, TileCoord, WorldPos, WorldSeed};
use tracing::{debug, instrument, trace};

/// Distance between sampled tiles along each axis.
pub const SAMPLE_SPACING: usize = 8;
/// Minimum distance between two nodes, in world units.
pub const MIN_NODE_SPACING: f32 = 150.0;
/// Maximum positional jitter applied to a new node, in world units.
pub const SPAWN_JITTER: i32 = 15;

/// Owns every resource node of a world.
#[derive(Debug, Clone)]
pub struct ResourceField {
    terrain: TerrainField,
    nodes: Vec<ResourceNode>,
    next_id: u64,
    rng: StdRng,
}

impl ResourceField {
    /// Empty field whose cosmetic draws come from OS entropy.
    pub fn new(seed: WorldSeed) -> Self {
        Self::with_rng(seed, cosmetic_rng(None))
    }

    /// Empty field with reproducible cosmetic draws.
    pub fn with_cosmetic_seed(seed: WorldSeed, cosmetic_seed: u64) -> Self {
        Self::with_rng(seed, cosmetic_rng(Some(cosmetic_seed)))
    }

    fn with_rng(seed: WorldSeed, rng: StdRng) -> Self {
        Self {
            terrain: TerrainField::new(seed),
            nodes: Vec::new(),
            next_id: 0,
            rng,
        }
    }

    pub fn seed(&self) -> WorldSeed {
        self.terrain.seed()
    }

    pub fn terrain(&self) -> &TerrainField {
        &self.terrain
    }

    /// Deterministic spawn roll for a tile, in `[0, 1]`.
    pub fn spawn_chance(&self, x: i32, y: i32) -> f32 {
        lattice_unit(x, y, self.seed())
    }

    /// Kind that would spawn on a free tile, ignoring existing nodes.
    pub fn spawn_roll(&self, x: i32, y: i32) -> Option<(TileType, ResourceKind)> {
        let tile = self.terrain.classify(x, y);
        ResourceKind::roll_for_biome(tile, self.spawn_chance(x, y)).map(|kind| (tile, kind))
    }

    /// Populate the square of tiles within `radius` of `(center_x, center_y)`.
    ///
    /// Every [`SAMPLE_SPACING`]th tile is rolled; tiles already covered by a
    /// node are skipped. Returns the number of nodes created.
    #[instrument(skip(self), fields(seed = self.seed().0))]
    pub fn generate_resources_in_area(&mut self, center_x: i32, center_y: i32, radius: i32) -> usize {
        let xs = center_x.saturating_sub(radius)..=center_x.saturating_add(radius);
        let ys = center_y.saturating_sub(radius)..=center_y.saturating_add(radius);

        let mut spawned = 0;
        for x in xs.step_by(SAMPLE_SPACING) {
            for y in ys.clone().step_by(SAMPLE_SPACING) {
                let origin = TileCoord::new(x, y).world_origin();
                if self.has_node_near(origin, |node| node.pos()) {
                    continue;
                }

                let Some((tile, kind)) = self.spawn_roll(x, y) else {
                    continue;
                };

                let jitter_x = self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
                let jitter_y = self.rng.gen_range(-SPAWN_JITTER..=SPAWN_JITTER);
                let pos = origin.offset(jitter_x as f32, jitter_y as f32);
                let candidate = ResourceNode::spawn(NodeId(self.next_id), kind, pos, &mut self.rng);

                if self.has_node_near(candidate.center(), |node| node.center()) {
                    trace!(x, y, ?kind, "candidate crowded by neighbour after jitter");
                    continue;
                }

                trace!(x, y, ?tile, ?kind, id = %candidate.id(), "spawned node");
                self.next_id += 1;
                self.nodes.push(candidate);
                spawned += 1;
            }
        }

        debug!(spawned, total = self.nodes.len(), "resource generation complete");
        spawned
    }

    fn has_node_near(&self, point: WorldPos, anchor: impl Fn(&ResourceNode) -> WorldPos) -> bool {
        let limit = MIN_NODE_SPACING * MIN_NODE_SPACING;
        self.nodes
            .iter()
            .any(|node| anchor(node).distance_squared(point) < limit)
    }

    /// Closest non-depleted node whose center is strictly within `max_range`
    /// of the agent's center. Ties keep the earliest node.
    pub fn find_nearest_node(&self, agent_x: f32, agent_y: f32, max_range: f32) -> Option<&ResourceNode> {
        let mut nearest = None;
        let mut best = max_range;
        for node in self.nodes.iter().filter(|node| !node.is_depleted()) {
            let distance = node.distance_to_agent(agent_x, agent_y);
            if distance < best {
                best = distance;
                nearest = Some(node);
            }
        }
        nearest
    }

    /// Nodes whose footprint touches the rectangle, in creation order.
    pub fn nodes_in_area(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<&ResourceNode> {
        if min_x > max_x || min_y > max_y {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|node| {
                let pos = node.pos();
                pos.x + node.size() >= min_x
                    && pos.x <= max_x
                    && pos.y + node.size() >= min_y
                    && pos.y <= max_y
            })
            .collect()
    }

    /// Drop depleted nodes and return how many were removed.
    pub fn cleanup_depleted(&mut self) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| !node.is_depleted());
        let removed = before - self.nodes.len();
        if removed > 0 {
            debug!(removed, remaining = self.nodes.len(), "cleaned up depleted nodes");
        }
        removed
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        // ids are assigned in push order and removal keeps order
        self.nodes.binary_search_by_key(&id, |node| node.id()).ok()
    }

    pub fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.index_of(id).map(move |index| &mut self.nodes[index])
    }

    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    /// Non-depleted nodes of `kind`.
    pub fn count_nodes_by_kind(&self, kind: ResourceKind) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.kind() == kind && !node.is_depleted())
            .count()
    }

    pub fn total_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn active_nodes(&self) -> usize {
        self.nodes.iter().filter(|node| !node.is_depleted()).count()
    }

    /// Center of an agent whose top-left corner is `(agent_x, agent_y)`.
    pub fn agent_center(agent_x: f32, agent_y: f32) -> WorldPos {
        WorldPos::new(agent_x + AGENT_HALF_EXTENT, agent_y + AGENT_HALF_EXTENT)
    }
}
