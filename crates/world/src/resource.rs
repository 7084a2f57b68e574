//! Resource kinds and the per-biome spawn table.

use crate::terrain::TileType;
use serde::{Deserialize, Serialize};
use std::fmt;
use tilemine_core::Rgba;

/// Kind of deposit a resource node holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Iron,
    Copper,
    Coal,
    Stone,
    Oil,
}

/// Static properties of a [`ResourceKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceKindInfo {
    pub kind: ResourceKind,
    /// Base display color.
    pub color: Rgba,
    /// Inclusive richness range; `None` for inexhaustible kinds.
    pub amount_range: Option<(u32, u32)>,
    pub display_name: &'static str,
}

impl ResourceKind {
    /// Every kind, in declaration order.
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Iron,
        ResourceKind::Copper,
        ResourceKind::Coal,
        ResourceKind::Stone,
        ResourceKind::Oil,
    ];

    /// Static table entry for this kind.
    pub fn info(self) -> ResourceKindInfo {
        match self {
            ResourceKind::Iron => ResourceKindInfo {
                kind: self,
                color: Rgba::rgb(0.6, 0.6, 0.7),
                amount_range: Some((50, 100)),
                display_name: "Iron",
            },
            ResourceKind::Copper => ResourceKindInfo {
                kind: self,
                color: Rgba::rgb(0.8, 0.5, 0.3),
                amount_range: Some((40, 80)),
                display_name: "Copper",
            },
            ResourceKind::Coal => ResourceKindInfo {
                kind: self,
                color: Rgba::rgb(0.2, 0.2, 0.2),
                amount_range: Some((60, 120)),
                display_name: "Coal",
            },
            ResourceKind::Stone => ResourceKindInfo {
                kind: self,
                color: Rgba::rgb(0.5, 0.5, 0.5),
                amount_range: Some((70, 150)),
                display_name: "Stone",
            },
            ResourceKind::Oil => ResourceKindInfo {
                kind: self,
                color: Rgba::rgb(0.1, 0.1, 0.1),
                amount_range: None,
                display_name: "Oil",
            },
        }
    }

    pub fn color(self) -> Rgba {
        self.info().color
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn amount_range(self) -> Option<(u32, u32)> {
        self.info().amount_range
    }

    /// Inexhaustible kinds never lose amount when mined.
    pub fn is_infinite(self) -> bool {
        self.amount_range().is_none()
    }

    /// Pick the kind that spawns on `tile` for a roll in `[0, 1]`.
    ///
    /// Each biome has cumulative bands starting at zero; a roll past the last
    /// band spawns nothing.
    pub fn roll_for_biome(tile: TileType, chance: f32) -> Option<ResourceKind> {
        spawn_bands(tile)
            .iter()
            .find(|(upper, _)| chance < *upper)
            .map(|&(_, kind)| kind)
    }
}

/// Cumulative `(upper_bound, kind)` spawn bands for a biome.
pub fn spawn_bands(tile: TileType) -> &'static [(f32, ResourceKind)] {
    match tile {
        TileType::Stone => &[
            (0.08, ResourceKind::Iron),
            (0.14, ResourceKind::Copper),
            (0.20, ResourceKind::Stone),
        ],
        TileType::Forest => &[(0.06, ResourceKind::Coal), (0.10, ResourceKind::Copper)],
        TileType::Grass => &[(0.03, ResourceKind::Iron), (0.05, ResourceKind::Coal)],
        TileType::Sand => &[(0.10, ResourceKind::Oil)],
        TileType::Water | TileType::Road => &[],
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
