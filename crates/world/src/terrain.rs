//! Terrain classification.
//!
//! Maps `(seed, tile)` to a [`TileType`] through the layered gradient noise
//! plus a fixed road grid. Nothing is stored: every query recomputes the
//! answer, so the result is pure and time invariant.

use crate::noise::LayeredNoise;
use serde::{Deserialize, Serialize};
use tilemine_core::{Rgba, TileCoord, WorldSeed};

/// Spacing of the road grid in tiles.
pub const ROAD_SPACING: i32 = 64;
/// Number of tiles the road occupies at the start of each grid period.
pub const ROAD_WIDTH: i32 = 2;

/// Noise value below which tiles are water.
pub const WATER_THRESHOLD: f32 = -0.3;
/// Noise value below which tiles are sand.
pub const SAND_THRESHOLD: f32 = -0.1;
/// Noise value below which tiles are grass.
pub const GRASS_THRESHOLD: f32 = 0.2;
/// Noise value below which tiles are forest; everything above is stone.
pub const FOREST_THRESHOLD: f32 = 0.5;

/// Terrain category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileType {
    Grass,
    Road,
    Water,
    Forest,
    Sand,
    Stone,
}

impl TileType {
    /// Every tile type, in declaration order.
    pub const ALL: [TileType; 6] = [
        TileType::Grass,
        TileType::Road,
        TileType::Water,
        TileType::Forest,
        TileType::Sand,
        TileType::Stone,
    ];

    /// Agents may stand on every tile except water.
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileType::Water)
    }

    /// Human-facing name.
    pub fn display_name(self) -> &'static str {
        match self {
            TileType::Grass => "Meadow",
            TileType::Road => "Road",
            TileType::Water => "Water",
            TileType::Forest => "Forest",
            TileType::Sand => "Beach",
            TileType::Stone => "Mountain",
        }
    }

    /// Flat fill color for renderers.
    pub fn color(self) -> Rgba {
        match self {
            TileType::Grass => Rgba::rgb(0.3, 0.7, 0.3),
            TileType::Road => Rgba::rgb(0.4, 0.4, 0.4),
            TileType::Water => Rgba::rgb(0.2, 0.4, 0.8),
            TileType::Forest => Rgba::rgb(0.1, 0.5, 0.2),
            TileType::Sand => Rgba::rgb(0.9, 0.8, 0.5),
            TileType::Stone => Rgba::rgb(0.5, 0.5, 0.5),
        }
    }

    /// Single character used by ASCII map dumps.
    pub fn glyph(self) -> char {
        match self {
            TileType::Grass => '.',
            TileType::Road => '#',
            TileType::Water => '~',
            TileType::Forest => 'T',
            TileType::Sand => ':',
            TileType::Stone => '^',
        }
    }
}

/// True when `(x, y)` lies on the road grid.
///
/// Uses the truncating remainder, so lines on the negative side are a single
/// tile wide (`-64` is road, `-63` is not).
pub fn is_road(x: i32, y: i32) -> bool {
    let on_line = |v: i32| (0..ROAD_WIDTH).contains(&(v % ROAD_SPACING));
    on_line(x) || on_line(y)
}

/// Map a combined noise value to its biome.
pub fn tile_for_noise(value: f32) -> TileType {
    if value < WATER_THRESHOLD {
        TileType::Water
    } else if value < SAND_THRESHOLD {
        TileType::Sand
    } else if value < GRASS_THRESHOLD {
        TileType::Grass
    } else if value < FOREST_THRESHOLD {
        TileType::Forest
    } else {
        TileType::Stone
    }
}

/// Seeded terrain classifier.
#[derive(Debug, Clone, Copy)]
pub struct TerrainField {
    seed: WorldSeed,
    noise: LayeredNoise,
}

impl TerrainField {
    /// Create a classifier for `seed`.
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            seed,
            noise: LayeredNoise::new(seed),
        }
    }

    /// Seed this classifier was built from.
    pub fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Combined two-octave noise at a tile.
    pub fn sample_noise(&self, x: i32, y: i32) -> f32 {
        self.noise.sample(x, y)
    }

    /// Tile type at `(x, y)`.
    pub fn classify(&self, x: i32, y: i32) -> TileType {
        if is_road(x, y) {
            return TileType::Road;
        }
        tile_for_noise(self.sample_noise(x, y))
    }

    /// Tile type at `coord`.
    pub fn classify_coord(&self, coord: TileCoord) -> TileType {
        self.classify(coord.x, coord.y)
    }
}

/// One-shot classification without keeping a [`TerrainField`] around.
pub fn classify(seed: WorldSeed, x: i32, y: i32) -> TileType {
    TerrainField::new(seed).classify(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_road_for_seed_42() {
        assert_eq!(classify(WorldSeed(42), 0, 0), TileType::Road);
    }

    #[test]
    fn test_road_grid_ignores_seed() {
        for seed in [0_u64, 42, 21_343_124, u64::MAX] {
            let field = TerrainField::new(WorldSeed(seed));
            for i in -200..200 {
                assert_eq!(field.classify(64, i), TileType::Road);
                assert_eq!(field.classify(i, 65), TileType::Road);
                assert_eq!(field.classify(-64, i), TileType::Road);
                assert_eq!(field.classify(i, -128), TileType::Road);
            }
        }
    }

    #[test]
    fn test_negative_road_lines_are_one_tile_wide() {
        assert!(is_road(-64, 5));
        assert!(!is_road(-63, 5));
        assert!(!is_road(-127, 5));
        assert!(is_road(-128, 5));
        assert!(!is_road(-65, 5));
        assert!(!is_road(-1, 5));
        assert!(is_road(5, -64));
        assert!(!is_road(5, -63));
    }

    #[test]
    fn test_negative_second_column_takes_noise_biome() {
        let field = TerrainField::new(WorldSeed(42));
        assert_eq!(field.classify(-64, 5), TileType::Road);
        assert_ne!(field.classify(-63, 5), TileType::Road);
        assert_eq!(
            field.classify(-63, 5),
            tile_for_noise(field.sample_noise(-63, 5))
        );
    }

    #[test]
    fn test_known_tiles_for_seed_42() {
        let field = TerrainField::new(WorldSeed(42));
        assert_eq!(field.classify(2, 2), TileType::Forest);
        assert_eq!(field.classify(5, 5), TileType::Forest);
        assert_eq!(field.classify(10, 10), TileType::Forest);
        assert_eq!(field.classify(-3, 7), TileType::Grass);
        assert_eq!(field.classify(100, -37), TileType::Grass);
    }

    #[test]
    fn test_shared_lattice_points_are_grass() {
        // noise is exactly zero there, which falls in the grass band
        for seed in [1_u64, 42, 777] {
            let field = TerrainField::new(WorldSeed(seed));
            assert_eq!(field.classify(20, 20), TileType::Grass);
            assert_eq!(field.classify(40, -60), TileType::Grass);
            assert_eq!(field.classify(-20, 100), TileType::Grass);
        }
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(tile_for_noise(-0.31), TileType::Water);
        assert_eq!(tile_for_noise(-0.3), TileType::Sand);
        assert_eq!(tile_for_noise(-0.1), TileType::Grass);
        assert_eq!(tile_for_noise(0.2), TileType::Forest);
        assert_eq!(tile_for_noise(0.5), TileType::Stone);
        assert_eq!(tile_for_noise(0.9), TileType::Stone);
    }

    #[test]
    fn test_every_biome_appears() {
        let field = TerrainField::new(WorldSeed(42));
        let mut seen = std::collections::BTreeSet::new();
        for x in -150..150 {
            for y in -150..150 {
                seen.insert(field.classify(x, y));
            }
        }
        assert_eq!(seen.len(), TileType::ALL.len(), "saw only {:?}", seen);
    }

    #[test]
    fn test_only_water_blocks_walking() {
        for tile in TileType::ALL {
            assert_eq!(tile.is_walkable(), tile != TileType::Water);
        }
    }

    #[test]
    fn test_display_names() {
        let names: Vec<_> = TileType::ALL.iter().map(|t| t.display_name()).collect();
        assert_eq!(
            names,
            ["Meadow", "Road", "Water", "Forest", "Beach", "Mountain"]
        );
    }

    #[test]
    fn test_glyphs_are_distinct() {
        let glyphs: std::collections::HashSet<_> = TileType::ALL.iter().map(|t| t.glyph()).collect();
        assert_eq!(glyphs.len(), TileType::ALL.len());
    }
}
