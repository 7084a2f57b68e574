//! Tile lattice and world-space coordinates.
//!
//! Tiles are addressed by unbounded signed integers; world space is measured
//! in floating point units with `TILE_SIZE` units per tile edge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 32.0;

/// Integer address of a unit cell on the terrain lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TileCoord {
    /// Construct a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a world position, truncating toward zero.
    pub fn containing(pos: WorldPos) -> Self {
        Self {
            x: (pos.x / TILE_SIZE) as i32,
            y: (pos.y / TILE_SIZE) as i32,
        }
    }

    /// World position of the tile's origin corner.
    pub fn world_origin(self) -> WorldPos {
        WorldPos::new(self.x as f32 * TILE_SIZE, self.y as f32 * TILE_SIZE)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Error returned when parsing a [`TileCoord`] from `"x,y"` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordParseError {
    /// Input did not contain exactly two comma-separated parts.
    #[error("expected `x,y`, got `{0}`")]
    Shape(String),
    /// One of the components was not an integer.
    #[error("invalid {axis} component `{value}`")]
    Component {
        /// Which axis failed.
        axis: &'static str,
        /// Offending text.
        value: String,
    },
}

impl FromStr for TileCoord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| CoordParseError::Shape(s.to_string()))?;
        if y.contains(',') {
            return Err(CoordParseError::Shape(s.to_string()));
        }
        let parse = |axis: &'static str, value: &str| {
            value
                .trim()
                .parse::<i32>()
                .map_err(|_| CoordParseError::Component {
                    axis,
                    value: value.trim().to_string(),
                })
        };
        Ok(Self {
            x: parse("x", x)?,
            y: parse("y", y)?,
        })
    }
}

/// Continuous world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl WorldPos {
    /// Construct a world position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: WorldPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: WorldPos) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}
