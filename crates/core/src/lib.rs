#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod color;
pub mod coords;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use color::Rgba;
pub use coords::{CoordParseError, TileCoord, WorldPos, TILE_SIZE};

/// Fixed tick type (20 TPS => 50 ms per tick in the headless runner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// World seed: the only input besides tile coordinates that terrain and
/// spawn decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(pub u64);

impl WorldSeed {
    /// Seed as the signed 64-bit value used by the lattice hash.
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl From<u64> for WorldSeed {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<i64> for WorldSeed {
    fn from(value: i64) -> Self {
        Self(value as u64)
    }
}

/// Build the generator used for cosmetic, non-reproducible draws.
///
/// `Some(seed)` pins the stream (tests, replays); `None` seeds from OS entropy.
pub fn cosmetic_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
