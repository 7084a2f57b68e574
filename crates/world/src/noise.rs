//! Noise generation utilities for terrain generation.
//!
//! Gradient ("Perlin-style") noise keyed by a 64-bit lattice hash. All noise
//! math runs in `f32` and all hash mixing in wrapping `i64`, so the same seed
//! produces bit-identical terrain on every platform.

use tilemine_core::WorldSeed;

/// Multiplier applied to the lattice column.
pub const HASH_X_PRIME: i64 = 374_761_393;
/// Multiplier applied to the lattice row.
pub const HASH_Y_PRIME: i64 = 668_265_263;
/// Multiplier of the scramble step.
pub const SCRAMBLE_PRIME: i64 = 1_274_126_177;

/// Raw lattice hash `x * 374761393 + y * 668265263 + seed` with wraparound.
pub fn lattice_hash(x: i32, y: i32, seed: WorldSeed) -> i64 {
    i64::from(x)
        .wrapping_mul(HASH_X_PRIME)
        .wrapping_add(i64::from(y).wrapping_mul(HASH_Y_PRIME))
        .wrapping_add(seed.as_i64())
}

/// Shift-xor-multiply scramble (arithmetic shift).
pub fn scramble(hash: i64) -> i64 {
    (hash ^ (hash >> 13)).wrapping_mul(SCRAMBLE_PRIME)
}

/// Low 16 bits of `hash` normalized into `[0.0, 1.0]`.
pub fn hash_unit(hash: i64) -> f32 {
    (hash & 0xFFFF) as f32 / 0xFFFF as f32
}

/// Scrambled lattice hash mapped to `[0.0, 1.0]`.
pub fn lattice_unit(x: i32, y: i32, seed: WorldSeed) -> f32 {
    hash_unit(scramble(lattice_hash(x, y, seed)))
}

/// Quintic smoothing curve `t³(t(6t − 15) + 10)`.
#[inline]
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}

/// Single-octave gradient noise over the integer lattice.
#[derive(Debug, Clone, Copy)]
pub struct GradientNoise {
    seed: WorldSeed,
}

impl GradientNoise {
    /// Create a noise source for `seed`.
    pub fn new(seed: WorldSeed) -> Self {
        Self { seed }
    }

    /// Unit gradient assigned to a lattice corner.
    pub fn gradient(&self, ix: i32, iy: i32) -> (f32, f32) {
        let hash = scramble(lattice_hash(ix, iy, self.seed));
        let angle = hash_unit(hash) * std::f32::consts::PI * 2.0;
        let angle = f64::from(angle);
        (angle.cos() as f32, angle.sin() as f32)
    }

    fn dot_grid_gradient(&self, ix: i32, iy: i32, x: f32, y: f32) -> f32 {
        let (gx, gy) = self.gradient(ix, iy);
        let dx = x - ix as f32;
        let dy = y - iy as f32;
        dx * gx + dy * gy
    }

    /// Sample the noise at a continuous lattice position.
    ///
    /// Values lie in roughly `[-0.71, 0.71]` and are exactly zero on lattice
    /// points.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor() as i32;
        let y0 = y.floor() as i32;
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);

        let sx = fade(x - x0 as f32);
        let sy = fade(y - y0 as f32);

        let n0 = self.dot_grid_gradient(x0, y0, x, y);
        let n1 = self.dot_grid_gradient(x1, y0, x, y);
        let ix0 = lerp(n0, n1, sx);

        let n0 = self.dot_grid_gradient(x0, y1, x, y);
        let n1 = self.dot_grid_gradient(x1, y1, x, y);
        let ix1 = lerp(n0, n1, sx);

        lerp(ix0, ix1, sy)
    }
}

/// One layer of the terrain noise stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Octave {
    /// Tile coordinates are multiplied by this before sampling.
    pub frequency: f32,
    /// Contribution of this layer to the sum.
    pub weight: f32,
}

/// Base octave: large biome blobs.
pub const BASE_OCTAVE: Octave = Octave {
    frequency: 0.05,
    weight: 1.0,
};

/// Detail octave: breaks up biome borders.
pub const DETAIL_OCTAVE: Octave = Octave {
    frequency: 0.2,
    weight: 0.3,
};

/// Two-octave stack used by the terrain classifier.
#[derive(Debug, Clone, Copy)]
pub struct LayeredNoise {
    noise: GradientNoise,
}

impl LayeredNoise {
    /// Create the terrain noise stack for `seed`.
    pub fn new(seed: WorldSeed) -> Self {
        Self {
            noise: GradientNoise::new(seed),
        }
    }

    fn sample_octave(&self, octave: Octave, x: i32, y: i32) -> f32 {
        let fx = x as f32 * octave.frequency;
        let fy = y as f32 * octave.frequency;
        self.noise.sample(fx, fy) * octave.weight
    }

    /// Sample both layers at a tile coordinate.
    ///
    /// Returns `(base, detail)` with the detail weight already applied.
    pub fn sample_layers(&self, x: i32, y: i32) -> (f32, f32) {
        (
            self.sample_octave(BASE_OCTAVE, x, y),
            self.sample_octave(DETAIL_OCTAVE, x, y),
        )
    }

    /// Combined noise value driving biome thresholds.
    pub fn sample(&self, x: i32, y: i32) -> f32 {
        let (base, detail) = self.sample_layers(x, y);
        base + detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: WorldSeed = WorldSeed(12345);

    #[test]
    fn test_lattice_hash_wraps() {
        // i32::MAX * 374761393 overflows i32 but not the i64 product
        let h = lattice_hash(i32::MAX, 0, WorldSeed(0));
        assert_eq!(h, i64::from(i32::MAX) * HASH_X_PRIME);

        // adding a huge seed wraps instead of panicking
        let h = lattice_hash(1, 1, WorldSeed(u64::MAX));
        assert_eq!(h, HASH_X_PRIME + HASH_Y_PRIME - 1);
    }

    #[test]
    fn test_scramble_uses_arithmetic_shift() {
        assert_eq!(scramble(0), 0);
        // -1 >> 13 stays -1, so the xor clears every bit
        assert_eq!(scramble(-1), 0);
        assert_eq!(scramble(1), SCRAMBLE_PRIME);
    }

    #[test]
    fn test_hash_unit_range() {
        assert_eq!(hash_unit(0), 0.0);
        assert_eq!(hash_unit(0xFFFF), 1.0);
        assert_eq!(hash_unit(0x1_0000), 0.0);
        assert!((hash_unit(-1) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gradients_are_unit_length() {
        let noise = GradientNoise::new(SEED);
        for x in -20..20 {
            for y in -20..20 {
                let (gx, gy) = noise.gradient(x, y);
                let len = (gx * gx + gy * gy).sqrt();
                assert!((len - 1.0).abs() < 1e-5, "gradient at ({x}, {y}) has length {len}");
            }
        }
    }

    #[test]
    fn test_noise_determinism() {
        let a = GradientNoise::new(SEED);
        let b = GradientNoise::new(SEED);

        for x in 0..10 {
            for y in 0..10 {
                let px = x as f32 * 0.37;
                let py = y as f32 * 0.61;
                assert_eq!(
                    a.sample(px, py).to_bits(),
                    b.sample(px, py).to_bits(),
                    "Noise not deterministic at ({}, {})",
                    px,
                    py
                );
            }
        }
    }

    #[test]
    fn test_noise_is_zero_on_lattice_points() {
        let noise = GradientNoise::new(SEED);
        for x in -5..5 {
            for y in -5..5 {
                assert_eq!(noise.sample(x as f32, y as f32), 0.0);
            }
        }
    }

    #[test]
    fn test_noise_range() {
        let noise = GradientNoise::new(SEED);
        for x in 0..100 {
            for y in 0..100 {
                let val = noise.sample(x as f32 * 0.13 - 6.0, y as f32 * 0.17 - 8.0);
                assert!(
                    (-0.75..=0.75).contains(&val),
                    "Noise value {} out of range at ({}, {})",
                    val,
                    x,
                    y
                );
            }
        }
    }

    #[test]
    fn test_different_seeds_produce_different_noise() {
        let a = LayeredNoise::new(WorldSeed(1));
        let b = LayeredNoise::new(WorldSeed(2));

        let any_different = (0..20)
            .flat_map(|x| (0..20).map(move |y| (x * 3 + 1, y * 3 + 2)))
            .any(|(x, y)| (a.sample(x, y) - b.sample(x, y)).abs() > 0.001);

        assert!(any_different, "Different seeds should produce different noise");
    }

    #[test]
    fn test_layered_noise_matches_weighted_octaves() {
        let layered = LayeredNoise::new(SEED);
        let raw = GradientNoise::new(SEED);
        for (x, y) in [(3, 7), (-11, 4), (25, -33)] {
            let base = raw.sample(x as f32 * 0.05, y as f32 * 0.05);
            let detail = raw.sample(x as f32 * 0.2, y as f32 * 0.2) * 0.3;
            assert_eq!(layered.sample(x, y), base + detail);
        }
    }

    #[test]
    fn test_layered_noise_vanishes_on_shared_lattice_points() {
        // multiples of 20 land on integer lattice points in both octaves
        for seed in [0_u64, 42, 987_654_321] {
            let layered = LayeredNoise::new(WorldSeed(seed));
            assert_eq!(layered.sample(20, 20), 0.0);
            assert_eq!(layered.sample(-40, 60), 0.0);
        }
    }
}
