//! Multi-octave fractal noise synthesis for terrain height grids.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use simdnoise::NoiseBuilder;

use crate::terrain::HeightGrid;

/// Smallest usable sampling scale. Non-positive scales are clamped here
/// instead of failing, so a zeroed-out config still produces a grid.
const MIN_SCALE: f32 = 1e-4;

/// Per-octave offsets are drawn from this symmetric range.
const OFFSET_RANGE: i32 = 100_000;

/// Fixed lattice seed for the underlying noise function. Seed variation
/// enters through the per-octave offsets, not the lattice.
const LATTICE_SEED: i32 = 1337;

/// Configuration for fractal height grid generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseConfig {
    /// Random seed for reproducible generation.
    pub seed: u64,
    /// Sampling scale: larger values zoom out, sampling a wider area.
    /// Must be > 0; non-positive values are clamped to a small epsilon.
    pub scale: f32,
    /// Number of noise octaves.
    pub octaves: u32,
    /// Amplitude decay per octave, expected in (0, 1].
    pub persistence: f32,
    /// Frequency growth per octave, expected >= 1.
    pub lacunarity: f32,
    /// Pans the sample window across the noise field.
    pub offset: Vec2,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
        }
    }
}

impl NoiseConfig {
    /// Creates a configuration with the given seed and default shaping.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Creates a rougher, more mountainous configuration.
    pub fn rugged(seed: u64) -> Self {
        Self {
            seed,
            octaves: 6,
            persistence: 0.55,
            lacunarity: 2.1,
            ..Default::default()
        }
    }
}

/// Generates a normalized height grid from fractal noise.
///
/// The result is deterministic: identical dimensions and configuration
/// yield a bit-identical grid. Per-octave offsets are drawn from a
/// seeded generator in a fixed order (x then y, one pair per octave)
/// before any sampling happens, and sampling is centered on the grid so
/// changing `scale` zooms about the middle rather than a corner.
///
/// Every cell of the returned grid lies in `[0, 1]`, remapped by a single
/// global inverse-lerp over the raw accumulator range. The degenerate
/// case where all cells are equal (e.g. `octaves == 0`) yields a uniform
/// 0.5 grid.
pub fn generate_height_grid(width: u32, height: u32, config: &NoiseConfig) -> HeightGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let octave_offsets: Vec<Vec2> = (0..config.octaves)
        .map(|_| {
            let x = rng.random_range(-OFFSET_RANGE..OFFSET_RANGE) as f32 + config.offset.x;
            let y = rng.random_range(-OFFSET_RANGE..OFFSET_RANGE) as f32 + config.offset.y;
            Vec2::new(x, y)
        })
        .collect();

    let scale = if config.scale <= 0.0 {
        MIN_SCALE
    } else {
        config.scale
    };

    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;

    let mut grid = HeightGrid::new(width, height);

    grid.values_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let mut amplitude = 1.0f32;
                let mut frequency = 1.0f32;
                let mut accumulated = 0.0f32;

                for offset in &octave_offsets {
                    let sample_x = (x as f32 - half_width) / scale * frequency + offset.x;
                    let sample_y = (y as f32 - half_height) / scale * frequency + offset.y;

                    accumulated += sample_noise(sample_x, sample_y) * amplitude;

                    amplitude *= config.persistence;
                    frequency *= config.lacunarity;
                }

                *cell = accumulated;
            }
        });

    normalize(&mut grid);
    grid
}

/// Samples the smooth 2D noise function at a single point.
///
/// The builder offset is the sample coordinate: with unit frequency and a
/// single octave the library's own fractal machinery is inert, and the
/// octave loop above stays in this crate. The sampler's output is signed
/// and symmetric about zero, so no extra recentering is needed before
/// amplitude weighting.
fn sample_noise(x: f32, y: f32) -> f32 {
    NoiseBuilder::fbm_2d_offset(x, 1, y, 1)
        .with_seed(LATTICE_SEED)
        .with_freq(1.0)
        .with_octaves(1)
        .generate()
        .0[0]
}

/// Remaps the whole grid from its observed [min, max] range to [0, 1].
fn normalize(grid: &mut HeightGrid) {
    let (min, max) = grid.value_range();

    if max > min {
        let range = max - min;
        for value in grid.values_mut() {
            *value = (*value - min) / range;
        }
    } else {
        // All cells identical; inverse-lerp is undefined.
        for value in grid.values_mut() {
            *value = 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NoiseConfig::default();
        assert_eq!(config.octaves, 4);
        assert_eq!(config.persistence, 0.5);
        assert_eq!(config.lacunarity, 2.0);
    }

    #[test]
    fn test_deterministic() {
        let config = NoiseConfig::with_seed(12345);
        let a = generate_height_grid(64, 64, &config);
        let b = generate_height_grid(64, 64, &config);
        assert_eq!(a, b, "same seed and dimensions should be bit-identical");
    }

    #[test]
    fn test_normalized_range() {
        let config = NoiseConfig::default();
        let grid = generate_height_grid(96, 96, &config);

        for &v in grid.values() {
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }

        // The global inverse-lerp pins the observed extremes to 0 and 1.
        assert!(grid.values().iter().any(|&v| v == 0.0));
        assert!(grid.values().iter().any(|&v| v == 1.0));
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = generate_height_grid(32, 32, &NoiseConfig::with_seed(1));
        let b = generate_height_grid(32, 32, &NoiseConfig::with_seed(2));
        assert_ne!(a, b, "different seeds should produce different grids");
    }

    #[test]
    fn test_offset_pans_the_window() {
        let base = NoiseConfig::with_seed(7);
        let panned = NoiseConfig {
            offset: Vec2::new(50.0, 0.0),
            ..base.clone()
        };
        let a = generate_height_grid(32, 32, &base);
        let b = generate_height_grid(32, 32, &panned);
        assert_ne!(a, b, "a panned window should sample different terrain");
    }

    #[test]
    fn test_zero_octaves_yields_uniform_grid() {
        let config = NoiseConfig {
            octaves: 0,
            ..Default::default()
        };
        let grid = generate_height_grid(16, 16, &config);
        assert!(grid.values().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_non_positive_scale_is_clamped() {
        let config = NoiseConfig {
            scale: 0.0,
            ..Default::default()
        };
        // Must not divide by zero; the grid is still valid and normalized.
        let grid = generate_height_grid(16, 16, &config);
        for &v in grid.values() {
            assert!(v.is_finite());
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
