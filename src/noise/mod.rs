//! Noise generation module for terrain synthesis.
//!
//! The octave accumulation, offsetting, and normalization live here; only
//! the smooth 2D base function is delegated to simdnoise.

mod fractal;

pub use fractal::{generate_height_grid, NoiseConfig};
