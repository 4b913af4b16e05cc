//! Terrain data module.
//!
//! Provides the HeightGrid buffer type shared by the noise and mesh
//! stages, the falloff mask for island terrain, and the terrain shaping
//! configuration.

mod config;
mod falloff;
mod height_grid;

pub use config::{HeightCurve, TerrainConfig};
pub use falloff::FalloffMask;
pub use height_grid::HeightGrid;
