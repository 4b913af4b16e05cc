//! Procedural terrain chunk synthesis.
//!
//! This crate turns a seeded noise field into renderable terrain
//! geometry: deterministic multi-octave noise synthesis produces a
//! normalized height grid, and mesh construction converts that grid into
//! an indexed triangle mesh at a chosen level of detail. A one-ring
//! border of auxiliary vertices surrounds each mesh so normals at chunk
//! edges match adjacent, independently generated chunks without any
//! cross-chunk data.

pub mod export;
pub mod material;
pub mod mesh;
pub mod noise;
pub mod pipeline;
pub mod terrain;

pub use material::{MaterialBinder, MaterialSettings, TextureLayer};
pub use mesh::{
    CrossNeighbor, FaceAveraging, LevelOfDetail, MeshBuffers, MeshBuilder, MeshError,
    NormalStrategy, VertexRef,
};
pub use noise::{generate_height_grid, NoiseConfig};
pub use pipeline::{MapData, TerrainGenerator, TerrainScheduler, DEFAULT_CHUNK_SIZE};
pub use terrain::{FalloffMask, HeightCurve, HeightGrid, TerrainConfig};
