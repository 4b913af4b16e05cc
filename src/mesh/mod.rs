//! Mesh construction module.
//!
//! Converts padded height grids into indexed triangle meshes with a
//! border vertex ring for seam-correct normals, at a selectable level of
//! detail and with a pluggable normal strategy.

mod builder;
mod normals;

pub use builder::{
    LevelOfDetail, MeshBuffers, MeshBuilder, MeshError, NormalContext, VertexRef,
};
pub use normals::{CrossNeighbor, FaceAveraging, NormalStrategy};
