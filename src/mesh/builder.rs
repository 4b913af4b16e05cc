//! Height grid to triangle mesh construction.
//!
//! The builder samples a padded height grid at a level-of-detail stride
//! and produces two vertex populations: interior vertices, which form the
//! renderable mesh, and a one-ring border of auxiliary vertices on the
//! outermost cells of the padded grid. Border vertices never appear in
//! the renderable triangle list; they exist so normal computation at the
//! mesh edge sees the same neighborhood an adjacent, independently
//! generated chunk would see, making seam normals match exactly.

use glam::{Vec2, Vec3};
use std::sync::Arc;
use thiserror::Error;

use crate::terrain::{HeightCurve, HeightGrid};

use super::normals::{FaceAveraging, NormalStrategy};

/// Errors that can occur during mesh construction.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("level of detail {0} is out of range (0-6)")]
    LevelOfDetailOutOfRange(u8),
    #[error("height grid must be square, got {width}x{height}")]
    NonSquareGrid { width: u32, height: u32 },
    #[error("stride {stride} does not evenly divide the {size}x{size} grid span")]
    StrideMisaligned { size: u32, stride: usize },
    #[error(
        "stride {stride} leaves {vertices_per_line} vertices per line on a {size}x{size} grid; at least 2 are required"
    )]
    TooFewVertices {
        size: u32,
        stride: usize,
        vertices_per_line: isize,
    },
}

/// Mesh simplification level, 0 (full resolution) through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LevelOfDetail(u8);

impl LevelOfDetail {
    /// Highest supported level.
    pub const MAX: u8 = 6;

    /// Full-resolution mesh (stride 1).
    pub const FULL: LevelOfDetail = LevelOfDetail(0);

    /// Creates a level of detail, rejecting values above [`Self::MAX`].
    pub fn new(level: u8) -> Result<Self, MeshError> {
        if level > Self::MAX {
            return Err(MeshError::LevelOfDetailOutOfRange(level));
        }
        Ok(Self(level))
    }

    /// Returns the raw level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Returns the grid sampling stride: 1 at level 0, otherwise 2x the
    /// level.
    pub fn stride(self) -> usize {
        if self.0 == 0 {
            1
        } else {
            2 * self.0 as usize
        }
    }
}

impl Default for LevelOfDetail {
    fn default() -> Self {
        Self::FULL
    }
}

/// A resolved vertex slot: either a renderable interior vertex or an
/// auxiliary border vertex, each indexing its own array.
///
/// Replaces the negative-index convention some height-mesh generators use
/// to overload a single index space; the tag makes misresolution a type
/// error instead of a sign bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexRef {
    /// Index into the interior vertex/uv/normal arrays.
    Interior(u32),
    /// Index into the border vertex array.
    Border(u32),
}

impl VertexRef {
    /// Returns true for border slots.
    pub fn is_border(self) -> bool {
        matches!(self, VertexRef::Border(_))
    }
}

/// Write-once map from visited grid cells to vertex slots.
///
/// Built in the classification pass, consulted during vertex and triangle
/// emission and normal computation, then discarded with the build.
struct VertexIndexMap {
    size: usize,
    slots: Vec<Option<VertexRef>>,
}

impl VertexIndexMap {
    fn new(size: usize) -> Self {
        Self {
            size,
            slots: vec![None; size * size],
        }
    }

    fn assign(&mut self, x: usize, y: usize, slot: VertexRef) {
        let cell = &mut self.slots[y * self.size + x];
        debug_assert!(cell.is_none(), "vertex slot at ({}, {}) assigned twice", x, y);
        *cell = Some(slot);
    }

    /// Resolves a visited cell to its slot.
    ///
    /// # Panics
    /// Panics if the cell was never classified. That is a construction
    /// defect; a malformed mesh must never escape silently.
    fn get(&self, x: usize, y: usize) -> VertexRef {
        match self.slots[y * self.size + x] {
            Some(slot) => slot,
            None => panic!("grid cell ({}, {}) resolved to no vertex slot", x, y),
        }
    }
}

/// Raw buffers of a constructed terrain mesh.
///
/// `vertices`, `uvs`, and `normals` are parallel arrays of the renderable
/// mesh; `triangles` holds index triples into them. The border arrays
/// hold the auxiliary ring: `border_triangles` keeps full [`VertexRef`]s
/// because its triangles mix both populations, and nothing in it is ever
/// handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffers {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub border_vertices: Vec<Vec3>,
    pub border_triangles: Vec<[VertexRef; 3]>,
    vertices_per_line: u32,
}

impl MeshBuffers {
    fn with_capacity(vertices_per_line: usize) -> Self {
        let vpl = vertices_per_line;
        let lattice = vpl + 2;
        Self {
            vertices: Vec::with_capacity(vpl * vpl),
            uvs: Vec::with_capacity(vpl * vpl),
            normals: Vec::new(),
            triangles: Vec::with_capacity(2 * (vpl - 1) * (vpl - 1)),
            border_vertices: Vec::with_capacity(4 * vpl + 4),
            border_triangles: Vec::with_capacity(
                2 * ((lattice - 1) * (lattice - 1) - (vpl - 1) * (vpl - 1)),
            ),
            vertices_per_line: vpl as u32,
        }
    }

    /// Renderable vertex count per mesh row/column.
    pub fn vertices_per_line(&self) -> u32 {
        self.vertices_per_line
    }

    /// Renderable vertex count.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Renderable triangle count.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Resolves a vertex reference to its position in either population.
    pub fn position(&self, slot: VertexRef) -> Vec3 {
        match slot {
            VertexRef::Interior(i) => self.vertices[i as usize],
            VertexRef::Border(i) => self.border_vertices[i as usize],
        }
    }

    fn add_vertex(&mut self, slot: VertexRef, position: Vec3, uv: Vec2) {
        match slot {
            VertexRef::Interior(i) => {
                debug_assert_eq!(i as usize, self.vertices.len());
                self.vertices.push(position);
                // UVs are the fractional position inside the unpadded mesh
                // region; border vertices are never textured.
                self.uvs.push(uv);
            }
            VertexRef::Border(i) => {
                debug_assert_eq!(i as usize, self.border_vertices.len());
                self.border_vertices.push(position);
            }
        }
    }

    fn add_triangle(&mut self, a: VertexRef, b: VertexRef, c: VertexRef) {
        match (a, b, c) {
            (VertexRef::Interior(a), VertexRef::Interior(b), VertexRef::Interior(c)) => {
                self.triangles.push([a, b, c]);
            }
            _ => self.border_triangles.push([a, b, c]),
        }
    }
}

/// Read-only view handed to a [`NormalStrategy`] during construction.
///
/// Exposes the mesh buffers plus the vertex lattice, which is only alive
/// while the build runs. Lattice coordinates address the stride-visited
/// cells: `(0, 0)` is the border corner, interior vertices occupy
/// `1..=lattice_len()-2` on each axis.
pub struct NormalContext<'a> {
    buffers: &'a MeshBuffers,
    index_map: &'a VertexIndexMap,
    stride: usize,
    lattice_len: usize,
}

impl NormalContext<'_> {
    /// The mesh buffers under construction (normals still empty).
    pub fn buffers(&self) -> &MeshBuffers {
        self.buffers
    }

    /// Visited vertices per lattice row/column, border ring included.
    pub fn lattice_len(&self) -> usize {
        self.lattice_len
    }

    /// Resolves a lattice coordinate to its vertex slot.
    pub fn vertex_at(&self, col: usize, row: usize) -> VertexRef {
        self.index_map.get(col * self.stride, row * self.stride)
    }

    /// Resolves a vertex reference to its position.
    pub fn position(&self, slot: VertexRef) -> Vec3 {
        self.buffers.position(slot)
    }
}

/// Builds terrain meshes from padded height grids.
///
/// The normal strategy is injected once at construction; both provided
/// strategies consume the border ring, so the ring is always built.
#[derive(Clone)]
pub struct MeshBuilder {
    strategy: Arc<dyn NormalStrategy>,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    /// Creates a builder with the default face-averaging normal strategy.
    pub fn new() -> Self {
        Self::with_strategy(Arc::new(FaceAveraging))
    }

    /// Creates a builder with an explicit normal strategy.
    pub fn with_strategy(strategy: Arc<dyn NormalStrategy>) -> Self {
        Self { strategy }
    }

    /// Name of the injected normal strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Builds an indexed triangle mesh from a padded height grid.
    ///
    /// `grid` must be square and include the one-cell padding ring on each
    /// side. Heights are `curve(value) * height_multiplier`. The stride
    /// implied by `lod` must leave at least two vertices per line.
    ///
    /// # Arguments
    /// * `grid` - Padded, normally `[0, 1]`-normalized height grid
    /// * `height_multiplier` - Vertical exaggeration
    /// * `curve` - Height remapping, evaluated once per vertex
    /// * `lod` - Level of detail controlling the sampling stride
    pub fn build(
        &self,
        grid: &HeightGrid,
        height_multiplier: f32,
        curve: &HeightCurve,
        lod: LevelOfDetail,
    ) -> Result<MeshBuffers, MeshError> {
        if !grid.is_square() {
            return Err(MeshError::NonSquareGrid {
                width: grid.width(),
                height: grid.height(),
            });
        }

        let bordered_size = grid.width() as usize;
        let stride = lod.stride();

        if (bordered_size - 1) % stride != 0 {
            return Err(MeshError::StrideMisaligned {
                size: grid.width(),
                stride,
            });
        }

        let mesh_size = bordered_size as isize - 2 * stride as isize;
        let vertices_per_line = (mesh_size - 1) / stride as isize + 1;
        if vertices_per_line < 2 {
            return Err(MeshError::TooFewVertices {
                size: grid.width(),
                stride,
                vertices_per_line,
            });
        }
        let vertices_per_line = vertices_per_line as usize;
        let mesh_size = mesh_size as usize;

        // The planar footprint ignores simplification, so every LOD of the
        // same grid spans the same world-space square.
        let mesh_size_unsimplified = bordered_size - 2;
        let top_left_x = (mesh_size_unsimplified - 1) as f32 / -2.0;
        let top_left_z = (mesh_size_unsimplified - 1) as f32 / 2.0;

        // Classification pass: outermost ring of the padded grid becomes
        // border, everything else interior, each numbered in scan order.
        let mut index_map = VertexIndexMap::new(bordered_size);
        let mut interior_index = 0u32;
        let mut border_index = 0u32;

        for y in (0..bordered_size).step_by(stride) {
            for x in (0..bordered_size).step_by(stride) {
                let is_border =
                    y == 0 || y == bordered_size - 1 || x == 0 || x == bordered_size - 1;

                if is_border {
                    index_map.assign(x, y, VertexRef::Border(border_index));
                    border_index += 1;
                } else {
                    index_map.assign(x, y, VertexRef::Interior(interior_index));
                    interior_index += 1;
                }
            }
        }

        // Emission pass: positions, UVs, and the two triangles of each
        // quad whose anchor is not on the last visited row/column.
        let mut buffers = MeshBuffers::with_capacity(vertices_per_line);

        for y in (0..bordered_size).step_by(stride) {
            for x in (0..bordered_size).step_by(stride) {
                let slot = index_map.get(x, y);

                let percent = Vec2::new(
                    (x as f32 - stride as f32) / mesh_size as f32,
                    (y as f32 - stride as f32) / mesh_size as f32,
                );
                let height = curve.evaluate(grid.get(x as u32, y as u32)) * height_multiplier;
                let position = Vec3::new(
                    top_left_x + percent.x * mesh_size_unsimplified as f32,
                    height,
                    top_left_z - percent.y * mesh_size_unsimplified as f32,
                );

                buffers.add_vertex(slot, position, percent);

                if x < bordered_size - 1 && y < bordered_size - 1 {
                    let a = index_map.get(x, y);
                    let b = index_map.get(x + stride, y);
                    let c = index_map.get(x, y + stride);
                    let d = index_map.get(x + stride, y + stride);

                    buffers.add_triangle(a, d, c);
                    buffers.add_triangle(d, a, b);
                }
            }
        }

        let normals = {
            let context = NormalContext {
                buffers: &buffers,
                index_map: &index_map,
                stride,
                lattice_len: (bordered_size - 1) / stride + 1,
            };
            self.strategy.compute(&context)
        };
        debug_assert_eq!(normals.len(), buffers.vertices.len());
        buffers.normals = normals;

        Ok(buffers)
    }
}
