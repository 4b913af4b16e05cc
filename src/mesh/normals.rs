//! Per-vertex normal computation strategies.
//!
//! Both strategies consume the border ring so that normals along a chunk
//! edge match what a laterally adjacent, independently generated chunk
//! computes for the shared seam vertices.

use glam::Vec3;
use rayon::prelude::*;

use super::builder::{NormalContext, VertexRef};

/// Computes one normal per interior vertex of a mesh under construction.
///
/// Implementations must return unit-length normals (zero only for fully
/// degenerate geometry), oriented +Y-up to match the builder's winding.
pub trait NormalStrategy: Send + Sync {
    /// Short identifier for diagnostics.
    fn name(&self) -> &'static str;

    /// Computes normals for every interior vertex, in vertex order.
    fn compute(&self, context: &NormalContext<'_>) -> Vec<Vec3>;
}

/// Face-normal accumulation over interior and border triangles.
///
/// Each triangle's unnormalized cross product is added to its interior
/// vertices, weighting the blend by face area; border-vertex accumulators
/// are never needed downstream and are not kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaceAveraging;

impl NormalStrategy for FaceAveraging {
    fn name(&self) -> &'static str {
        "face-averaging"
    }

    fn compute(&self, context: &NormalContext<'_>) -> Vec<Vec3> {
        let mesh = context.buffers();
        let mut accumulated = vec![Vec3::ZERO; mesh.vertex_count()];

        for triangle in &mesh.triangles {
            let a = mesh.vertices[triangle[0] as usize];
            let b = mesh.vertices[triangle[1] as usize];
            let c = mesh.vertices[triangle[2] as usize];
            let face = (b - a).cross(c - a);

            for &index in triangle {
                accumulated[index as usize] += face;
            }
        }

        // Border triangles complete the fans of edge-adjacent interior
        // vertices; only their interior corners accumulate.
        for triangle in &mesh.border_triangles {
            let a = context.position(triangle[0]);
            let b = context.position(triangle[1]);
            let c = context.position(triangle[2]);
            let face = (b - a).cross(c - a);

            for &slot in triangle {
                if let VertexRef::Interior(index) = slot {
                    accumulated[index as usize] += face;
                }
            }
        }

        accumulated
            .into_iter()
            .map(|n| n.normalize_or_zero())
            .collect()
    }
}

/// Central-difference normals from the four lattice neighbors.
///
/// For each interior vertex the left/right and top/bottom neighbors form
/// two edge vectors whose cross product is the normal. Neighbors of
/// edge-adjacent interior vertices land on the border ring, which is the
/// reason the ring exists; a neighbor outside the lattice (impossible
/// while the ring is present) clamps to the vertex itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossNeighbor;

impl NormalStrategy for CrossNeighbor {
    fn name(&self) -> &'static str {
        "cross-neighbor"
    }

    fn compute(&self, context: &NormalContext<'_>) -> Vec<Vec3> {
        let lattice = context.lattice_len();
        let per_line = lattice - 2;
        let last = (lattice - 1) as isize;

        (0..per_line * per_line)
            .into_par_iter()
            .map(|i| {
                let row = (i / per_line + 1) as isize;
                let col = (i % per_line + 1) as isize;
                let clamped = |v: isize| v.clamp(0, last) as usize;

                let left = context.position(context.vertex_at(clamped(col - 1), row as usize));
                let right = context.position(context.vertex_at(clamped(col + 1), row as usize));
                let top = context.position(context.vertex_at(col as usize, clamped(row - 1)));
                let bottom = context.position(context.vertex_at(col as usize, clamped(row + 1)));

                // In the builder's frame (X with grid x, Z against grid y)
                // this cross points +Y, matching the triangle winding.
                (right - left).cross(bottom - top).normalize_or_zero()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::builder::{LevelOfDetail, MeshBuilder};
    use crate::noise::{generate_height_grid, NoiseConfig};
    use crate::terrain::{HeightCurve, HeightGrid};
    use std::sync::Arc;

    fn build_with(strategy: Arc<dyn NormalStrategy>, grid: &HeightGrid, multiplier: f32) -> crate::mesh::MeshBuffers {
        MeshBuilder::with_strategy(strategy)
            .build(grid, multiplier, &HeightCurve::identity(), LevelOfDetail::FULL)
            .unwrap()
    }

    fn flat_grid(size: u32) -> HeightGrid {
        HeightGrid::from_values(size, size, vec![0.5; (size * size) as usize])
    }

    #[test]
    fn test_flat_grid_normals_point_up() {
        let grid = flat_grid(11);
        for strategy in [
            Arc::new(FaceAveraging) as Arc<dyn NormalStrategy>,
            Arc::new(CrossNeighbor),
        ] {
            let name = strategy.name();
            let mesh = build_with(strategy, &grid, 5.0);
            for normal in &mesh.normals {
                assert_eq!(*normal, Vec3::Y, "{} normal should be +Y on a plane", name);
            }
        }
    }

    #[test]
    fn test_unit_length_normals() {
        let grid = generate_height_grid(33, 33, &NoiseConfig::with_seed(11));
        for strategy in [
            Arc::new(FaceAveraging) as Arc<dyn NormalStrategy>,
            Arc::new(CrossNeighbor),
        ] {
            let name = strategy.name();
            let mesh = build_with(strategy, &grid, 20.0);
            for normal in &mesh.normals {
                assert!(
                    (normal.length() - 1.0).abs() < 1e-4,
                    "{} normal {:?} is not unit length",
                    name,
                    normal
                );
            }
        }
    }

    #[test]
    fn test_strategies_agree_on_a_plane() {
        // A linear ramp has a single exact surface normal; face averaging
        // and central differences both recover it.
        let size = 15u32;
        let mut grid = HeightGrid::new(size, size);
        for (x, y) in grid.cell_coords().collect::<Vec<_>>() {
            grid.set(x, y, x as f32 * 0.02);
        }

        let face = build_with(Arc::new(FaceAveraging), &grid, 10.0);
        let cross = build_with(Arc::new(CrossNeighbor), &grid, 10.0);

        for (a, b) in face.normals.iter().zip(cross.normals.iter()) {
            assert!(
                (*a - *b).length() < 1e-5,
                "strategies disagree on a plane: {:?} vs {:?}",
                a,
                b
            );
        }
    }

    #[test]
    fn test_border_ring_feeds_face_averaged_edge_normals() {
        // The only relief sits on the padding ring. Interior triangles are
        // all flat, so a tilt in any edge normal can only have come from
        // border triangle accumulation.
        let mut grid = flat_grid(9);
        grid.set(0, 4, 5.0);

        let mesh = build_with(Arc::new(FaceAveraging), &grid, 1.0);
        assert!(
            mesh.normals.iter().any(|n| *n != Vec3::Y),
            "border triangles should influence edge normals"
        );
    }

    #[test]
    fn test_border_ring_feeds_cross_neighbor_edge_normals() {
        let mut grid = flat_grid(9);
        grid.set(0, 4, 5.0);

        let mesh = build_with(Arc::new(CrossNeighbor), &grid, 1.0);
        assert!(
            mesh.normals.iter().any(|n| *n != Vec3::Y),
            "ring neighbors should influence edge normals"
        );
    }

    /// Deterministic stand-in for a world-space height field shared by
    /// two adjacent chunks.
    fn global_height(gx: u32, gy: u32) -> f32 {
        (gx as f32 * 0.37).sin() * 0.5 + (gy as f32 * 0.23).cos() * 0.5
    }

    fn chunk_grid(size: u32, offset_x: u32) -> HeightGrid {
        let mut grid = HeightGrid::new(size, size);
        for y in 0..size {
            for x in 0..size {
                grid.set(x, y, global_height(x + offset_x, y));
            }
        }
        grid
    }

    #[test]
    fn test_cross_neighbor_seam_consistency() {
        // Chunk B starts where chunk A's interior ends, overlapping by the
        // border ring. The shared seam column must produce bit-identical
        // normals in both meshes. A power-of-two mesh span keeps the
        // position remap exact, so the comparison can be exact too.
        let n = 18u32;
        let left = chunk_grid(n, 0);
        let right = chunk_grid(n, n - 3);

        let mesh_left = build_with(Arc::new(CrossNeighbor), &left, 12.0);
        let mesh_right = build_with(Arc::new(CrossNeighbor), &right, 12.0);

        let per_line = mesh_left.vertices_per_line() as usize;
        for row in 0..per_line {
            let a = mesh_left.normals[row * per_line + (per_line - 1)];
            let b = mesh_right.normals[row * per_line];
            assert_eq!(a, b, "seam normals differ at row {}", row);
        }
    }

    #[test]
    fn test_face_averaging_seam_consistency() {
        // Border triangles complete the seam fans, so face averaging is
        // seam-consistent too (up to accumulation rounding).
        let n = 18u32;
        let left = chunk_grid(n, 0);
        let right = chunk_grid(n, n - 3);

        let mesh_left = build_with(Arc::new(FaceAveraging), &left, 12.0);
        let mesh_right = build_with(Arc::new(FaceAveraging), &right, 12.0);

        let per_line = mesh_left.vertices_per_line() as usize;
        for row in 0..per_line {
            let a = mesh_left.normals[row * per_line + (per_line - 1)];
            let b = mesh_right.normals[row * per_line];
            assert!(
                (a - b).length() < 1e-6,
                "seam normals differ at row {}: {:?} vs {:?}",
                row,
                a,
                b
            );
        }
    }
}
