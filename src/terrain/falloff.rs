//! Falloff mask generation for island-style terrain.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::height_grid::HeightGrid;

/// Curve steepness. Higher values sharpen the transition band.
const CURVE_STEEPNESS: f32 = 3.0;
/// Curve offset. Higher values push the transition toward the edges.
const CURVE_OFFSET: f32 = 2.2;

/// A precomputed square attenuation grid used to carve island shapes.
///
/// Values lie in `[0, 1]`: ~0 near the center, ~1 near the edges. The
/// pipeline subtracts the mask from a normalized height grid and clamps
/// the result, pulling terrain down toward the map boundary.
///
/// Generation is deterministic given the size, so a mask is safe to
/// compute once and reuse for every chunk of that size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FalloffMask {
    grid: HeightGrid,
}

impl FalloffMask {
    /// Generates a falloff mask of the given square size.
    ///
    /// Cell centers are mapped to `[-1, 1]` symmetrically, so the mask is
    /// invariant under 180-degree rotation and both axis reflections.
    pub fn generate(size: u32) -> Self {
        let mut grid = HeightGrid::new(size, size);
        let side = size as usize;

        // Integer numerators negate exactly under mirroring, which keeps the
        // mask bitwise symmetric.
        grid.values_mut()
            .par_chunks_mut(side)
            .enumerate()
            .for_each(|(j, row)| {
                let y = (2 * j as i64 + 1 - side as i64) as f32 / side as f32;
                for (i, cell) in row.iter_mut().enumerate() {
                    let x = (2 * i as i64 + 1 - side as i64) as f32 / side as f32;
                    let value = x.abs().max(y.abs());
                    *cell = falloff_curve(value);
                }
            });

        Self { grid }
    }

    /// Returns the mask side length in cells.
    pub fn size(&self) -> u32 {
        self.grid.width()
    }

    /// Returns the mask value at the given cell coordinate.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.grid.get(x, y)
    }

    /// Returns the underlying grid, e.g. for export or display.
    pub fn as_grid(&self) -> &HeightGrid {
        &self.grid
    }
}

/// Smooth-step-like remap of an edge distance in [0, 1].
fn falloff_curve(value: f32) -> f32 {
    let a = CURVE_STEEPNESS;
    let b = CURVE_OFFSET;
    value.powf(a) / (value.powf(a) + (b - b * value).powf(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_unit_range() {
        let mask = FalloffMask::generate(33);
        for &v in mask.as_grid().values() {
            assert!((0.0..=1.0).contains(&v), "mask value {} out of range", v);
        }
    }

    #[test]
    fn test_center_low_edges_high() {
        let mask = FalloffMask::generate(64);
        let center = mask.get(32, 32);
        let corner = mask.get(0, 0);
        assert!(center < 0.05, "center should be near 0, got {}", center);
        assert!(corner > 0.9, "corner should be near 1, got {}", corner);
    }

    #[test]
    fn test_symmetry() {
        // Both parities: an odd size has an exact center cell, an even one
        // does not.
        for size in [16u32, 17] {
            let mask = FalloffMask::generate(size);
            for y in 0..size {
                for x in 0..size {
                    let v = mask.get(x, y);
                    let rot = mask.get(size - 1 - x, size - 1 - y);
                    let flip_x = mask.get(size - 1 - x, y);
                    let flip_y = mask.get(x, size - 1 - y);
                    assert_eq!(v, rot, "180-degree rotation broken at ({}, {})", x, y);
                    assert_eq!(v, flip_x, "x reflection broken at ({}, {})", x, y);
                    assert_eq!(v, flip_y, "y reflection broken at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = FalloffMask::generate(32);
        let b = FalloffMask::generate(32);
        assert_eq!(a, b);
    }

    #[test]
    fn test_monotonic_along_axis() {
        // Walking from the center toward an edge must never decrease.
        let mask = FalloffMask::generate(65);
        let mut previous = mask.get(32, 32);
        for x in 33..65 {
            let v = mask.get(x, 32);
            assert!(v >= previous, "falloff decreased at x={}", x);
            previous = v;
        }
    }
}
