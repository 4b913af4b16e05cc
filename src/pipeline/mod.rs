//! Generation pipeline: noise to height grid to mesh.
//!
//! [`TerrainGenerator`] owns the configuration for one chunk-producing
//! pipeline and exposes explicit recompute calls; nothing recomputes
//! behind the caller's back. Background scheduling lives in
//! [`scheduler`].

mod scheduler;

pub use scheduler::{CompletedJob, JobError, JobId, JobQueue, TerrainScheduler};

use crate::mesh::{LevelOfDetail, MeshBuffers, MeshBuilder, MeshError, NormalStrategy};
use crate::noise::{generate_height_grid, NoiseConfig};
use crate::terrain::{FalloffMask, HeightGrid, TerrainConfig};
use std::sync::Arc;

/// Grid side length of a terrain chunk before padding.
pub const DEFAULT_CHUNK_SIZE: u32 = 241;

/// One generated height field plus the scalars the material collaborator
/// needs to rescale its height-to-color ramp.
#[derive(Debug, Clone)]
pub struct MapData {
    /// Normalized, falloff-adjusted height grid (padded).
    pub height_grid: HeightGrid,
    /// Lowest world-space height the current terrain config can produce.
    pub min_height: f32,
    /// Highest world-space height the current terrain config can produce.
    pub max_height: f32,
}

/// Produces height grids and meshes for terrain chunks.
///
/// The generator is pure given its configuration: repeated calls with the
/// same state produce identical results. The falloff mask is the only
/// memoized piece, keyed by grid size and rebuilt if the size changes.
#[derive(Clone)]
pub struct TerrainGenerator {
    noise: NoiseConfig,
    terrain: TerrainConfig,
    chunk_size: u32,
    builder: MeshBuilder,
    falloff: Option<FalloffMask>,
}

impl TerrainGenerator {
    /// Creates a generator with the default face-averaging mesh builder.
    pub fn new(noise: NoiseConfig, terrain: TerrainConfig, chunk_size: u32) -> Self {
        Self {
            noise,
            terrain,
            chunk_size,
            builder: MeshBuilder::new(),
            falloff: None,
        }
    }

    /// Creates a generator with an explicit normal strategy.
    pub fn with_strategy(
        noise: NoiseConfig,
        terrain: TerrainConfig,
        chunk_size: u32,
        strategy: Arc<dyn NormalStrategy>,
    ) -> Self {
        Self {
            builder: MeshBuilder::with_strategy(strategy),
            ..Self::new(noise, terrain, chunk_size)
        }
    }

    /// Side length of the padded grid this generator produces.
    pub fn grid_size(&self) -> u32 {
        // One extra cell on each side feeds border vertex construction.
        self.chunk_size + 2
    }

    /// The noise configuration.
    pub fn noise_config(&self) -> &NoiseConfig {
        &self.noise
    }

    /// The terrain configuration.
    pub fn terrain_config(&self) -> &TerrainConfig {
        &self.terrain
    }

    /// Replaces the noise configuration for subsequent recomputes.
    pub fn set_noise_config(&mut self, noise: NoiseConfig) {
        self.noise = noise;
    }

    /// Replaces the terrain configuration for subsequent recomputes.
    pub fn set_terrain_config(&mut self, terrain: TerrainConfig) {
        self.terrain = terrain;
    }

    /// Generates the height grid for one chunk.
    ///
    /// Runs noise synthesis, then subtracts the falloff mask and clamps
    /// each cell to `[0, 1]` when the terrain config asks for island
    /// shaping. The returned `MapData` carries the height-range scalars
    /// for the material collaborator.
    pub fn generate_map_data(&mut self) -> MapData {
        let size = self.grid_size();
        let mut grid = generate_height_grid(size, size, &self.noise);

        if self.terrain.use_falloff {
            let mask = self
                .falloff
                .get_or_insert_with(|| FalloffMask::generate(size));
            if mask.size() != size {
                *mask = FalloffMask::generate(size);
            }

            for (cell, &attenuation) in
                grid.values_mut().iter_mut().zip(mask.as_grid().values())
            {
                *cell = (*cell - attenuation).clamp(0.0, 1.0);
            }
        }

        MapData {
            height_grid: grid,
            min_height: self.terrain.min_height(),
            max_height: self.terrain.max_height(),
        }
    }

    /// Builds the mesh for previously generated map data at the given
    /// level of detail.
    pub fn generate_mesh(
        &self,
        map_data: &MapData,
        lod: LevelOfDetail,
    ) -> Result<MeshBuffers, MeshError> {
        self.builder.build(
            &map_data.height_grid,
            self.terrain.height_multiplier,
            &self.terrain.height_curve,
            lod,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightCurve;
    use glam::Vec2;

    fn small_generator(use_falloff: bool) -> TerrainGenerator {
        let terrain = TerrainConfig {
            use_falloff,
            ..Default::default()
        };
        TerrainGenerator::new(NoiseConfig::with_seed(42), terrain, 31)
    }

    #[test]
    fn test_map_data_is_padded_and_normalized() {
        let mut generator = small_generator(false);
        let map = generator.generate_map_data();

        assert_eq!(map.height_grid.width(), 33);
        assert_eq!(map.height_grid.height(), 33);
        for &v in map.height_grid.values() {
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_falloff_subtraction_clamps() {
        let mut plain = small_generator(false);
        let mut island = small_generator(true);

        let open = plain.generate_map_data();
        let carved = island.generate_map_data();

        for &v in carved.height_grid.values() {
            assert!((0.0..=1.0).contains(&v));
        }

        // Edge cells are attenuated toward zero; the grids differ.
        let size = carved.height_grid.width();
        assert!(carved.height_grid.get(0, size / 2) < 0.1);
        assert_ne!(open.height_grid, carved.height_grid);
    }

    #[test]
    fn test_falloff_mask_is_memoized() {
        let mut generator = small_generator(true);
        generator.generate_map_data();
        assert!(generator.falloff.is_some());

        let cached = generator.falloff.clone();
        generator.generate_map_data();
        assert_eq!(generator.falloff, cached);
    }

    #[test]
    fn test_height_scalars_follow_terrain_config() {
        let terrain = TerrainConfig {
            height_multiplier: 12.0,
            uniform_scale: 2.0,
            height_curve: HeightCurve::identity(),
            use_falloff: false,
        };
        let mut generator = TerrainGenerator::new(NoiseConfig::default(), terrain, 15);
        let map = generator.generate_map_data();

        assert_eq!(map.min_height, 0.0);
        assert_eq!(map.max_height, 24.0);
    }

    #[test]
    fn test_generate_mesh_from_map_data() {
        let mut generator = small_generator(false);
        let map = generator.generate_map_data();
        let mesh = generator.generate_mesh(&map, LevelOfDetail::FULL).unwrap();

        // 33-cell padded grid: 31 vertices per line.
        assert_eq!(mesh.vertices_per_line(), 31);
        assert_eq!(mesh.vertex_count(), 31 * 31);
    }

    #[test]
    fn test_end_to_end_reference_chunk() {
        // 245x245 padded grid at LOD 0 with the reference noise settings:
        // 243^2 interior vertices and 2 * 242^2 interior triangles.
        let noise = NoiseConfig {
            seed: 42,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
        };
        let terrain = TerrainConfig {
            height_multiplier: 20.0,
            ..Default::default()
        };

        let mut generator = TerrainGenerator::new(noise.clone(), terrain.clone(), 243);
        let map = generator.generate_map_data();
        let mesh = generator.generate_mesh(&map, LevelOfDetail::FULL).unwrap();

        assert_eq!(mesh.vertex_count(), 243 * 243);
        assert_eq!(mesh.triangle_count(), 2 * 242 * 242);

        // A different seed changes heights but not topology.
        let mut reseeded =
            TerrainGenerator::new(NoiseConfig { seed: 43, ..noise }, terrain, 243);
        let other_map = reseeded.generate_map_data();
        let other_mesh = reseeded
            .generate_mesh(&other_map, LevelOfDetail::FULL)
            .unwrap();

        assert_eq!(mesh.triangles, other_mesh.triangles);
        assert_eq!(mesh.uvs, other_mesh.uvs);
        assert!(
            mesh.vertices
                .iter()
                .zip(other_mesh.vertices.iter())
                .any(|(a, b)| a.y != b.y),
            "reseeding should move at least one vertex height"
        );
    }
}
