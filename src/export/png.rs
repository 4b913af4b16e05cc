//! PNG export for height grids.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageBuffer, ImageEncoder, Luma};
use thiserror::Error;

use crate::terrain::HeightGrid;

/// Errors that can occur during PNG export.
#[derive(Error, Debug)]
pub enum PngExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidValueRange(f32, f32),
}

/// Options for PNG export.
#[derive(Debug, Clone)]
pub struct PngExportOptions {
    /// Minimum grid value for normalization.
    pub min_value: f32,
    /// Maximum grid value for normalization.
    pub max_value: f32,
    /// PNG compression type.
    pub compression: CompressionType,
    /// PNG filter type.
    pub filter: FilterType,
}

impl Default for PngExportOptions {
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: 1.0,
            compression: CompressionType::Default,
            filter: FilterType::Adaptive,
        }
    }
}

impl PngExportOptions {
    /// Creates options with the value range observed in the grid.
    pub fn auto_range(grid: &HeightGrid) -> Self {
        let (min, max) = grid.value_range();
        Self {
            min_value: min,
            max_value: max,
            ..Default::default()
        }
    }
}

/// Exports a height grid as a 16-bit grayscale PNG.
///
/// Values are normalized from `[min_value, max_value]` and clamped; a
/// normalized height grid exports faithfully with the default unit
/// range, and a falloff mask exports through its underlying grid the
/// same way.
pub fn export_grid_png(
    grid: &HeightGrid,
    path: &Path,
    options: &PngExportOptions,
) -> Result<(), PngExportError> {
    let min = options.min_value;
    let max = options.max_value;

    if min >= max {
        return Err(PngExportError::InvalidValueRange(min, max));
    }

    let range = max - min;
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::new(grid.width(), grid.height());

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let normalized = ((grid.get(x, y) - min) / range).clamp(0.0, 1.0);
            let value = (normalized * 65535.0) as u16;
            img.put_pixel(x, y, Luma([value]));
        }
    }

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let encoder = PngEncoder::new_with_quality(writer, options.compression, options.filter);

    // The encoder wants bytes, not u16 texels.
    let byte_slice: &[u8] = bytemuck::cast_slice(img.as_raw());

    encoder.write_image(
        byte_slice,
        grid.width(),
        grid.height(),
        image::ExtendedColorType::L16,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::{generate_height_grid, NoiseConfig};
    use crate::terrain::FalloffMask;
    use tempfile::tempdir;

    #[test]
    fn test_export_height_grid_png() {
        let grid = generate_height_grid(32, 32, &NoiseConfig::with_seed(8));
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunk.png");

        export_grid_png(&grid, &path, &PngExportOptions::default()).unwrap();

        assert!(path.exists());
        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_export_falloff_png() {
        let mask = FalloffMask::generate(24);
        let dir = tempdir().unwrap();
        let path = dir.path().join("falloff.png");

        export_grid_png(mask.as_grid(), &path, &PngExportOptions::default()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_value_range() {
        let grid = HeightGrid::new(8, 8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.png");

        let options = PngExportOptions {
            min_value: 1.0,
            max_value: -1.0,
            ..Default::default()
        };

        let result = export_grid_png(&grid, &path, &options);
        assert!(matches!(result, Err(PngExportError::InvalidValueRange(..))));
    }

    #[test]
    fn test_auto_range() {
        let mut grid = HeightGrid::new(8, 8);
        grid.set(0, 0, -0.5);
        grid.set(7, 7, 0.75);

        let options = PngExportOptions::auto_range(&grid);
        assert_eq!(options.min_value, -0.5);
        assert_eq!(options.max_value, 0.75);
    }
}
