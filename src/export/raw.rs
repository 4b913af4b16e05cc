//! RAW format export for game engine heightmap import.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::terrain::HeightGrid;

/// Errors that can occur during RAW export.
#[derive(Error, Debug)]
pub enum RawExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid value range: min ({0}) >= max ({1})")]
    InvalidValueRange(f32, f32),
}

/// RAW export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawFormat {
    /// 16-bit unsigned integer, little-endian (engine heightmap default).
    #[default]
    R16LittleEndian,
    /// 16-bit unsigned integer, big-endian.
    R16BigEndian,
    /// 32-bit float, little-endian (raw grid values, no normalization).
    R32Float,
}

/// Exports a height grid as a RAW dump in row-major order.
///
/// The 16-bit formats normalize values from `[min_value, max_value]` and
/// clamp; the float format writes grid values verbatim.
pub fn export_grid_raw(
    grid: &HeightGrid,
    path: &Path,
    format: RawFormat,
    min_value: f32,
    max_value: f32,
) -> Result<(), RawExportError> {
    if format != RawFormat::R32Float && min_value >= max_value {
        return Err(RawExportError::InvalidValueRange(min_value, max_value));
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let range = max_value - min_value;

    match format {
        RawFormat::R16LittleEndian => {
            for &value in grid.values() {
                let normalized = ((value - min_value) / range).clamp(0.0, 1.0);
                writer.write_all(&((normalized * 65535.0) as u16).to_le_bytes())?;
            }
        }
        RawFormat::R16BigEndian => {
            for &value in grid.values() {
                let normalized = ((value - min_value) / range).clamp(0.0, 1.0);
                writer.write_all(&((normalized * 65535.0) as u16).to_be_bytes())?;
            }
        }
        RawFormat::R32Float => {
            for &value in grid.values() {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn gradient_grid(size: u32) -> HeightGrid {
        let mut grid = HeightGrid::new(size, size);
        for y in 0..size {
            for x in 0..size {
                grid.set(x, y, (x + y) as f32 / (2 * (size - 1)) as f32);
            }
        }
        grid
    }

    #[test]
    fn test_export_r16_size() {
        let grid = gradient_grid(16);
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunk.raw");

        export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, 0.0, 1.0).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), 16 * 16 * 2);
    }

    #[test]
    fn test_export_r32_roundtrip() {
        let grid = gradient_grid(8);
        let dir = tempdir().unwrap();
        let path = dir.path().join("chunk.r32");

        export_grid_raw(&grid, &path, RawFormat::R32Float, 0.0, 1.0).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 8 * 8 * 4);

        let first = f32::from_le_bytes(bytes[0..4].try_into().unwrap());
        assert_eq!(first, grid.get(0, 0));
    }

    #[test]
    fn test_invalid_range_rejected_for_r16() {
        let grid = gradient_grid(4);
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.raw");

        let result = export_grid_raw(&grid, &path, RawFormat::R16LittleEndian, 1.0, 1.0);
        assert!(matches!(result, Err(RawExportError::InvalidValueRange(..))));
    }
}
