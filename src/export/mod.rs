//! Export module for saving generated grids to files.
//!
//! Supports 16-bit PNG for inspection and universal compatibility, and
//! RAW formats for game engine heightmap import.

mod png;
mod raw;

pub use png::{export_grid_png, PngExportError, PngExportOptions};
pub use raw::{export_grid_raw, RawExportError, RawFormat};
