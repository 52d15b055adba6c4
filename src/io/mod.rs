//! IO module for format-specific reading and writing operations.
//!
//! # Format Modules
//!
//! - `csv` - delimited input tables (geometry and population)
//! - `geojson` - FeatureCollection output and read-back for validation
//! - `fs` - atomic file writes and output path defaults

pub(crate) mod csv;
pub(crate) mod fs;
pub(crate) mod geojson;
