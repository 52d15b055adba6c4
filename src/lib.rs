#![doc = "zsjgeo public API"]
mod common;
mod convert;
mod error;
mod geom;
mod io;
mod merge;
mod types;
mod validate;

#[doc(inline)]
pub use error::{KeySamples, PipelineError};

#[doc(inline)]
pub use geom::{parse_wkt, proj4_for_epsg, Crs, Reprojector, SJTSK_KROVAK_EN, WGS84};

#[doc(inline)]
pub use types::{
    normalize_code, GeometryRecord, KeyRule, PopulationIndex, PopulationRecord, ResidentCounts, ShortKey,
    DEFAULT_KEY_WIDTH, ID_COLUMN_CANDIDATES, POPULATION_CODE_COLUMN,
};

#[doc(inline)]
pub use merge::{left_join, merge, merge_tables, JoinStats, JoinedRow, MergeOptions, MergeOutput, MergeSummary, ZsjProperties, MERGE_OUTPUT_SUFFIX};

#[doc(inline)]
pub use convert::{convert, convert_frame, preview, ConvertOptions, ConvertSummary, DEFAULT_SIMPLE_COLUMNS, PREVIEW_ROWS};

#[doc(inline)]
pub use validate::{validate_collection, validate_file, InvalidFeature, ValidationReport};

/// Read a CSV with every column kept as text, as [`merge_tables`] expects.
pub fn read_table(path: &std::path::Path) -> anyhow::Result<polars::frame::DataFrame> {
    io::csv::read_csv_as_strings(path)
}
