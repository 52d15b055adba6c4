//! Standalone WKT CSV -> GeoJSON conversion, keeping the table's own columns as properties.

use std::{fmt, path::{Path, PathBuf}};

use anyhow::Result;
use log::info;
use polars::frame::DataFrame;
use serde_json::{Map, Value};

use crate::{
    common::{report_progress, RowErrors},
    geom::{parse_wkt, Crs, Reprojector, SJTSK_KROVAK_EN, WGS84},
    io::{csv::{column_names, json_column, read_csv, read_csv_head, require_column, string_column}, fs::derive_output_path, geojson::{feature, feature_collection, first_coordinate, geometry_to_geojson, write_geojson}},
    merge::source_crs,
};

/// Columns kept by a simplified conversion when none are given.
pub const DEFAULT_SIMPLE_COLUMNS: [&str; 5] = ["nazov_zsj", "nazov_okre", "kod_zsj", "nazov_co", "nazov_utj"];

/// Rows shown by [`preview`].
pub const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub geometry_column: String,
    pub source_epsg: u32,
    /// Explicit PROJ.4 definition of the source CRS, overriding the registry.
    pub source_proj4: Option<String>,
    pub target_epsg: u32,
    /// Keep only these columns as properties (missing ones are ignored).
    /// `None` keeps every column.
    pub keep_columns: Option<Vec<String>>,
    pub progress_every: usize,
    pub max_logged_errors: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            geometry_column: "geom".into(),
            source_epsg: SJTSK_KROVAK_EN,
            source_proj4: None,
            target_epsg: WGS84,
            keep_columns: None,
            progress_every: 100,
            max_logged_errors: 5,
        }
    }
}

impl ConvertOptions {
    /// Simplified conversion keeping `columns`, or [`DEFAULT_SIMPLE_COLUMNS`].
    pub fn simple(columns: Option<Vec<String>>) -> Self {
        let columns = columns.unwrap_or_else(|| DEFAULT_SIMPLE_COLUMNS.iter().map(|c| c.to_string()).collect());
        Self { keep_columns: Some(columns), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertSummary {
    pub total_rows: usize,
    pub features: usize,
    /// Missing geometry and failed conversions together.
    pub errors: usize,
    pub property_columns: Vec<String>,
    pub first_coordinate: Option<(f64, f64)>,
    pub output_path: Option<PathBuf>,
    pub output_bytes: u64,
}

impl fmt::Display for ConvertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[convert] rows read:        {}", self.total_rows)?;
        writeln!(f, "[convert] features written: {}", self.features)?;
        writeln!(f, "[convert] errors:           {}", self.errors)?;
        writeln!(f, "[convert] properties:       {}", self.property_columns.join(", "))?;
        if let Some((lon, lat)) = self.first_coordinate {
            writeln!(f, "[convert] first coordinate: {lon:.6}, {lat:.6}")?;
        }
        match &self.output_path {
            Some(path) => write!(f, "[convert] output:           {} ({:.2} MB)", path.display(), self.output_bytes as f64 / 1024.0 / 1024.0),
            None => write!(f, "[convert] output:           (not written)"),
        }
    }
}

/// Convert a table with a WKT column into a FeatureCollection.
pub fn convert_frame(df: &DataFrame, options: &ConvertOptions) -> Result<(Value, ConvertSummary)> {
    require_column(df, "input", &options.geometry_column)?;

    let property_columns: Vec<String> = match &options.keep_columns {
        Some(keep) => keep.iter()
            .filter(|c| **c != options.geometry_column && df.column(c).is_ok())
            .cloned()
            .collect(),
        None => column_names(df).into_iter()
            .filter(|c| *c != options.geometry_column)
            .collect(),
    };
    let values = property_columns.iter()
        .map(|name| json_column(df, name))
        .collect::<Result<Vec<_>>>()?;
    let wkts = string_column(df, &options.geometry_column)?;

    let target = Crs::from_epsg(options.target_epsg)?;
    let reprojector = Reprojector::new(source_crs(options.source_epsg, options.source_proj4.as_deref())?, target.clone())?;
    info!("[convert] reprojecting EPSG:{} -> EPSG:{}", options.source_epsg, options.target_epsg);

    let mut features = Vec::with_capacity(wkts.len());
    let mut errors = RowErrors::new("convert", options.max_logged_errors);
    let mut first = None;

    for (index, wkt) in wkts.iter().enumerate() {
        let built = wkt.as_deref()
            .ok_or_else(|| anyhow::anyhow!("missing geometry"))
            .and_then(parse_wkt)
            .and_then(|geometry| reprojector.transform_geometry(&geometry))
            .and_then(|geometry| geometry_to_geojson(&geometry));

        match built {
            Ok(geometry) => {
                if first.is_none() { first = first_coordinate(&geometry) }
                let properties: Map<String, Value> = property_columns.iter()
                    .zip(&values)
                    .map(|(name, column)| (name.clone(), column[index].clone()))
                    .collect();
                features.push(feature(geometry, properties));
            }
            Err(error) => errors.record(index, &error),
        }

        report_progress("convert", index, wkts.len(), options.progress_every);
    }

    let summary = ConvertSummary {
        total_rows: wkts.len(),
        features: features.len(),
        errors: errors.count(),
        property_columns,
        first_coordinate: first,
        ..Default::default()
    };
    info!("[convert] built {} features", summary.features);

    Ok((feature_collection(features, &target), summary))
}

/// Read `input`, convert it, and write the GeoJSON document.
pub fn convert(input: &Path, output: Option<&Path>, options: &ConvertOptions) -> Result<ConvertSummary> {
    info!("[convert] reading {}", input.display());
    let df = read_csv(input)?;
    info!("[convert] read {} rows", df.height());

    let (document, mut summary) = convert_frame(&df, options)?;

    let output = output.map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(input, ".geojson"));
    info!("[convert] writing {}", output.display());
    summary.output_bytes = write_geojson(&document, &output)?;
    summary.output_path = Some(output);

    Ok(summary)
}

/// First [`PREVIEW_ROWS`] rows of `input` without the geometry column.
pub fn preview(input: &Path, geometry_column: &str) -> Result<DataFrame> {
    let df = read_csv_head(input, PREVIEW_ROWS)?;
    if df.column(geometry_column).is_ok() {
        return Ok(df.drop(geometry_column)?);
    }
    Ok(df)
}
