//! GeoJSON reading operations.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{ensure, Context, Result};
use serde_json::Value;

/// Read a GeoJSON FeatureCollection document from `path`.
pub(crate) fn read_feature_collection(path: &Path) -> Result<Value> {
    let file = File::open(path)
        .with_context(|| format!("[io::geojson::read] Failed to open GeoJSON file: {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("[io::geojson::read] Failed to parse GeoJSON from {:?}", path))?;

    ensure!(value["type"].as_str() == Some("FeatureCollection"),
        "[io::geojson::read] {} is not a FeatureCollection", path.display());
    ensure!(value["features"].is_array(),
        "[io::geojson::read] {} has no features array", path.display());

    Ok(value)
}
