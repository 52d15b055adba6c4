//! Coordinate range check for a written FeatureCollection.

use std::{fmt, path::Path};

use anyhow::Result;
use serde_json::Value;

use crate::io::geojson::read_feature_collection;

/// A feature with at least one coordinate outside lon [-180, 180] / lat [-90, 90].
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidFeature {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub total: usize,
    pub with_geometry: usize,
    pub invalid: Vec<InvalidFeature>,
    /// (min, max) over all coordinates, when every coordinate is valid.
    pub lon_range: Option<(f64, f64)>,
    pub lat_range: Option<(f64, f64)>,
}

impl ValidationReport {
    #[inline] pub fn is_valid(&self) -> bool { self.invalid.is_empty() }

    #[inline] pub fn without_geometry(&self) -> usize { self.total - self.with_geometry }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[validate] total features:       {}", self.total)?;
        writeln!(f, "[validate] with coordinates:     {}", self.with_geometry)?;
        writeln!(f, "[validate] without coordinates:  {}", self.without_geometry())?;
        write!(f, "[validate] invalid coordinates:  {}", self.invalid.len())?;
        for item in &self.invalid {
            write!(f, "\n[validate]   {}: lat={:.4}, lon={:.4}", item.name, item.lat, item.lon)?;
        }
        if let (Some((lon_min, lon_max)), Some((lat_min, lat_max))) = (self.lon_range, self.lat_range) {
            write!(f, "\n[validate] latitude range:       {lat_min:.4} to {lat_max:.4}")?;
            write!(f, "\n[validate] longitude range:      {lon_min:.4} to {lon_max:.4}")?;
        }
        Ok(())
    }
}

/// Every x/y pair of a GeoJSON geometry, including nested collections.
fn collect_coordinates(geometry: &Value, out: &mut Vec<(f64, f64)>) {
    if let Some(geometries) = geometry["geometries"].as_array() {
        for inner in geometries { collect_coordinates(inner, out) }
        return;
    }

    fn walk(value: &Value, out: &mut Vec<(f64, f64)>) {
        let Some(items) = value.as_array() else { return };
        match (items.first().and_then(Value::as_f64), items.get(1).and_then(Value::as_f64)) {
            (Some(x), Some(y)) => out.push((x, y)),
            _ => for item in items { walk(item, out) },
        }
    }
    walk(&geometry["coordinates"], out);
}

fn extend_range(range: &mut Option<(f64, f64)>, v: f64) {
    *range = Some(match *range {
        Some((lo, hi)) => (lo.min(v), hi.max(v)),
        None => (v, v),
    });
}

/// Check every coordinate of every feature in a FeatureCollection value.
pub fn validate_collection(collection: &Value) -> ValidationReport {
    let features = collection["features"].as_array().map(Vec::as_slice).unwrap_or_default();
    let mut report = ValidationReport { total: features.len(), ..Default::default() };
    let mut lon_range = None;
    let mut lat_range = None;

    for feature in features {
        let geometry = &feature["geometry"];
        if geometry.is_null() { continue }
        report.with_geometry += 1;

        let mut coords = Vec::new();
        collect_coordinates(geometry, &mut coords);

        if let Some(&(lon, lat)) = coords.iter()
            .find(|(lon, lat)| !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat))
        {
            let name = feature["properties"]["zsj_nazov"].as_str().unwrap_or("Unknown").to_string();
            report.invalid.push(InvalidFeature { name, lon, lat });
        }

        for (lon, lat) in coords {
            extend_range(&mut lon_range, lon);
            extend_range(&mut lat_range, lat);
        }
    }

    if report.is_valid() {
        report.lon_range = lon_range;
        report.lat_range = lat_range;
    }
    report
}

/// Read a GeoJSON file and validate its coordinates.
pub fn validate_file(path: &Path) -> Result<ValidationReport> {
    log::info!("[validate] checking {}", path.display());
    Ok(validate_collection(&read_feature_collection(path)?))
}
