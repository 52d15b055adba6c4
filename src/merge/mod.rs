//! Geometry + census merge: load, key, join, reproject, build, write.

mod feature;
mod join;

use std::{fmt, path::{Path, PathBuf}};

use anyhow::Result;
use log::info;
use polars::frame::DataFrame;
use serde_json::Value;

use crate::{
    common::{report_progress, RowErrors},
    geom::{parse_wkt, Crs, Reprojector, SJTSK_KROVAK_EN, WGS84},
    io::{fs::derive_output_path, geojson::{feature, feature_collection, first_coordinate, geometry_to_geojson, write_geojson}},
    types::{geometry_records, identifier_column, KeyRule, PopulationIndex, DEFAULT_KEY_WIDTH},
};

pub use feature::ZsjProperties;
pub use join::{left_join, JoinStats, JoinedRow};

/// Suffix replacing `.csv` in the default output path.
pub const MERGE_OUTPUT_SUFFIX: &str = "_with_population.geojson";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Column holding WKT geometry.
    pub geometry_column: String,
    /// Identifier column; auto-detected when `None`.
    pub id_column: Option<String>,
    /// Number of trailing identifier characters forming the join key.
    pub key_width: usize,
    pub source_epsg: u32,
    /// Explicit PROJ.4 definition of the source CRS, overriding the registry.
    pub source_proj4: Option<String>,
    pub target_epsg: u32,
    /// Log progress every this many rows; 0 disables.
    pub progress_every: usize,
    /// Row errors logged before only counting.
    pub max_logged_errors: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            geometry_column: "geom".into(),
            id_column: None,
            key_width: DEFAULT_KEY_WIDTH,
            source_epsg: SJTSK_KROVAK_EN,
            source_proj4: None,
            target_epsg: WGS84,
            progress_every: 100,
            max_logged_errors: 3,
        }
    }
}

impl MergeOptions {
    pub(crate) fn source_crs(&self) -> Result<Crs> {
        source_crs(self.source_epsg, self.source_proj4.as_deref())
    }
}

/// Source CRS from an explicit PROJ.4 string or the built-in registry.
pub(crate) fn source_crs(epsg: u32, proj4: Option<&str>) -> Result<Crs> {
    match proj4 {
        Some(proj4) => Ok(Crs::from_proj4(epsg, proj4)),
        None => Crs::from_epsg(epsg),
    }
}

/// Counts reported at the end of a merge run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSummary {
    pub total_rows: usize,
    /// Rows whose key found a census record.
    pub found_keys: usize,
    /// Rows whose census record carries a total population.
    pub matched: usize,
    pub malformed_keys: usize,
    pub duplicate_keys: usize,
    pub duplicate_population_codes: usize,
    pub skipped_no_geometry: usize,
    pub skipped_on_error: usize,
    pub features: usize,
    /// Sum of `pop_total` over written features, saturating at `i64::MAX`.
    pub total_population: i64,
    pub first_coordinate: Option<(f64, f64)>,
    pub first_properties: Option<ZsjProperties>,
    pub output_path: Option<PathBuf>,
    pub output_bytes: u64,
}

impl MergeSummary {
    pub fn average_population(&self) -> i64 {
        if self.features == 0 { 0 } else { self.total_population / self.features as i64 }
    }
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[merge] rows read:            {}", self.total_rows)?;
        writeln!(f, "[merge] rows matched:         {} / {}", self.matched, self.total_rows)?;
        if self.found_keys != self.matched {
            writeln!(f, "[merge] keys found, no total: {}", self.found_keys - self.matched)?;
        }
        if self.malformed_keys > 0 {
            writeln!(f, "[merge] malformed keys:       {}", self.malformed_keys)?;
        }
        if self.duplicate_keys > 0 {
            writeln!(f, "[merge] duplicate keys:       {}", self.duplicate_keys)?;
        }
        if self.duplicate_population_codes > 0 {
            writeln!(f, "[merge] duplicate ZSJ codes:  {}", self.duplicate_population_codes)?;
        }
        writeln!(f, "[merge] features written:     {}", self.features)?;
        writeln!(f, "[merge] skipped, no geometry: {}", self.skipped_no_geometry)?;
        writeln!(f, "[merge] skipped, errors:      {}", self.skipped_on_error)?;
        if let Some((lon, lat)) = self.first_coordinate {
            writeln!(f, "[merge] first coordinate:     {lon:.6}, {lat:.6}")?;
        }
        if let Some(sample) = &self.first_properties {
            writeln!(f, "[merge] first ZSJ:            {} ({}), population {} = {} + {} + {}",
                sample.zsj_nazov.as_deref().unwrap_or("-"),
                sample.okres_nazov.as_deref().unwrap_or("-"),
                sample.pop_total, sample.pop_trvaly_pobyt, sample.pop_inde_sr, sample.pop_zahranicie)?;
        }
        if let Some(path) = &self.output_path {
            writeln!(f, "[merge] output:               {} ({:.2} MB)", path.display(), self.output_bytes as f64 / 1024.0 / 1024.0)?;
        }
        writeln!(f, "[merge] total population:     {}", self.total_population)?;
        write!(f, "[merge] average per ZSJ:      {}", self.average_population())
    }
}

/// A merged FeatureCollection and its summary, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub document: Value,
    pub summary: MergeSummary,
}

/// Join geometry rows to census rows and build the FeatureCollection.
///
/// Both tables must have been read with every column as text, see [`crate::read_table`].
/// Row-level geometry failures are counted and skipped; a join with no
/// matches is fatal.
pub fn merge_tables(geometry: &DataFrame, population: &DataFrame, options: &MergeOptions) -> Result<MergeOutput> {
    let id_column = identifier_column(geometry, options.id_column.as_deref())?;
    let records = geometry_records(geometry, &id_column, &options.geometry_column)?;
    let census = PopulationIndex::from_frame(population)?;
    info!("[merge] joining on {} (geometry) and ZSJ code (census), {} + {} rows",
        id_column, records.len(), census.len());

    let rule = KeyRule::new(options.key_width)?;
    let (rows, stats) = left_join(&records, &census, &rule)?;
    info!("[merge] matched {} / {} geometries", stats.matched, stats.total);

    let target = Crs::from_epsg(options.target_epsg)?;
    let reprojector = Reprojector::new(options.source_crs()?, target.clone())?;
    info!("[merge] reprojecting EPSG:{} -> EPSG:{}", options.source_epsg, options.target_epsg);

    let mut features = Vec::with_capacity(rows.len());
    let mut errors = RowErrors::new("merge", options.max_logged_errors);
    let mut summary = MergeSummary {
        total_rows: stats.total,
        found_keys: stats.found,
        matched: stats.matched,
        malformed_keys: stats.malformed_keys,
        duplicate_keys: stats.duplicate_keys,
        duplicate_population_codes: census.duplicates(),
        ..Default::default()
    };

    for (index, row) in rows.iter().enumerate() {
        match row.geometry.wkt.as_deref() {
            None => summary.skipped_no_geometry += 1,
            Some(wkt) => match build_feature(wkt, row, &reprojector) {
                Ok((geometry, properties)) => {
                    if summary.first_coordinate.is_none() {
                        summary.first_coordinate = first_coordinate(&geometry);
                        summary.first_properties = Some(properties.clone());
                    }
                    summary.total_population = summary.total_population.saturating_add(properties.pop_total);
                    features.push(feature(geometry, properties.to_json()?));
                }
                Err(error) => errors.record(index, &error),
            },
        }

        report_progress("merge", index, rows.len(), options.progress_every);
    }

    summary.skipped_on_error = errors.count();
    summary.features = features.len();
    info!("[merge] built {} features", summary.features);

    Ok(MergeOutput { document: feature_collection(features, &target), summary })
}

/// Parse, reproject and convert one row's geometry, and collect its properties.
fn build_feature(wkt: &str, row: &JoinedRow<'_>, reprojector: &Reprojector) -> Result<(Value, ZsjProperties)> {
    let geometry = reprojector.transform_geometry(&parse_wkt(wkt)?)?;
    Ok((geometry_to_geojson(&geometry)?, ZsjProperties::from_row(row)))
}

/// Read both CSV files, merge them, and write the GeoJSON document.
/// Nothing is written when the run aborts.
pub fn merge(geometry_csv: &Path, population_csv: &Path, output: Option<&Path>, options: &MergeOptions) -> Result<MergeSummary> {
    info!("[merge] reading geometries from {}", geometry_csv.display());
    let geometry = crate::read_table(geometry_csv)?;
    info!("[merge] read {} geometry rows", geometry.height());

    info!("[merge] reading census data from {}", population_csv.display());
    let population = crate::read_table(population_csv)?;
    info!("[merge] read {} census rows", population.height());

    let MergeOutput { document, mut summary } = merge_tables(&geometry, &population, options)?;

    let output = output.map(Path::to_path_buf)
        .unwrap_or_else(|| derive_output_path(geometry_csv, MERGE_OUTPUT_SUFFIX));
    info!("[merge] writing {}", output.display());
    summary.output_bytes = write_geojson(&document, &output)?;
    summary.output_path = Some(output);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm_options() -> MergeOptions {
        MergeOptions { source_epsg: 32634, ..MergeOptions::default() }
    }

    #[test]
    fn population_sum_saturates() {
        let geometry = polars::df!(
            "kod_zsj" => ["SK01012045520", "SK99992045520"],
            "geom" => ["POINT(500000 5400000)", "POINT(500100 5400100)"],
        ).unwrap();
        let population = polars::df!(
            crate::POPULATION_CODE_COLUMN => ["2045520"],
            "Spolu" => ["9e18"],
        ).unwrap();

        let MergeOutput { summary, .. } = merge_tables(&geometry, &population, &utm_options()).unwrap();
        assert_eq!(summary.features, 2);
        assert_eq!(summary.duplicate_keys, 1);
        assert_eq!(summary.total_population, i64::MAX);
        assert_eq!(summary.first_properties.unwrap().pop_total, 9_000_000_000_000_000_000);
    }

    #[test]
    fn summary_reports_keys_without_totals() {
        let geometry = polars::df!(
            "kod_zsj" => ["SK01012045520", "SK01012045521"],
            "geom" => ["POINT(500000 5400000)", "POINT(500100 5400100)"],
        ).unwrap();
        let population = polars::df!(
            crate::POPULATION_CODE_COLUMN => ["2045520", "2045521"],
            "Spolu" => [Some("12"), None],
        ).unwrap();

        let MergeOutput { summary, document } = merge_tables(&geometry, &population, &utm_options()).unwrap();
        assert_eq!(summary.found_keys, 2);
        assert_eq!(summary.matched, 1);
        assert_eq!(document["features"][1]["properties"]["zsj_kod"], "2045521");
        assert_eq!(document["features"][1]["properties"]["pop_total"], 0);
        assert!(summary.to_string().contains("keys found, no total: 1"));
    }
}
