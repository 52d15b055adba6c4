use anyhow::Result;
use polars::frame::DataFrame;

use crate::{io::csv::{column_names, optional_string_column, require_column, string_column}, PipelineError};

/// Identifier columns tried, in order, when none is given explicitly.
pub const ID_COLUMN_CANDIDATES: [&str; 4] = ["kod_zsj", "ic_zsj", "zsj_kod", "code"];

/// One row of the geometry table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryRecord {
    /// National identifier, e.g. `SK01012045520`.
    pub raw_id: Option<String>,
    /// Geometry as Well-Known Text in the source CRS.
    pub wkt: Option<String>,
    /// `nazov_zsj`, used when the census has no ZSJ name.
    pub alt_zsj_name: Option<String>,
    /// `nazov_okre`, used when the census has no district name.
    pub alt_district_name: Option<String>,
}

/// Pick the identifier column: `preferred` if given, else the first candidate present.
pub(crate) fn identifier_column(df: &DataFrame, preferred: Option<&str>) -> Result<String> {
    if let Some(name) = preferred {
        require_column(df, "geometry", name)?;
        return Ok(name.to_string());
    }

    ID_COLUMN_CANDIDATES.iter()
        .find(|name| df.column(name).is_ok())
        .map(|name| name.to_string())
        .ok_or_else(|| PipelineError::NoIdentifierColumn {
            tried: ID_COLUMN_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            available: column_names(df).into_iter().take(20).collect(),
        }.into())
}

/// Read geometry records from a table read with every column as text.
pub(crate) fn geometry_records(df: &DataFrame, id_column: &str, geometry_column: &str) -> Result<Vec<GeometryRecord>> {
    require_column(df, "geometry", geometry_column)?;

    let ids = string_column(df, id_column)?;
    let wkts = string_column(df, geometry_column)?;
    let zsj_names = optional_string_column(df, "nazov_zsj")?;
    let district_names = optional_string_column(df, "nazov_okre")?;

    Ok(ids.into_iter()
        .zip(wkts)
        .enumerate()
        .map(|(i, (raw_id, wkt))| GeometryRecord {
            raw_id,
            wkt,
            alt_zsj_name: zsj_names.as_ref().and_then(|v| v[i].clone()),
            alt_district_name: district_names.as_ref().and_then(|v| v[i].clone()),
        })
        .collect())
}
