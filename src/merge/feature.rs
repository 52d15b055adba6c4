use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use super::join::JoinedRow;

/// The fixed property set attached to every merged feature.
/// Counts default to 0, names to `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZsjProperties {
    pub zsj_kod: Option<String>,
    pub zsj_nazov: Option<String>,
    pub kraj_nazov: Option<String>,
    pub okres_nazov: Option<String>,
    pub obec_nazov: Option<String>,
    pub pop_trvaly_pobyt: i64,
    pub pop_inde_sr: i64,
    pub pop_zahranicie: i64,
    pub pop_total: i64,
}

impl ZsjProperties {
    pub fn from_row(row: &JoinedRow<'_>) -> Self {
        let census = row.population;
        let residents = census.map(|p| p.residents).unwrap_or_default();

        Self {
            zsj_kod: census.map(|p| p.zsj_code.clone()),
            zsj_nazov: census.and_then(|p| p.zsj_name.clone())
                .or_else(|| row.geometry.alt_zsj_name.clone()),
            kraj_nazov: census.and_then(|p| p.region_name.clone()),
            okres_nazov: census.and_then(|p| p.district_name.clone())
                .or_else(|| row.geometry.alt_district_name.clone()),
            obec_nazov: census.and_then(|p| p.municipality_name.clone()),
            pop_trvaly_pobyt: residents.local.unwrap_or(0),
            pop_inde_sr: residents.domestic_other.unwrap_or(0),
            pop_zahranicie: residents.foreign.unwrap_or(0),
            pop_total: residents.total.unwrap_or(0),
        }
    }

    pub fn to_json(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self).context("[merge::feature] failed to serialize properties")? {
            Value::Object(map) => Ok(map),
            other => anyhow::bail!("[merge::feature] properties serialized to {other}, expected an object"),
        }
    }
}
