//! Fatal pipeline conditions.
//!
//! Everything else is reported through `anyhow` with context strings; these
//! variants exist so callers can tell *why* a run was aborted.

use std::fmt::Write;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("required column '{column}' not found in {table}; available: {}", .available.join(", "))]
    MissingColumn {
        table: &'static str,
        column: String,
        available: Vec<String>,
    },

    #[error("no identifier column found in geometry table (tried {}); available: {}", .tried.join(", "), .available.join(", "))]
    NoIdentifierColumn {
        tried: Vec<String>,
        available: Vec<String>,
    },

    #[error("no geometry rows matched a population record with a total{}", format_samples(.samples))]
    NoMatches { samples: KeySamples },

    #[error("non-finite coordinate ({x}, {y}) produced by reprojection")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("no built-in PROJ.4 definition for EPSG:{0}; pass an explicit PROJ.4 string")]
    UnknownEpsg(u32),
}

/// Key samples dumped when a join produces no matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySamples {
    pub geometry_ids: Vec<String>,
    pub short_keys: Vec<String>,
    pub population_keys: Vec<String>,
}

fn format_samples(samples: &KeySamples) -> String {
    let mut out = String::new();
    let _ = write!(out, "\n  geometry ids (original):  {:?}", samples.geometry_ids);
    let _ = write!(out, "\n  geometry ids (extracted): {:?}", samples.short_keys);
    let _ = write!(out, "\n  population codes:         {:?}", samples.population_keys);
    out
}
