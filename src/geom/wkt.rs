use anyhow::{anyhow, bail, Result};
use geo::Geometry;
use wkt::TryFromWkt;

/// Parse a WKT (or EWKT with an `SRID=...;` prefix) string into a geometry.
pub fn parse_wkt(text: &str) -> Result<Geometry<f64>> {
    let text = text.trim();
    if text.is_empty() {
        bail!("[geom::wkt] empty geometry text");
    }

    let body = match text.split_once(';') {
        Some((prefix, rest)) if prefix.trim_start().to_ascii_uppercase().starts_with("SRID=") => rest,
        _ => text,
    };

    Geometry::<f64>::try_from_wkt_str(body)
        .map_err(|e| anyhow!("[geom::wkt] invalid WKT: {e}"))
}
