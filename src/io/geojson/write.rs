//! GeoJSON writing operations.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, Polygon};
use serde_json::{json, Map, Number, Value};

use crate::{geom::Crs, io::fs::write_atomic, PipelineError};

/// A JSON number for a coordinate component; NaN and infinities are refused.
fn coord_to_geojson(coord: &Coord<f64>) -> Result<Value> {
    let number = |v: f64| Number::from_f64(v)
        .map(Value::Number)
        .ok_or(PipelineError::NonFiniteCoordinate { x: coord.x, y: coord.y });
    Ok(Value::Array(vec![number(coord.x)?, number(coord.y)?]))
}

fn line_to_geojson(line: &LineString<f64>) -> Result<Value> {
    line.coords().map(coord_to_geojson).collect::<Result<Vec<_>>>().map(Value::Array)
}

fn polygon_to_geojson(polygon: &Polygon<f64>) -> Result<Value> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_to_geojson)
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

/// Convert a geometry into a GeoJSON geometry object.
pub(crate) fn geometry_to_geojson(geometry: &Geometry<f64>) -> Result<Value> {
    let (kind, coordinates) = match geometry {
        Geometry::Point(point) => ("Point", coord_to_geojson(&point.0)?),
        Geometry::Line(line) => ("LineString", Value::Array(vec![
            coord_to_geojson(&line.start)?,
            coord_to_geojson(&line.end)?,
        ])),
        Geometry::LineString(line) => ("LineString", line_to_geojson(line)?),
        Geometry::Polygon(polygon) => ("Polygon", polygon_to_geojson(polygon)?),
        Geometry::MultiPoint(points) => ("MultiPoint", points.iter()
            .map(|p| coord_to_geojson(&p.0))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)?),
        Geometry::MultiLineString(lines) => ("MultiLineString", lines.iter()
            .map(line_to_geojson)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)?),
        Geometry::MultiPolygon(polygons) => ("MultiPolygon", polygons.iter()
            .map(polygon_to_geojson)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)?),
        Geometry::Rect(rect) => ("Polygon", polygon_to_geojson(&rect.to_polygon())?),
        Geometry::Triangle(triangle) => ("Polygon", polygon_to_geojson(&triangle.to_polygon())?),
        Geometry::GeometryCollection(collection) => {
            let geometries = collection.iter()
                .map(geometry_to_geojson)
                .collect::<Result<Vec<_>>>()?;
            return Ok(json!({ "type": "GeometryCollection", "geometries": geometries }));
        }
    };

    Ok(json!({ "type": kind, "coordinates": coordinates }))
}

/// Build one GeoJSON Feature.
pub(crate) fn feature(geometry: Value, properties: Map<String, Value>) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    })
}

/// Build a FeatureCollection tagged with a named CRS.
pub(crate) fn feature_collection(features: Vec<Value>, crs: &Crs) -> Value {
    json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": crs.urn() },
        },
        "features": features,
    })
}

/// Serialize a GeoJSON document: two-space indent, non-ASCII kept as UTF-8.
pub(crate) fn to_geojson_string(document: &Value) -> Result<String> {
    serde_json::to_string_pretty(document).context("[io::geojson::write] Failed to serialize GeoJSON")
}

/// Serialize and write a GeoJSON document to `path`, returning the byte count.
pub(crate) fn write_geojson(document: &Value, path: &Path) -> Result<u64> {
    let text = to_geojson_string(document)?;
    write_atomic(path, text.as_bytes())
        .with_context(|| format!("[io::geojson::write] Failed to write GeoJSON to {}", path.display()))
}

/// First x/y pair found in a GeoJSON geometry object.
pub(crate) fn first_coordinate(geometry: &Value) -> Option<(f64, f64)> {
    let mut current = geometry.get("coordinates")?;
    loop {
        let items = current.as_array()?;
        match items.first()? {
            Value::Number(x) => return Some((x.as_f64()?, items.get(1)?.as_f64()?)),
            nested => current = nested,
        }
    }
}
