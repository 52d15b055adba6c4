// End-to-end tests for the standalone converter and the coordinate validator.

use std::fs;

use serde_json::Value;
use zsjgeo::{convert, preview, validate_file, ConvertOptions};

const TABLE: &str = concat!(
    "kod_zsj,nazov_zsj,nazov_okre,plocha,geom\n",
    "SK01012045520,Staré Mesto,Bratislava I,1.25,POINT(500000 5400000)\n",
    "SK01012045521,Nivy,Bratislava II,,\"MULTIPOLYGON(((500000 5400000, 500100 5400000, 500100 5400100, 500000 5400000)))\"\n",
    "SK01012045522,Prázdna,Bratislava II,3,\n",
);

#[test]
fn converts_all_columns_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zsj.csv");
    fs::write(&input, TABLE).unwrap();

    let options = ConvertOptions { source_epsg: 32634, ..ConvertOptions::default() };
    let summary = convert(&input, None, &options).unwrap();
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.features, 2);
    assert_eq!(summary.errors, 1);

    let output = dir.path().join("zsj.geojson");
    assert_eq!(summary.output_path.as_deref(), Some(output.as_path()));

    let document: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let first = &document["features"][0]["properties"];
    assert_eq!(first["kod_zsj"], "SK01012045520");
    assert_eq!(first["nazov_okre"], "Bratislava I");
    assert_eq!(first["plocha"], 1.25);
    assert_eq!(document["features"][1]["properties"]["plocha"], Value::Null);
    assert_eq!(document["features"][1]["geometry"]["type"], "MultiPolygon");

    let report = validate_file(&output).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.total, 2);
    let (lon_min, lon_max) = report.lon_range.unwrap();
    assert!(lon_min >= 20.9 && lon_max <= 21.1);
}

#[test]
fn simple_mode_with_explicit_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zsj.csv");
    let output = dir.path().join("simple.geojson");
    fs::write(&input, TABLE).unwrap();

    let options = ConvertOptions {
        source_epsg: 32634,
        ..ConvertOptions::simple(Some(vec!["nazov_zsj".into(), "neexistuje".into()]))
    };
    let summary = convert(&input, Some(&output), &options).unwrap();
    assert_eq!(summary.property_columns, vec!["nazov_zsj"]);

    let document: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let properties = document["features"][0]["properties"].as_object().unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties["nazov_zsj"], "Staré Mesto");
}

#[test]
fn preview_drops_geometry_column() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zsj.csv");
    fs::write(&input, TABLE).unwrap();

    let head = preview(&input, "geom").unwrap();
    assert_eq!(head.height(), 3);
    assert!(head.column("geom").is_err());
    assert!(head.column("nazov_zsj").is_ok());
}

#[test]
fn invalid_coordinates_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.geojson");
    fs::write(&path, r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "zsj_nazov": "Ružinov" },
              "geometry": { "type": "Point", "coordinates": [-577000.0, -1276000.0] } }
        ]
    }"#).unwrap();

    let report = validate_file(&path).unwrap();
    assert!(!report.is_valid());
    assert_eq!(report.invalid[0].name, "Ružinov");
    assert!(report.to_string().contains("Ružinov"));
}
