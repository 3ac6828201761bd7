// Copyright 2025 Lars Brubaker
// Serialization of the value types, behind the `serde` feature.

#![cfg(feature = "serde")]

use voronoi_dcel::{BoundingShape, Coordinate, VoronoiConfig, VoronoiConfigBuilder};

#[test]
fn coordinate_as_json() {
    let json = serde_json::to_string(&Coordinate::new(1.5, -2.0)).unwrap();
    assert_eq!(json, r#"{"x":1.5,"y":-2.0}"#);
    let back: Coordinate = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Coordinate::new(1.5, -2.0));
}

#[test]
fn config_from_json() {
    let config: VoronoiConfig =
        serde_json::from_str(r#"{"epsilon":1e-6,"collinearity_tolerance":1e-10}"#).unwrap();
    let expected = VoronoiConfigBuilder::new()
        .epsilon(1e-6)
        .unwrap()
        .collinearity_tolerance(1e-10)
        .unwrap()
        .build();
    assert_eq!(config, expected);
    assert!(config.validate().is_ok());
}

#[test]
fn shape_keeps_its_corners() {
    let shape = BoundingShape::rectangle(0.0, 2.0, 0.0, 1.0).unwrap();
    let json = serde_json::to_string(&shape).unwrap();
    let back: BoundingShape = serde_json::from_str(&json).unwrap();
    assert_eq!(back, shape);
    assert_eq!(back.corners().len(), 4);
}
