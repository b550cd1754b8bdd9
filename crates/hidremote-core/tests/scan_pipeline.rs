//! Integration tests for the hidremote-core scanning pipeline.
//!
//! These tests feed realistic command bodies through the public API and
//! follow the values all the way to absolute device coordinates, exercising
//! the field scanner, the point list extractor, and the coordinate mapper
//! together.

use hidremote_core::{
    extract_points, find_f32, find_u32, map_normalized, ConsumerKey, DeviceCoordinate,
    NormalizedPoint, COORD_MAX, COORD_MIN,
};

#[test]
fn test_tap_body_with_negative_y_maps_to_top_edge() {
    // Arrange
    let body = br#"{"x": 0.25, "y": -1}"#;

    // Act
    let x = find_f32(body, "x").expect("x present");
    let y = find_f32(body, "y").expect("y present");
    let (dx, dy) = NormalizedPoint::new(x, y).to_device();

    // Assert
    assert_eq!(x, 0.25);
    assert_eq!(dx.value(), 8192);
    assert_eq!(dy, DeviceCoordinate::MIN);
}

#[test]
fn test_tap_body_missing_x_reports_not_found() {
    let body = br#"{"y": 3}"#;
    assert_eq!(find_f32(body, "x"), None);
    assert_eq!(find_f32(body, "y"), Some(3.0));
}

#[test]
fn test_swipe_body_fields_are_independent() {
    // Arrange: keys in an unusual order with extra fields mixed in
    let body = br#"{
        "duration_ms": 450,
        "end_y": 0.1, "end_x": 0.5,
        "comment": "scroll up",
        "start_y": 0.9, "start_x": 0.5
    }"#;

    // Act / Assert
    assert_eq!(find_f32(body, "start_x"), Some(0.5));
    assert_eq!(find_f32(body, "start_y"), Some(0.9));
    assert_eq!(find_f32(body, "end_x"), Some(0.5));
    assert_eq!(find_f32(body, "end_y"), Some(0.1));
    assert_eq!(find_u32(body, "duration_ms"), Some(450));
}

#[test]
fn test_multi_body_points_and_duration_share_one_payload() {
    // Arrange
    let body = br#"{"points":[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4}],"duration_ms":800}"#;

    // Act
    let batch = extract_points(body, "points");
    let duration = find_u32(body, "duration_ms");

    // Assert
    assert_eq!(batch.len(), 2);
    assert_eq!(duration, Some(800));
    let mapped: Vec<_> = batch.iter().map(|p| p.to_device()).collect();
    assert_eq!(mapped[0].0.value(), 3277);
    assert_eq!(mapped[1].1.value(), 13107);
}

#[test]
fn test_every_scanned_value_maps_into_range() {
    let body = br#"{"points":[{"x":-1e9,"y":1e9},{"x":0.5,"y":0.5},{"x":1.5,"y":-0.5}]}"#;
    for point in extract_points(body, "points").iter() {
        let (x, y) = point.to_device();
        for c in [x.value(), y.value()] {
            assert!((COORD_MIN..=COORD_MAX).contains(&c));
        }
    }
    assert_eq!(map_normalized(f32::NAN).value(), COORD_MIN);
}

#[test]
fn test_key_names_round_trip_through_from_str() {
    for key in ConsumerKey::ALL {
        assert_eq!(key.name().parse::<ConsumerKey>(), Ok(key));
    }
}
