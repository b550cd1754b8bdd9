//! Bracketed point list extraction.
//!
//! Multi-point commands carry a list such as
//!
//! ```json
//! {"points": [{"x": 0.1, "y": 0.2}, {"x": 0.3, "y": 0.4}], "duration_ms": 300}
//! ```
//!
//! The list body is the text between the first `[` after `"points":` and the
//! first `]` after that.  Nested brackets are not tracked.  Inside the body
//! each object-like segment (everything up to the next `}`) is scanned for
//! `x` and `y` with the field scanner.
//!
//! Extraction stops quietly at the first segment missing either coordinate,
//! at the end of the list, or once [`MAX_POINTS`] points are collected.
//! Whatever was gathered up to that point is returned; an empty batch is how
//! the caller learns the list was unusable.

use tracing::{debug, trace};

use super::field::{find_f32, find_quoted, skip_whitespace};
use crate::domain::coordinates::NormalizedPoint;
use crate::domain::gesture::{PointBatch, MAX_POINTS};

/// Collects up to [`MAX_POINTS`] points from the list named `field`.
///
/// Never fails; malformed input truncates the batch instead.
///
/// # Examples
///
/// ```rust
/// use hidremote_core::extract_points;
///
/// let body = br#"{"points":[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4}]}"#;
/// let batch = extract_points(body, "points");
/// assert_eq!(batch.len(), 2);
///
/// assert!(extract_points(br#"{"points":[]}"#, "points").is_empty());
/// ```
pub fn extract_points(text: &[u8], field: &str) -> PointBatch {
    let mut batch = PointBatch::new();

    let Some(list) = list_body(text, field) else {
        trace!(field, "no bracketed list found");
        return batch;
    };

    let mut cursor = 0;
    while cursor < list.len() && !batch.is_full() {
        let rest = &list[cursor..];
        let close = rest.iter().position(|&b| b == b'}');
        let segment = match close {
            Some(end) => &rest[..end],
            None => rest,
        };

        let (Some(x), Some(y)) = (find_f32(segment, "x"), find_f32(segment, "y")) else {
            trace!(index = batch.len(), "segment without x/y ends the list");
            break;
        };
        batch.push(NormalizedPoint::new(x, y));

        match close {
            Some(end) => cursor += end + 1,
            None => break,
        }
    }

    if batch.is_full() && list[cursor.min(list.len())..].contains(&b'{') {
        debug!("point list longer than {MAX_POINTS}; extra points dropped");
    }

    batch
}

/// Returns the bytes strictly between `"field": [` and the next `]`.
fn list_body<'a>(text: &'a [u8], field: &str) -> Option<&'a [u8]> {
    let after_name = find_quoted(text, field.as_bytes())?;

    let colon = skip_whitespace(text, after_name);
    if text.get(colon) != Some(&b':') {
        return None;
    }

    let open = skip_whitespace(text, colon + 1);
    if text.get(open) != Some(&b'[') {
        return None;
    }

    let body_start = open + 1;
    let len = text[body_start..].iter().position(|&b| b == b']')?;
    Some(&text[body_start..body_start + len])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> NormalizedPoint {
        NormalizedPoint::new(x, y)
    }

    #[test]
    fn test_extract_points_two_points_in_order() {
        // Arrange
        let body = br#"{"points":[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4}]}"#;

        // Act
        let batch = extract_points(body, "points");

        // Assert
        assert_eq!(batch.as_slice(), &[p(0.1, 0.2), p(0.3, 0.4)]);
    }

    #[test]
    fn test_extract_points_empty_list_is_empty_batch() {
        assert!(extract_points(br#"{"points":[]}"#, "points").is_empty());
        assert!(extract_points(br#"{"points": [  ]}"#, "points").is_empty());
    }

    #[test]
    fn test_extract_points_missing_field_is_empty_batch() {
        assert!(extract_points(br#"{"x":0.1,"y":0.2}"#, "points").is_empty());
        assert!(extract_points(b"", "points").is_empty());
    }

    #[test]
    fn test_extract_points_without_closing_bracket_is_empty_batch() {
        assert!(extract_points(br#"{"points":[{"x":0.1,"y":0.2}"#, "points").is_empty());
    }

    #[test]
    fn test_extract_points_non_list_value_is_empty_batch() {
        assert!(extract_points(br#"{"points": 3, "other": [{"x":0.1,"y":0.2}]}"#, "points").is_empty());
        assert!(extract_points(br#"{"points" [{"x":0.1,"y":0.2}]}"#, "points").is_empty());
    }

    #[test]
    fn test_extract_points_caps_at_five() {
        // Arrange: seven well-formed points
        let body = br#"{"points":[
            {"x":0.1,"y":0.1},{"x":0.2,"y":0.2},{"x":0.3,"y":0.3},
            {"x":0.4,"y":0.4},{"x":0.5,"y":0.5},{"x":0.6,"y":0.6},
            {"x":0.7,"y":0.7}
        ]}"#;

        // Act
        let batch = extract_points(body, "points");

        // Assert
        assert_eq!(batch.len(), MAX_POINTS);
        assert_eq!(batch.as_slice()[4], p(0.5, 0.5));
    }

    #[test]
    fn test_extract_points_stops_at_first_malformed_segment() {
        // Arrange: second point lacks y, third is fine but never reached
        let body = br#"{"points":[{"x":0.1,"y":0.2},{"x":0.3},{"x":0.5,"y":0.6}]}"#;

        // Act
        let batch = extract_points(body, "points");

        // Assert
        assert_eq!(batch.as_slice(), &[p(0.1, 0.2)]);
    }

    #[test]
    fn test_extract_points_segment_does_not_borrow_from_next_object() {
        // y only exists in the following object; it must not be picked up.
        let body = br#"{"points":[{"x":0.1},{"y":0.2}]}"#;
        assert!(extract_points(body, "points").is_empty());
    }

    #[test]
    fn test_extract_points_ignores_extra_fields_and_key_order() {
        let body = br#"{"id":7,"points":[ { "y" : 0.9 , "pressure": 1, "x" : 0.8 } ],"duration_ms":300}"#;
        assert_eq!(extract_points(body, "points").as_slice(), &[p(0.8, 0.9)]);
    }

    #[test]
    fn test_extract_points_unterminated_last_object_still_counts() {
        let body = br#"{"points":[{"x":0.1,"y":0.2},{"x":0.3,"y":0.4]}"#;
        assert_eq!(extract_points(body, "points").as_slice(), &[p(0.1, 0.2), p(0.3, 0.4)]);
    }

    #[test]
    fn test_extract_points_keeps_out_of_range_values_for_the_mapper() {
        let body = br#"{"points":[{"x":-3,"y":12.5}]}"#;
        assert_eq!(extract_points(body, "points").as_slice(), &[p(-3.0, 12.5)]);
    }

    #[test]
    fn test_extract_points_garbage_never_panics() {
        let inputs: [&[u8]; 6] = [
            b"\"points\":[",
            b"\"points\":[}}}}]",
            b"\"points\":[{\"x\":}]",
            b"\"points\"",
            b"[{\"x\":1,\"y\":1}]",
            b"\xff\"points\":[\xfe{\"x\":1,\"y\":1}]",
        ];
        for input in inputs {
            let _ = extract_points(input, "points");
        }
        assert_eq!(extract_points(inputs[5], "points").len(), 1);
    }
}
