//! Named numeric field lookup.
//!
//! The lookup for `field` proceeds in four steps:
//!
//! 1. Find the first `"field"` (with the quotes) in the buffer.
//! 2. Skip ASCII whitespace and require a `:`.
//! 3. Skip ASCII whitespace again.
//! 4. Lex the longest numeric literal at that position and parse it.
//!
//! Accepted literals are plain decimals and exponent forms with an optional
//! sign: `3`, `-0.25`, `.5`, `5.`, `+1e-3`, `2.5E2`.  Keywords such as
//! `null`, `true`, `nan` or `inf`, and quoted strings, are not numbers here.
//! Trailing characters after the longest valid prefix are ignored, so
//! `1e` reads as `1` and `0.5abc` as `0.5`.

/// Looks up `field` and parses the number after it as `f64`.
///
/// Returns `None` if the quoted name is absent, is not followed by a colon,
/// or the colon is not followed by a numeric literal.
///
/// # Examples
///
/// ```rust
/// use hidremote_core::find_number;
///
/// let body = br#"{"x": 0.25, "duration_ms": 1.2e3}"#;
/// assert_eq!(find_number(body, "x"), Some(0.25));
/// assert_eq!(find_number(body, "duration_ms"), Some(1200.0));
/// assert_eq!(find_number(body, "y"), None);
/// ```
pub fn find_number(text: &[u8], field: &str) -> Option<f64> {
    let after_name = find_quoted(text, field.as_bytes())?;

    let colon = skip_whitespace(text, after_name);
    if text.get(colon) != Some(&b':') {
        return None;
    }

    let start = skip_whitespace(text, colon + 1);
    let rest = text.get(start..)?;
    let len = numeric_prefix_len(rest)?;

    // The prefix is pure ASCII by construction, so this cannot fail.
    let literal = std::str::from_utf8(&rest[..len]).ok()?;
    literal.parse::<f64>().ok()
}

/// Looks up `field` as a single-precision float.
///
/// Magnitudes beyond `f32` range become infinities, which the coordinate
/// mapper saturates like any other out-of-range value.
pub fn find_f32(text: &[u8], field: &str) -> Option<f32> {
    find_number(text, field).map(|v| v as f32)
}

/// Looks up `field` as a non-negative integer.
///
/// Negative values floor to `0`; everything else rounds to the nearest
/// integer with halves rounding up, saturating at `u32::MAX`.
///
/// ```rust
/// use hidremote_core::find_u32;
///
/// assert_eq!(find_u32(br#"{"duration_ms": 249.5}"#, "duration_ms"), Some(250));
/// assert_eq!(find_u32(br#"{"duration_ms": -40}"#, "duration_ms"), Some(0));
/// ```
pub fn find_u32(text: &[u8], field: &str) -> Option<u32> {
    let value = find_number(text, field)?;
    let non_negative = if value < 0.0 { 0.0 } else { value };
    // `as` saturates on overflow.
    Some((non_negative + 0.5).floor() as u32)
}

/// Returns the index just past the closing quote of the first `"name"`.
pub(crate) fn find_quoted(text: &[u8], name: &[u8]) -> Option<usize> {
    let needle_len = name.len() + 2;
    if text.len() < needle_len {
        return None;
    }
    (0..=text.len() - needle_len)
        .find(|&i| {
            text[i] == b'"' && text[i + 1..].starts_with(name) && text[i + 1 + name.len()] == b'"'
        })
        .map(|i| i + needle_len)
}

pub(crate) fn skip_whitespace(text: &[u8], mut pos: usize) -> usize {
    while text.get(pos).is_some_and(|b| b.is_ascii_whitespace()) {
        pos += 1;
    }
    pos
}

fn count_digits(text: &[u8], from: usize) -> usize {
    text.get(from..)
        .map(|tail| tail.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}

/// Length of the longest numeric literal at the start of `text`.
///
/// Grammar: `[+-]? (D+ ('.' D*)? | '.' D+) ([eE] [+-]? D+)?`.  An exponent
/// marker without digits is not consumed.
fn numeric_prefix_len(text: &[u8]) -> Option<usize> {
    let mut pos = 0;
    if matches!(text.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(text, pos);
    pos += int_digits;

    let mut frac_digits = 0;
    if text.get(pos) == Some(&b'.') {
        frac_digits = count_digits(text, pos + 1);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(text.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(text.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = count_digits(text, exp);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    Some(pos)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── find_number ───────────────────────────────────────────────────────────

    #[test]
    fn test_find_number_reads_plain_fields() {
        // Arrange
        let body = br#"{"x": 0.25, "y": -1}"#;

        // Act / Assert
        assert_eq!(find_number(body, "x"), Some(0.25));
        assert_eq!(find_number(body, "y"), Some(-1.0));
    }

    #[test]
    fn test_find_number_missing_field_is_none() {
        assert_eq!(find_number(br#"{"y": 3}"#, "x"), None);
    }

    #[test]
    fn test_find_number_tolerates_whitespace_and_newlines() {
        let body = b"{\n  \"x\"\t :\r\n   0.75 ,\n}";
        assert_eq!(find_number(body, "x"), Some(0.75));
    }

    #[test]
    fn test_find_number_without_whitespace() {
        assert_eq!(find_number(br#"{"x":1,"y":2}"#, "y"), Some(2.0));
    }

    #[test]
    fn test_find_number_accepts_exponent_forms() {
        assert_eq!(find_number(br#"{"v": 1e3}"#, "v"), Some(1000.0));
        assert_eq!(find_number(br#"{"v": 2.5E-1}"#, "v"), Some(0.25));
        assert_eq!(find_number(br#"{"v": -4e+2}"#, "v"), Some(-400.0));
    }

    #[test]
    fn test_find_number_accepts_bare_fraction_and_trailing_dot() {
        assert_eq!(find_number(br#"{"v": .5}"#, "v"), Some(0.5));
        assert_eq!(find_number(br#"{"v": 5.}"#, "v"), Some(5.0));
        assert_eq!(find_number(br#"{"v": +7}"#, "v"), Some(7.0));
    }

    #[test]
    fn test_find_number_ignores_dangling_exponent_marker() {
        assert_eq!(find_number(br#"{"v": 1e}"#, "v"), Some(1.0));
        assert_eq!(find_number(br#"{"v": 3E+}"#, "v"), Some(3.0));
    }

    #[test]
    fn test_find_number_rejects_non_numeric_tokens() {
        let bodies: [&[u8]; 8] = [
            br#"{"x": "0.5"}"#,
            br#"{"x": null}"#,
            br#"{"x": true}"#,
            br#"{"x": nan}"#,
            br#"{"x": inf}"#,
            br#"{"x": -}"#,
            br#"{"x": .}"#,
            br#"{"x": [1]}"#,
        ];
        for body in bodies {
            assert_eq!(find_number(body, "x"), None, "{:?}", String::from_utf8_lossy(body));
        }
    }

    #[test]
    fn test_find_number_requires_colon_after_name() {
        assert_eq!(find_number(br#"{"x" 0.5}"#, "x"), None);
        assert_eq!(find_number(br#"{"x", "y": 0.5}"#, "x"), None);
    }

    #[test]
    fn test_find_number_truncated_payload_is_none() {
        assert_eq!(find_number(br#"{"x":"#, "x"), None);
        assert_eq!(find_number(br#"{"x""#, "x"), None);
        assert_eq!(find_number(br#"{"x"#, "x"), None);
        assert_eq!(find_number(b"", "x"), None);
    }

    #[test]
    fn test_find_number_uses_first_occurrence_only() {
        // Duplicate keys: the first wins.
        assert_eq!(find_number(br#"{"x": 0.1, "x": 0.9}"#, "x"), Some(0.1));
        // The name first appears as a string value, so the real key is hidden.
        assert_eq!(find_number(br#"{"label": "x", "x": 0.9}"#, "x"), None);
    }

    #[test]
    fn test_find_number_does_not_match_suffix_of_longer_name() {
        let body = br#"{"start_x": 0.1, "end_x": 0.9}"#;
        assert_eq!(find_number(body, "x"), None);
        assert_eq!(find_number(body, "end_x"), Some(0.9));
    }

    #[test]
    fn test_find_number_ignores_trailing_garbage_after_literal() {
        assert_eq!(find_number(br#"{"x": 0.5abc}"#, "x"), Some(0.5));
    }

    #[test]
    fn test_find_number_survives_invalid_utf8() {
        let body = b"\xff\xfe{\"x\": 0.5, \"\xc3\x28\": 1}";
        assert_eq!(find_number(body, "x"), Some(0.5));
    }

    #[test]
    fn test_find_number_huge_exponent_is_infinite() {
        assert_eq!(find_number(br#"{"v": 1e999}"#, "v"), Some(f64::INFINITY));
    }

    // ── find_f32 ──────────────────────────────────────────────────────────────

    #[test]
    fn test_find_f32_narrows_value() {
        assert_eq!(find_f32(br#"{"x": 0.25}"#, "x"), Some(0.25_f32));
    }

    #[test]
    fn test_find_f32_out_of_range_becomes_infinity() {
        assert_eq!(find_f32(br#"{"x": 1e300}"#, "x"), Some(f32::INFINITY));
    }

    // ── find_u32 ──────────────────────────────────────────────────────────────

    #[test]
    fn test_find_u32_rounds_half_up() {
        assert_eq!(find_u32(br#"{"d": 1.5}"#, "d"), Some(2));
        assert_eq!(find_u32(br#"{"d": 2.4999}"#, "d"), Some(2));
        assert_eq!(find_u32(br#"{"d": 300}"#, "d"), Some(300));
    }

    #[test]
    fn test_find_u32_floors_negative_to_zero() {
        assert_eq!(find_u32(br#"{"d": -5}"#, "d"), Some(0));
        assert_eq!(find_u32(br#"{"d": -0.4}"#, "d"), Some(0));
    }

    #[test]
    fn test_find_u32_saturates_large_values() {
        assert_eq!(find_u32(br#"{"d": 1e20}"#, "d"), Some(u32::MAX));
    }

    #[test]
    fn test_find_u32_missing_field_is_none() {
        assert_eq!(find_u32(br#"{"x": 1}"#, "duration_ms"), None);
    }

    // ── numeric_prefix_len ────────────────────────────────────────────────────

    #[test]
    fn test_numeric_prefix_len_edges() {
        assert_eq!(numeric_prefix_len(b"12,"), Some(2));
        assert_eq!(numeric_prefix_len(b"-0.5}"), Some(4));
        assert_eq!(numeric_prefix_len(b"1.5e-2 "), Some(6));
        assert_eq!(numeric_prefix_len(b"e5"), None);
        assert_eq!(numeric_prefix_len(b"+"), None);
        assert_eq!(numeric_prefix_len(b""), None);
    }
}
