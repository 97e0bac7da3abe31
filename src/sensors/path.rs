//! Dotted-path field lookup over JSON sensor documents.
//!
//! A path such as `sensor.co.value` is split on `.` and each segment is used
//! in turn as an object key (or as a decimal index into an array).

use crate::error::{Result, SensorError};
use serde_json::Value;
use std::fmt;

static ABSENT: Value = Value::Null;

/// A parsed dotted path, e.g. `sensor.co.value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DottedPath {
    raw: String,
    segments: Vec<String>,
}

impl DottedPath {
    pub fn new(path: impl Into<String>) -> Self {
        let raw = path.into();
        let segments = raw.split('.').map(str::to_owned).collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `document` along this path.
    ///
    /// Fails if an intermediate segment is missing, null or a scalar. A
    /// missing final segment resolves to `Value::Null`, as does a null leaf.
    pub fn resolve<'a>(&self, document: &'a Value) -> Result<&'a Value> {
        let mut current = document;
        let last = self.segments.len() - 1;

        for (depth, segment) in self.segments.iter().enumerate() {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                Value::Null => {
                    return Err(self.error(format!("`{}` is null", self.prefix(depth))));
                }
                _ => {
                    return Err(self.error(format!(
                        "`{}` is not an object or array",
                        self.prefix(depth)
                    )));
                }
            };

            current = match next {
                Some(value) => value,
                None if depth == last => &ABSENT,
                None => {
                    return Err(self.error(format!(
                        "`{}` does not exist",
                        self.prefix(depth + 1)
                    )));
                }
            };
        }

        Ok(current)
    }

    /// Resolve the path and coerce the result with [`coerce_number`].
    pub fn resolve_number(&self, document: &Value) -> Result<f64> {
        self.resolve(document).map(coerce_number)
    }

    fn prefix(&self, depth: usize) -> String {
        if depth == 0 {
            "<root>".to_string()
        } else {
            self.segments[..depth].join(".")
        }
    }

    fn error(&self, reason: String) -> SensorError {
        SensorError::Extraction {
            path: self.raw.clone(),
            reason,
        }
    }
}

impl fmt::Display for DottedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for DottedPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Coerce a JSON value to a float reading.
///
/// Numbers pass through. Strings are parsed by their longest leading float
/// prefix, so `"12.5ppm"` reads as 12.5. A non-empty array reads as its
/// first element (`[5]` is 5). Anything else, null included, is NaN.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        Value::Array(items) => items.first().map_or(f64::NAN, coerce_number),
        _ => f64::NAN,
    }
}

/// Parse the longest leading float literal of `input`, ignoring leading
/// whitespace. Returns NaN when no digits are found.
pub fn parse_float_prefix(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
