//! Timestamp parsing and normalization utilities
//!
//! Two independent conversions live here. [`TimeParser::parse_duration`] turns a
//! user-entered timestamp into whole seconds for bitrate arithmetic, and
//! [`TimeParser::normalize_timestamp`] rewrites the same input into the
//! zero-padded `HH:MM:SS[.fraction]` form handed to the encoder. The first is
//! numeric and fallible, the second is purely textual and never fails.

use std::fmt;

use serde::Serialize;

use crate::error::{SizeFitError, SizeFitResult};

const MAX_COMPONENTS: usize = 3;

/// Multipliers for SS, MM and HH, indexed from the rightmost component
const COMPONENT_SECONDS: [f64; MAX_COMPONENTS] = [1.0, 60.0, 3600.0];

/// Timestamp in `HH:MM:SS[.fraction]` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalTimestamp(String);

impl CanonicalTimestamp {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `.fraction` suffix, including the dot, if one was entered
    pub fn fraction(&self) -> Option<&str> {
        self.0.find('.').map(|idx| &self.0[idx..])
    }
}

impl fmt::Display for CanonicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalTimestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Time parser for user-entered timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeParser;

impl TimeParser {
    /// Create a new time parser
    pub fn new() -> Self {
        Self
    }

    /// Parse `SS`, `MM:SS` or `HH:MM:SS` (each with an optional `.fraction`)
    /// into whole seconds. The fraction is dropped before arithmetic.
    pub fn parse_duration(&self, time_str: &str) -> SizeFitResult<f64> {
        let trimmed = time_str.trim();
        let (clock, fraction) = split_fraction(trimmed);

        if fraction.contains(':') {
            return Err(SizeFitError::parse(
                time_str,
                "fractional seconds must come last",
            ));
        }
        if !fraction.chars().skip(1).all(|c| c.is_ascii_digit()) {
            return Err(SizeFitError::parse(time_str, "fraction is not numeric"));
        }

        let parts: Vec<&str> = clock.split(':').collect();
        if parts.len() > MAX_COMPONENTS {
            return Err(SizeFitError::parse(
                time_str,
                format!("too many components ({})", parts.len()),
            ));
        }

        parts
            .iter()
            .rev()
            .zip(COMPONENT_SECONDS)
            .try_fold(0.0, |total, (part, scale)| {
                Ok(total + parse_component(time_str, part)? as f64 * scale)
            })
    }

    /// Pad a partial timestamp to `HH:MM:SS` and re-append its fraction untouched.
    ///
    /// ```text
    ///       1    -> 00:00:01
    ///    1:11    -> 00:01:11
    ///  1:11:11   -> 01:11:11
    ///      11.5  -> 00:00:11.5
    ///   11:11.3  -> 00:11:11.3
    /// ```
    pub fn normalize_timestamp(&self, time_str: &str) -> CanonicalTimestamp {
        let (clock, fraction) = split_fraction(time_str.trim());

        let mut fields: Vec<String> = clock.split(':').map(pad_field).collect();
        while fields.len() < MAX_COMPONENTS {
            fields.insert(0, "00".to_string());
        }

        CanonicalTimestamp(format!("{}{}", fields.join(":"), fraction))
    }
}

/// Split at the first `.` into the clock part and the fraction (dot included)
fn split_fraction(text: &str) -> (&str, &str) {
    match text.find('.') {
        Some(idx) => text.split_at(idx),
        None => (text, ""),
    }
}

fn pad_field(field: &str) -> String {
    format!("{:0>2}", field)
}

fn parse_component(input: &str, part: &str) -> SizeFitResult<u64> {
    if part.is_empty() {
        return Err(SizeFitError::parse(input, "empty component"));
    }
    if !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(SizeFitError::parse(
            input,
            format!("'{}' is not a number", part),
        ));
    }
    part.parse::<u64>()
        .map_err(|e| SizeFitError::parse(input, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TimeParser {
        TimeParser::new()
    }

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parser().parse_duration("01:11:11").unwrap(), 4271.0);
        assert_eq!(parser().parse_duration("1:11:11").unwrap(), 4271.0);
    }

    #[test]
    fn parses_shorter_forms() {
        assert_eq!(parser().parse_duration("45").unwrap(), 45.0);
        assert_eq!(parser().parse_duration("2:30").unwrap(), 150.0);
        assert_eq!(parser().parse_duration(" 0:00:30 ").unwrap(), 30.0);
    }

    #[test]
    fn drops_fraction_before_arithmetic() {
        assert_eq!(parser().parse_duration("11.5").unwrap(), 11.0);
        assert_eq!(parser().parse_duration("00:11:11.3").unwrap(), 671.0);
        assert_eq!(parser().parse_duration("11.").unwrap(), 11.0);
    }

    #[test]
    fn rejects_non_numeric_components() {
        let err = parser().parse_duration("ab:cd:ef").unwrap_err();
        assert!(matches!(err, SizeFitError::Parse { .. }));
        assert!(parser().parse_duration("1:x").is_err());
        assert!(parser().parse_duration("+5").is_err());
        assert!(parser().parse_duration("-5").is_err());
        assert!(parser().parse_duration("10.5x").is_err());
    }

    #[test]
    fn rejects_malformed_layouts() {
        assert!(parser().parse_duration("1:2:3:4").is_err());
        assert!(parser().parse_duration("").is_err());
        assert!(parser().parse_duration("1::2").is_err());
        assert!(parser().parse_duration("1.5:00").is_err());
    }

    #[test]
    fn fraction_starts_at_the_first_dot() {
        let err = parser().parse_duration("1.2.3").unwrap_err();
        assert!(matches!(err, SizeFitError::Parse { .. }));
        assert_eq!(parser().normalize_timestamp("1.2.3").as_str(), "00:00:01.2.3");
    }

    #[test]
    fn normalizes_documented_examples() {
        let cases = [
            ("1", "00:00:01"),
            ("11", "00:00:11"),
            ("1:11", "00:01:11"),
            ("11:11", "00:11:11"),
            ("1:11:11", "01:11:11"),
            ("11:11:11", "11:11:11"),
            ("11.5", "00:00:11.5"),
            ("11:11.3", "00:11:11.3"),
        ];
        for (input, expected) in cases {
            assert_eq!(parser().normalize_timestamp(input).as_str(), expected, "{input}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for input in ["1", "11.5", "11:11.3", "1:11:11", "3:4:5.250", ""] {
            let once = parser().normalize_timestamp(input);
            let twice = parser().normalize_timestamp(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn normalized_clock_is_eight_chars() {
        for input in ["1", "1:2", "1:2:3", "59:59.999"] {
            let canonical = parser().normalize_timestamp(input);
            let clock_len = canonical.as_str().len() - canonical.fraction().map_or(0, str::len);
            assert_eq!(clock_len, 8, "{input}");
        }
    }

    #[test]
    fn fraction_is_kept_verbatim() {
        let canonical = parser().normalize_timestamp("5.0500");
        assert_eq!(canonical.fraction(), Some(".0500"));
        assert_eq!(canonical.to_string(), "00:00:05.0500");
    }

    #[test]
    fn parse_ignores_normalization() {
        let canonical = parser().normalize_timestamp("11:11.3");
        assert_eq!(
            parser().parse_duration(canonical.as_str()).unwrap(),
            parser().parse_duration("11:11.3").unwrap()
        );
    }
}
