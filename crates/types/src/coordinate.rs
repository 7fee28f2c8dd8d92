use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while reading coordinates out of registry responses.
#[derive(Debug, thiserror::Error)]
pub enum CoordinateError {
    #[error("invalid base-16 coordinate '{value}'")]
    InvalidHex { value: String },
    #[error("coordinate arrays differ in length: {xs} x values, {ys} y values")]
    LengthMismatch { xs: usize, ys: usize },
}

/// Position of a LAND parcel on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i64,
    pub y: i64,
}

impl Coordinate {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Coordinate {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Parse one base-16 coordinate component.
///
/// Accepts an optional leading `-` and an optional `0x` prefix, in that
/// order (`-0x1f`, `0x1f`, `1f`).
pub fn parse_hex_component(value: &str) -> Result<i64, CoordinateError> {
    let invalid = || CoordinateError::InvalidHex {
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(invalid());
    }

    let magnitude = i128::from_str_radix(digits, 16).map_err(|_| invalid())?;
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| invalid())
}

/// Render a coordinate component in the base-16 form accepted by
/// [`parse_hex_component`].
pub fn format_hex_component(value: i64) -> String {
    if value < 0 {
        format!("-0x{:x}", value.unsigned_abs())
    } else {
        format!("0x{:x}", value)
    }
}

/// Zip two parallel base-16 arrays into coordinates, pairing by index.
pub fn zip_hex_coordinates(
    xs: &[String],
    ys: &[String],
) -> Result<Vec<Coordinate>, CoordinateError> {
    if xs.len() != ys.len() {
        return Err(CoordinateError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }

    xs.iter()
        .zip(ys)
        .map(|(x, y)| -> Result<Coordinate, CoordinateError> {
            Ok(Coordinate::new(parse_hex_component(x)?, parse_hex_component(y)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_hex() {
        assert_eq!(parse_hex_component("0x1f").unwrap(), 31);
        assert_eq!(parse_hex_component("1F").unwrap(), 31);
        assert_eq!(parse_hex_component("-0x96").unwrap(), -150);
        assert_eq!(parse_hex_component("0").unwrap(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_hex_component("").is_err());
        assert!(parse_hex_component("0x").is_err());
        assert!(parse_hex_component("zz").is_err());
    }

    #[test]
    fn rejects_stacked_or_plus_signs() {
        assert!(parse_hex_component("--5").is_err());
        assert!(parse_hex_component("+5").is_err());
        assert!(parse_hex_component("-+5").is_err());
        assert!(parse_hex_component("-0x-5").is_err());
    }

    #[test]
    fn format_matches_parse() {
        for value in [-150, -1, 0, 1, 150, i64::MAX, i64::MIN] {
            assert_eq!(parse_hex_component(&format_hex_component(value)).unwrap(), value);
        }
    }

    #[test]
    fn zips_by_index() {
        let xs = vec!["0x1".to_string(), "-0x2".to_string()];
        let ys = vec!["0x3".to_string(), "0x4".to_string()];
        let coords = zip_hex_coordinates(&xs, &ys).unwrap();
        assert_eq!(coords, vec![Coordinate::new(1, 3), Coordinate::new(-2, 4)]);
    }

    #[test]
    fn zip_rejects_uneven_arrays() {
        let xs = vec!["0x1".to_string()];
        let err = zip_hex_coordinates(&xs, &[]).unwrap_err();
        assert!(matches!(err, CoordinateError::LengthMismatch { xs: 1, ys: 0 }));
    }

    #[test]
    fn displays_as_pair() {
        assert_eq!(Coordinate::new(-3, 4).to_string(), "-3,4");
    }
}
