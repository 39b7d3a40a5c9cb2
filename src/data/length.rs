//! Physical lengths for image dimensions.
//!
//! Image sizes are given in physical units ("10cm", "4in") and converted to
//! pixels at a fixed resolution when the canvas is allocated.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default raster resolution in dots per inch.
pub const DEFAULT_DPI: f64 = 96.0;

const POINTS_PER_INCH: f64 = 72.0;

/// Suffix to points multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("inch", POINTS_PER_INCH),
    ("in", POINTS_PER_INCH),
    ("cm", POINTS_PER_INCH / 2.54),
    ("mm", POINTS_PER_INCH / 25.4),
    ("pt", 1.0),
];

/// A physical length, stored in typographic points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Length {
    points: f64,
}

impl Length {
    pub fn from_points(points: f64) -> Self {
        Self { points }
    }

    pub fn from_inches(inches: f64) -> Self {
        Self::from_points(inches * POINTS_PER_INCH)
    }

    pub fn from_centimeters(cm: f64) -> Self {
        Self::from_points(cm * POINTS_PER_INCH / 2.54)
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn inches(&self) -> f64 {
        self.points / POINTS_PER_INCH
    }

    /// Convert to a whole number of pixels at `dpi`.
    ///
    /// Fails with [`Error::InvalidDimension`] if the result is less than one
    /// pixel or does not fit a `u32`.
    pub fn to_pixels(&self, dpi: f64) -> Result<u32> {
        let px = (self.inches() * dpi).round();
        if !px.is_finite() || px < 1.0 || px > f64::from(u32::MAX) {
            return Err(Error::InvalidDimension {
                input: self.to_string(),
                reason: format!("resolves to {px} pixels at {dpi} dpi"),
            });
        }
        Ok(px as u32)
    }
}

/// Parse lengths like "10cm", "4in", "4inch", "25mm", "300pt" or a bare
/// number of points.
pub fn parse_length(s: &str) -> Result<Length> {
    let input = s.trim();
    let invalid = |reason: String| Error::InvalidDimension {
        input: s.to_string(),
        reason,
    };

    let (number, multiplier) = UNITS
        .iter()
        .find_map(|(suffix, multiplier)| input.strip_suffix(suffix).map(|n| (n, *multiplier)))
        .unwrap_or((input, 1.0));

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|e| invalid(format!("not a number ({e})")))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("must be positive".to_string()));
    }

    Ok(Length::from_points(value * multiplier))
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_length(s)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}pt", self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_centimeters() {
        let l = parse_length("10cm").unwrap();
        assert!((l.inches() - 10.0 / 2.54).abs() < 1e-9);
        assert_eq!(l.to_pixels(DEFAULT_DPI).unwrap(), 378);
    }

    #[test]
    fn test_parse_inches() {
        assert_eq!(parse_length("4in").unwrap(), Length::from_inches(4.0));
        assert_eq!(parse_length("4inch").unwrap(), Length::from_inches(4.0));
        assert_eq!(parse_length("4in").unwrap().to_pixels(100.0).unwrap(), 400);
    }

    #[test]
    fn test_parse_bare_number_is_points() {
        assert_eq!(parse_length("72").unwrap(), Length::from_inches(1.0));
        assert_eq!(parse_length("36pt").unwrap().to_pixels(96.0).unwrap(), 48);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_length("abc").unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { .. }));
    }

    #[test]
    fn test_parse_rejects_non_positive() {
        assert!(matches!(parse_length("0cm"), Err(Error::InvalidDimension { .. })));
        assert!(matches!(parse_length("-3in"), Err(Error::InvalidDimension { .. })));
    }

    #[test]
    fn test_sub_pixel_length_rejected() {
        let tiny = Length::from_points(0.1);
        assert!(matches!(tiny.to_pixels(DEFAULT_DPI), Err(Error::InvalidDimension { .. })));
    }
}
