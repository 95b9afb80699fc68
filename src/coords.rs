//! Degrees-minutes-seconds parsing and EXIF rational encoding.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Seconds are stored with four decimal digits of precision.
pub const SECONDS_DENOMINATOR: u32 = 10_000;

static RE_DMS: OnceLock<Regex> = OnceLock::new();

/// An unsigned EXIF RATIONAL (numerator / denominator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExifRational {
    pub numerator: u32,
    pub denominator: u32,
}

impl ExifRational {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// GPS reference letter stored next to a latitude or longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateRef {
    North,
    South,
    East,
    West,
}

impl CoordinateRef {
    /// `N` is north; every other letter reads as south.
    pub fn latitude(letter: char) -> Self {
        if letter == 'N' { Self::North } else { Self::South }
    }

    /// `E` is east; every other letter reads as west.
    pub fn longitude(letter: char) -> Self {
        if letter == 'E' { Self::East } else { Self::West }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "N",
            Self::South => "S",
            Self::East => "E",
            Self::West => "W",
        }
    }

    fn is_negative(&self) -> bool {
        matches!(self, Self::South | Self::West)
    }
}

impl fmt::Display for CoordinateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coordinate in decimal degrees together with its hemisphere.
///
/// `degrees` is the magnitude read from the DMS text; the sign lives in
/// `reference` exactly as EXIF stores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalCoordinate {
    pub degrees: f64,
    pub reference: CoordinateRef,
}

impl DecimalCoordinate {
    /// Build a latitude from DMS text and its trailing hemisphere letter.
    pub fn latitude(dms: &str, letter: char) -> Result<Self> {
        Ok(Self {
            degrees: dms_to_decimal(dms)?,
            reference: CoordinateRef::latitude(letter),
        })
    }

    /// Build a longitude from DMS text and its trailing hemisphere letter.
    pub fn longitude(dms: &str, letter: char) -> Result<Self> {
        Ok(Self {
            degrees: dms_to_decimal(dms)?,
            reference: CoordinateRef::longitude(letter),
        })
    }

    /// Signed decimal degrees (negative for south and west).
    pub fn signed(&self) -> f64 {
        if self.reference.is_negative() {
            -self.degrees
        } else {
            self.degrees
        }
    }

    pub fn to_exif(&self) -> [ExifRational; 3] {
        decimal_to_exif(self.degrees)
    }
}

/// Parse `<deg>°<min>'<sec>[.<frac>]"` into decimal degrees.
///
/// Only the first DMS group found in `dms` is used; text around it is ignored.
pub fn dms_to_decimal(dms: &str) -> Result<f64> {
    let re = RE_DMS.get_or_init(|| Regex::new(r#"(\d+)°(\d+)'(\d+(?:\.\d+)?)""#).unwrap());
    let caps = re
        .captures(dms)
        .ok_or_else(|| Error::Coordinate(dms.to_string()))?;

    let number = |idx: usize| -> Result<f64> {
        caps[idx]
            .parse::<f64>()
            .map_err(|_| Error::Coordinate(dms.to_string()))
    };

    let degrees = number(1)?;
    let minutes = number(2)?;
    let seconds = number(3)?;
    Ok(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Convert decimal degrees to the three EXIF rationals (deg, min, sec).
///
/// The sign is dropped. Seconds keep four decimals, rounded half away from
/// zero, so the result is accurate to 1/10000 of an arc-second.
pub fn decimal_to_exif(decimal: f64) -> [ExifRational; 3] {
    let absolute = decimal.abs();
    let degrees = absolute.floor();
    let minutes = ((absolute - degrees) * 60.0).floor();
    let seconds = ((absolute - degrees - minutes / 60.0) * 3600.0 * SECONDS_DENOMINATOR as f64).round();

    [
        ExifRational::new(degrees as u32, 1),
        ExifRational::new(minutes as u32, 1),
        ExifRational::new(seconds as u32, SECONDS_DENOMINATOR),
    ]
}

/// Render decimal degrees as DMS text that [`dms_to_decimal`] accepts.
pub fn decimal_to_dms(decimal: f64) -> String {
    let [deg, min, sec] = decimal_to_exif(decimal);
    format!("{}°{}'{:.4}\"", deg.numerator, min.numerator, sec.to_f64())
}
