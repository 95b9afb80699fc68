//! File name grammar: `YYYY-MM-DD-HH-MM-SS-<lat><N|S> <lon><E|W>.jpg`.
//!
//! Example: `2023-05-19-16-40-00-43°22'01.9"N 16°55'51.6"E.jpg`

use regex::Regex;
use std::sync::OnceLock;

use crate::config::TimezoneMode;
use crate::coords::DecimalCoordinate;
use crate::error::{Error, Result};
use crate::timestamp::{CaptureTimestamp, TimeContext, capture_timestamp};

static RE_FILENAME: OnceLock<Regex> = OnceLock::new();

const EXPECTED_LAYOUT: &str = "expected YYYY-MM-DD-HH-MM-SS-<lat><N|S> <lon><E|W>.jpg";

/// One coordinate as written in the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DmsToken {
    /// DMS text without the hemisphere letter, e.g. `43°22'01.9"`.
    pub text: String,
    /// Trailing hemisphere letter, taken as-is.
    pub hemisphere: char,
}

/// Raw fields extracted from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM:SS`
    pub time: String,
    pub latitude: DmsToken,
    pub longitude: DmsToken,
}

/// Everything written into a photo, derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedMetadata {
    pub capture: CaptureTimestamp,
    pub latitude: DecimalCoordinate,
    pub longitude: DecimalCoordinate,
}

/// Split a file name into date, time and the two coordinate tokens.
///
/// The whole name must match; nothing is sliced out of a partial match.
pub fn parse_filename(name: &str) -> Result<ParsedFilename> {
    let re = RE_FILENAME.get_or_init(|| {
        Regex::new(
            r"^(?P<date>\d{4}-\d{2}-\d{2})-(?P<time>\d{2}-\d{2}-\d{2})-(?P<lat>\S+)(?P<lat_ref>\S) (?P<lon>\S+)(?P<lon_ref>\S)\.jpg$",
        )
        .unwrap()
    });

    let caps = re.captures(name).ok_or_else(|| Error::Filename {
        name: name.to_string(),
        reason: EXPECTED_LAYOUT.to_string(),
    })?;

    let token = |text: &str, letter: &str| DmsToken {
        text: text.to_string(),
        hemisphere: letter.chars().next().unwrap_or_default(),
    };

    Ok(ParsedFilename {
        date: caps["date"].to_string(),
        time: caps["time"].replace('-', ":"),
        latitude: token(&caps["lat"], &caps["lat_ref"]),
        longitude: token(&caps["lon"], &caps["lon_ref"]),
    })
}

impl ParsedFilename {
    /// Resolve the capture timestamp and convert both coordinates.
    pub fn metadata(&self, mode: TimezoneMode, ctx: &TimeContext) -> Result<ParsedMetadata> {
        let capture = capture_timestamp(&self.date, &self.time, mode, ctx)?;
        let latitude = DecimalCoordinate::latitude(&self.latitude.text, self.latitude.hemisphere)?;
        let longitude =
            DecimalCoordinate::longitude(&self.longitude.text, self.longitude.hemisphere)?;

        Ok(ParsedMetadata {
            capture,
            latitude,
            longitude,
        })
    }
}

/// [`parse_filename`] followed by [`ParsedFilename::metadata`].
pub fn parse_metadata(name: &str, mode: TimezoneMode, ctx: &TimeContext) -> Result<ParsedMetadata> {
    parse_filename(name)?.metadata(mode, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CoordinateRef;
    use chrono::NaiveDate;

    const SAMPLE: &str = "2023-05-19-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg";

    // ── parse_filename ───────────────────────────────────────────────

    #[test]
    fn parse_sample_name() {
        let parsed = parse_filename(SAMPLE).unwrap();
        assert_eq!(parsed.date, "2023-05-19");
        assert_eq!(parsed.time, "16:40:00");
        assert_eq!(parsed.latitude.text, "43°22'01.9\"");
        assert_eq!(parsed.latitude.hemisphere, 'N');
        assert_eq!(parsed.longitude.text, "16°55'51.6\"");
        assert_eq!(parsed.longitude.hemisphere, 'E');
    }

    #[test]
    fn parse_rejects_wrong_layout() {
        for name in [
            "IMG_0001.jpg",
            "2023-05-19-16-40-00.jpg",
            "2023-05-19-16-40-00-43°22'01.9\"N16°55'51.6\"E.jpg",
            "2023-05-19-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpeg",
            "2023-05-19 16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg",
        ] {
            assert!(
                matches!(parse_filename(name), Err(Error::Filename { .. })),
                "expected failure for {name}"
            );
        }
    }

    // ── metadata ─────────────────────────────────────────────────────

    #[test]
    fn sample_metadata() {
        let ctx = TimeContext::fixed(120);
        let meta = parse_metadata(SAMPLE, TimezoneMode::Local, &ctx).unwrap();

        let expected = NaiveDate::from_ymd_opt(2023, 5, 19)
            .unwrap()
            .and_hms_opt(16, 40, 0)
            .unwrap();
        assert_eq!(meta.capture.local(), expected);
        assert_eq!(meta.latitude.reference, CoordinateRef::North);
        assert!((meta.latitude.degrees - 43.367194).abs() < 1e-6);
        assert_eq!(meta.longitude.reference, CoordinateRef::East);
        assert!((meta.longitude.degrees - 16.931).abs() < 1e-6);
    }

    #[test]
    fn unknown_hemisphere_letters_fall_back() {
        let ctx = TimeContext::fixed(0);
        let name = "2023-05-19-16-40-00-43°22'01.9\"X 16°55'51.6\"X.jpg";
        let meta = parse_metadata(name, TimezoneMode::Local, &ctx).unwrap();
        assert_eq!(meta.latitude.reference.as_str(), "S");
        assert_eq!(meta.longitude.reference.as_str(), "W");
    }

    #[test]
    fn missing_hemisphere_breaks_dms() {
        let ctx = TimeContext::fixed(0);
        let name = "2023-05-19-16-40-00-43°22'01.9\" 16°55'51.6\"E.jpg";
        let err = parse_metadata(name, TimezoneMode::Local, &ctx).unwrap_err();
        assert!(matches!(err, Error::Coordinate(_)), "got {err:?}");
    }

    #[test]
    fn impossible_date_is_timestamp_error() {
        let ctx = TimeContext::fixed(0);
        let name = "2023-13-40-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg";
        let err = parse_metadata(name, TimezoneMode::Local, &ctx).unwrap_err();
        assert!(matches!(err, Error::Timestamp(_)), "got {err:?}");
    }
}
