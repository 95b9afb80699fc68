use nom_exif::*;
use std::path::Path;

use crate::error::{Error, Result};

/// Capture time and position a photo currently carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    pub date_time_original: Option<String>,
    pub has_gps: bool,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
}

/// Read existing EXIF data from an image file.
///
/// A file without EXIF yields [`ExifData::default`]; only failing to open the
/// file is an error.
pub fn read_exif(path: &Path) -> Result<ExifData> {
    std::fs::metadata(path).map_err(|e| Error::io(path, e))?;

    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path)
        .map_err(|e| Error::Exif(format!("failed to open {}: {e}", path.display())))?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(ExifData::default());
        }
    };

    // Parse GPS info before converting to Exif (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();
    let exif: Exif = iter.into();

    let mut data = ExifData {
        date_time_original: exif.get(ExifTag::DateTimeOriginal).and_then(entry_to_string),
        ..ExifData::default()
    };

    if let Some(gps) = gps_info {
        data.has_gps = true;
        data.gps_latitude = Some(latlng_to_decimal(&gps.latitude, gps.latitude_ref));
        data.gps_longitude = Some(latlng_to_decimal(&gps.longitude, gps.longitude_ref));
    }

    Ok(data)
}

fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    if s.is_empty() { None } else { Some(s) }
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to signed decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    let degrees = latlng.0.0 as f64 / latlng.0.1 as f64;
    let minutes = latlng.1.0 as f64 / latlng.1.1 as f64;
    let seconds = latlng.2.0 as f64 / latlng.2.1 as f64;

    let coord = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference == 'S' || reference == 'W' {
        -coord
    } else {
        coord
    }
}
