use std::fs::{self, File, FileTimes};
use std::path::Path;
use std::time::SystemTime;

use super::codec::ExifCodec;
use crate::error::{Error, Result};
use crate::filename::ParsedMetadata;

/// Write capture time and GPS position into JPEG bytes, preserving all
/// other EXIF tags and JPEG segments.
///
/// Strategy:
/// 1. Load the existing EXIF tree (empty if the JPEG has none)
/// 2. Set DateTimeOriginal and the four GPS position tags
/// 3. Serialize and insert the segment back into the JPEG stream
pub fn annotate_jpeg<C: ExifCodec + ?Sized>(
    codec: &C,
    jpeg: &[u8],
    metadata: &ParsedMetadata,
) -> Result<Vec<u8>> {
    let mut document = codec.load_segment(jpeg)?;

    let date_time = metadata.capture.exif_datetime();
    if let Some(previous) = document.date_time_original() {
        log::debug!("  Replacing DateTimeOriginal {previous} with {date_time}");
    }
    document.set_date_time_original(&date_time);
    document.set_gps_latitude(&metadata.latitude)?;
    document.set_gps_longitude(&metadata.longitude)?;

    let segment = codec.dump_segment(&document)?;
    codec.insert_segment(&segment, jpeg)
}

/// Annotate a JPEG file in place, then stamp its access and modification
/// times with the capture instant.
///
/// The original content is overwritten; no backup is kept.
pub fn write_file<C: ExifCodec + ?Sized>(
    codec: &C,
    path: &Path,
    metadata: &ParsedMetadata,
) -> Result<()> {
    let file_bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    let output = annotate_jpeg(codec, &file_bytes, metadata)?;
    fs::write(path, &output).map_err(|e| Error::io(path, e))?;

    set_file_times(path, metadata.capture.system_time())
}

/// Set both access and modification time of `path`.
pub fn set_file_times(path: &Path, time: SystemTime) -> Result<()> {
    let file = File::options()
        .write(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;
    let times = FileTimes::new().set_accessed(time).set_modified(time);
    file.set_times(times).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimezoneMode;
    use crate::exif::{LittleExifCodec, TagId, read_exif, sample_jpeg};
    use crate::filename::parse_metadata;
    use crate::timestamp::TimeContext;
    use std::time::Duration;
    use tempfile::TempDir;

    const SAMPLE: &str = "2023-05-19-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg";

    fn sample_metadata(name: &str, mode: TimezoneMode) -> ParsedMetadata {
        parse_metadata(name, mode, &TimeContext::fixed(120)).unwrap()
    }

    // ── annotate_jpeg ────────────────────────────────────────────────

    #[test]
    fn annotate_sets_date_and_gps() {
        let codec = LittleExifCodec;
        let meta = sample_metadata(SAMPLE, TimezoneMode::Local);
        let output = annotate_jpeg(&codec, &sample_jpeg(), &meta).unwrap();

        let doc = codec.load_segment(&output).unwrap();
        assert_eq!(doc.date_time_original(), Some("2023-05-19 14:40:00"));
        assert_eq!(doc.gps_reference(TagId::GPSLatitudeRef), Some("N"));
        assert_eq!(doc.gps_reference(TagId::GPSLongitudeRef), Some("E"));
    }

    #[test]
    fn annotate_is_convergent() {
        let codec = LittleExifCodec;
        let meta = sample_metadata(SAMPLE, TimezoneMode::Local);
        let once = annotate_jpeg(&codec, &sample_jpeg(), &meta).unwrap();
        let twice = annotate_jpeg(&codec, &once, &meta).unwrap();

        let first = codec.load_segment(&once).unwrap();
        let second = codec.load_segment(&twice).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first.date_time_original(), second.date_time_original());
    }

    #[test]
    fn tz_override_changes_stored_time() {
        let codec = LittleExifCodec;
        let plain = annotate_jpeg(&codec, &sample_jpeg(), &sample_metadata(SAMPLE, TimezoneMode::Local))
            .unwrap();
        let shifted = annotate_jpeg(
            &codec,
            &sample_jpeg(),
            &sample_metadata(SAMPLE, TimezoneMode::Override(Some(2))),
        )
        .unwrap();

        assert_eq!(
            codec.load_segment(&plain).unwrap().date_time_original(),
            Some("2023-05-19 14:40:00")
        );
        assert_eq!(
            codec.load_segment(&shifted).unwrap().date_time_original(),
            Some("2023-05-19 16:40:00")
        );
    }

    #[test]
    fn annotate_rejects_non_jpeg() {
        let meta = sample_metadata(SAMPLE, TimezoneMode::Local);
        let err = annotate_jpeg(&LittleExifCodec, b"GIF89a", &meta).unwrap_err();
        assert!(matches!(err, Error::Jpeg(_)));
    }

    // ── write_file ───────────────────────────────────────────────────

    #[test]
    fn write_file_updates_content_and_times() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SAMPLE);
        fs::write(&path, sample_jpeg()).unwrap();

        let meta = sample_metadata(SAMPLE, TimezoneMode::Local);
        write_file(&LittleExifCodec, &path, &meta).unwrap();

        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified, meta.capture.system_time());

        let data = read_exif(&path).unwrap();
        assert!(data.has_gps);
        assert!((data.gps_latitude.unwrap() - 43.367194).abs() < 1e-5);
        assert!((data.gps_longitude.unwrap() - 16.931).abs() < 1e-5);
    }

    #[test]
    fn write_file_southern_western_hemispheres() {
        let name = "2020-02-29-08-15-30-33°51'24.0\"S 151°12'36.0\"W.jpg";
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, sample_jpeg()).unwrap();

        write_file(&LittleExifCodec, &path, &sample_metadata(name, TimezoneMode::Local)).unwrap();

        let data = read_exif(&path).unwrap();
        assert!((data.gps_latitude.unwrap() + 33.856667).abs() < 1e-5);
        assert!((data.gps_longitude.unwrap() + 151.21).abs() < 1e-5);
    }

    #[test]
    fn write_file_missing_path_is_io_error() {
        let meta = sample_metadata(SAMPLE, TimezoneMode::Local);
        let err = write_file(&LittleExifCodec, Path::new("/nonexistent/x.jpg"), &meta).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn set_times_sets_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();

        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_684_510_800);
        set_file_times(&path, when).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), when);
    }
}
