use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{Config, ErrorPolicy};
use crate::coords;
use crate::error::{Error, Result};
use crate::exif::{self, ExifCodec};
use crate::filename;
use crate::timestamp::TimeContext;

/// Only names ending in this exact (case-sensitive) suffix are processed.
pub const JPEG_SUFFIX: &str = ".jpg";

/// Outcome of processing one photo.
///
/// Serialized as-is for `--json` output.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    /// Value written to `DateTimeOriginal`.
    pub date_time_original: Option<String>,
    pub latitude_ref: Option<&'static str>,
    pub latitude: Option<f64>,
    pub longitude_ref: Option<&'static str>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
}

/// Totals for a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.error.is_some()).count()
    }
}

/// List the `.jpg` files directly inside `dir`, sorted by name.
///
/// Sub-directories are neither entered nor returned, whatever their name.
///
/// ```rust,no_run
/// use write_exif::pipeline::collect_jpegs;
///
/// let photos = collect_jpegs("./photos".as_ref()).unwrap();
/// println!("Found {} photos", photos.len());
/// ```
pub fn collect_jpegs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(source) => Error::io(path, source),
                None => Error::Io {
                    path,
                    source: std::io::Error::other("directory walk failed"),
                },
            }
        })?;

        if entry.file_type().is_dir() {
            continue;
        }
        if is_jpeg_name(&entry.file_name().to_string_lossy()) {
            images.push(entry.into_path());
        } else {
            log::debug!("Skipping non-JPEG entry: {}", entry.path().display());
        }
    }

    Ok(images)
}

fn is_jpeg_name(name: &str) -> bool {
    name.ends_with(JPEG_SUFFIX)
}

/// Parse one file's name and write the derived metadata into it.
pub fn process_file<C: ExifCodec + ?Sized>(
    path: &Path,
    config: &Config,
    ctx: &TimeContext,
    codec: &C,
) -> Result<FileReport> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let metadata = filename::parse_metadata(&name, config.timezone, ctx)?;
    log::debug!(
        "  Capture {} | {}{} | {}{}",
        metadata.capture.local(),
        coords::decimal_to_dms(metadata.latitude.degrees),
        metadata.latitude.reference,
        coords::decimal_to_dms(metadata.longitude.degrees),
        metadata.longitude.reference
    );

    if log::log_enabled!(log::Level::Debug) {
        match exif::read_exif(path) {
            Ok(existing) if existing.has_gps => log::debug!(
                "  Existing GPS {:?}, {:?} will be replaced",
                existing.gps_latitude,
                existing.gps_longitude
            ),
            Ok(_) => {}
            Err(e) => log::debug!("  Could not read existing EXIF: {e}"),
        }
    }

    exif::write_file(codec, path, &metadata)?;

    Ok(FileReport {
        path: path.to_path_buf(),
        date_time_original: Some(metadata.capture.exif_datetime()),
        latitude_ref: Some(metadata.latitude.reference.as_str()),
        latitude: Some(metadata.latitude.signed()),
        longitude_ref: Some(metadata.longitude.reference.as_str()),
        longitude: Some(metadata.longitude.signed()),
        error: None,
    })
}

/// Process every `.jpg` in the configured directory, one after another.
///
/// With [`ErrorPolicy::Abort`] the first failure is returned and later files
/// are left untouched. With [`ErrorPolicy::Continue`] failures are recorded in
/// the summary and processing carries on.
pub fn run<C: ExifCodec + ?Sized>(config: &Config, ctx: &TimeContext, codec: &C) -> Result<RunSummary> {
    let images = collect_jpegs(&config.directory)?;
    let total = images.len();
    log::info!("Found {total} JPEG file(s) in {}", config.directory.display());

    let mut summary = RunSummary::default();

    for (i, image_path) in images.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, image_path.display());

        match process_file(image_path, config, ctx, codec) {
            Ok(report) => {
                log::info!(
                    "  Wrote: {} | {} {} | {} {}",
                    report.date_time_original.as_deref().unwrap_or_default(),
                    report.latitude_ref.unwrap_or_default(),
                    report.latitude.map(f64::abs).unwrap_or_default(),
                    report.longitude_ref.unwrap_or_default(),
                    report.longitude.map(f64::abs).unwrap_or_default(),
                );
                summary.reports.push(report);
            }
            Err(e) if config.error_policy == ErrorPolicy::Continue => {
                log::error!("  Error: {e}");
                summary.reports.push(FileReport {
                    path: image_path.clone(),
                    error: Some(e.to_string()),
                    ..FileReport::default()
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimezoneMode;
    use crate::exif::{LittleExifCodec, sample_jpeg};
    use std::fs;
    use tempfile::TempDir;

    const GOOD: &str = "2023-05-19-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg";
    const GOOD_2: &str = "2024-07-01-09-05-10-48°51'29.6\"N 2°17'40.2\"E.jpg";

    fn config(dir: &Path, error_policy: ErrorPolicy) -> Config {
        Config {
            directory: dir.to_path_buf(),
            timezone: TimezoneMode::Local,
            error_policy,
        }
    }

    // ── is_jpeg_name ─────────────────────────────────────────────────

    #[test]
    fn jpeg_suffix_is_case_sensitive() {
        assert!(is_jpeg_name("photo.jpg"));
        assert!(!is_jpeg_name("photo.JPG"));
        assert!(!is_jpeg_name("photo.jpeg"));
        assert!(!is_jpeg_name("photo.png"));
        assert!(!is_jpeg_name("jpg"));
    }

    // ── collect_jpegs ────────────────────────────────────────────────

    #[test]
    fn collect_skips_directories_and_other_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("a.jpg"), b"fake").unwrap();
        fs::write(dir.path().join("notes.txt"), b"fake").unwrap();
        fs::create_dir(dir.path().join("folder.jpg")).unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.jpg"), b"fake").unwrap();

        let images = collect_jpegs(dir.path()).unwrap();
        assert_eq!(
            images,
            vec![dir.path().join("a.jpg"), dir.path().join("b.jpg")]
        );
    }

    #[test]
    fn collect_missing_directory_fails() {
        let err = collect_jpegs(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    // ── run ──────────────────────────────────────────────────────────

    #[test]
    fn run_processes_all_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(GOOD), sample_jpeg()).unwrap();
        fs::write(dir.path().join(GOOD_2), sample_jpeg()).unwrap();

        let summary = run(
            &config(dir.path(), ErrorPolicy::Abort),
            &TimeContext::fixed(0),
            &LittleExifCodec,
        )
        .unwrap();

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 0);
        let first = &summary.reports[0];
        assert_eq!(first.date_time_original.as_deref(), Some("2023-05-19 16:40:00"));
        assert_eq!(first.latitude_ref, Some("N"));
        assert_eq!(summary.reports[1].date_time_original.as_deref(), Some("2024-07-01 09:05:10"));
    }

    #[test]
    fn abort_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        // "0000-..." sorts before the valid name
        let bad = dir.path().join("0000-bad-name.jpg");
        fs::write(&bad, sample_jpeg()).unwrap();
        let good = dir.path().join(GOOD);
        let original = sample_jpeg();
        fs::write(&good, &original).unwrap();

        let err = run(
            &config(dir.path(), ErrorPolicy::Abort),
            &TimeContext::fixed(0),
            &LittleExifCodec,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Filename { .. }));
        assert_eq!(fs::read(&good).unwrap(), original);
    }

    #[test]
    fn continue_records_failures() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0000-bad-name.jpg"), sample_jpeg()).unwrap();
        fs::write(dir.path().join(GOOD), sample_jpeg()).unwrap();
        fs::write(dir.path().join(GOOD_2), b"not a jpeg").unwrap();

        let summary = run(
            &config(dir.path(), ErrorPolicy::Continue),
            &TimeContext::fixed(0),
            &LittleExifCodec,
        )
        .unwrap();

        assert_eq!(summary.reports.len(), 3);
        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 2);
        assert!(summary.reports[0].error.as_deref().unwrap().contains("does not match"));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = FileReport {
            path: PathBuf::from("a.jpg"),
            date_time_original: Some("2023-05-19 16:40:00".to_string()),
            latitude_ref: Some("N"),
            latitude: Some(43.5),
            longitude_ref: Some("W"),
            longitude: Some(-16.25),
            error: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["latitude_ref"], "N");
        assert_eq!(json["longitude"], -16.25);
        assert!(json["error"].is_null());
    }
}
