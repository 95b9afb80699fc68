//! # write-exif
//!
//! Batch-write EXIF capture time and GPS position into JPEG photos whose file
//! names follow the layout
//!
//! ```text
//! YYYY-MM-DD-HH-MM-SS-<deg>°<min>'<sec>"<N|S> <deg>°<min>'<sec>"<E|W>.jpg
//! 2023-05-19-16-40-00-43°22'01.9"N 16°55'51.6"E.jpg
//! ```
//!
//! Each file gets `DateTimeOriginal`, `GPSLatitudeRef`, `GPSLatitude`,
//! `GPSLongitudeRef` and `GPSLongitude` written into its EXIF segment (all
//! other tags are kept), and its access/modification times are set to the
//! capture instant.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use write_exif::config::Config;
//! use write_exif::exif::LittleExifCodec;
//! use write_exif::pipeline;
//! use write_exif::timestamp::TimeContext;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config {
//!         directory: "./photos".into(),
//!         ..Config::default()
//!     };
//!
//!     let summary = pipeline::run(&config, &TimeContext::host(), &LittleExifCodec)?;
//!     println!("{} photos annotated", summary.succeeded());
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! ```rust,no_run
//! use write_exif::config::TimezoneMode;
//! use write_exif::exif::{write_file, LittleExifCodec};
//! use write_exif::filename::parse_metadata;
//! use write_exif::timestamp::TimeContext;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let name = "2023-05-19-16-40-00-43°22'01.9\"N 16°55'51.6\"E.jpg";
//!     let meta = parse_metadata(name, TimezoneMode::Local, &TimeContext::host())?;
//!     println!("Taken {} at {:.6}", meta.capture.local(), meta.latitude.signed());
//!
//!     write_file(&LittleExifCodec, Path::new(name), &meta)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`filename`] — file name grammar
//! - [`coords`] — DMS ⇄ decimal degrees ⇄ EXIF rationals
//! - [`timestamp`] — capture time and the `--tz` shift
//! - [`exif`] — EXIF codec, writer and reader
//! - [`pipeline`] — directory listing and per-file processing
//! - [`config`] — run configuration
//! - [`error`] — error type

pub mod config;
pub mod coords;
pub mod error;
pub mod exif;
pub mod filename;
pub mod pipeline;
pub mod timestamp;

pub use error::{Error, Result};
