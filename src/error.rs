use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while annotating a photo.
///
/// Every variant is fatal for the file being processed. Whether it also ends
/// the whole run is decided by [`ErrorPolicy`](crate::config::ErrorPolicy).
#[derive(Error, Debug)]
pub enum Error {
    /// The file name does not follow `YYYY-MM-DD-HH-MM-SS-<lat> <lon>.jpg`.
    #[error("File name {name:?} does not match the expected layout: {reason}")]
    Filename { name: String, reason: String },

    /// A coordinate token is not of the form `<deg>°<min>'<sec>"`.
    #[error("Invalid DMS coordinate {0:?}")]
    Coordinate(String),

    /// Date and time fields do not describe a real calendar instant.
    #[error("Invalid capture time {0:?}")]
    Timestamp(String),

    /// The bytes are not a parseable JPEG stream.
    #[error("Failed to parse JPEG: {0}")]
    Jpeg(String),

    /// The EXIF segment is corrupt or could not be serialized.
    #[error("EXIF error: {0}")]
    Exif(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
