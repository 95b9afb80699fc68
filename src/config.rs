use std::path::PathBuf;

/// Top-level configuration for a `write-exif` run.
///
/// Built from the command line by the binary; library callers construct it
/// directly.
///
/// ```rust
/// use write_exif::config::{Config, ErrorPolicy, TimezoneMode};
///
/// let config = Config {
///     directory: "./photos".into(),
///     timezone: TimezoneMode::Override(Some(2)),
///     error_policy: ErrorPolicy::Continue,
/// };
/// assert!(config.timezone.is_override());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory scanned (non-recursively) for `.jpg` files.
    pub directory: PathBuf,
    /// How the wall-clock time in the file name is interpreted.
    pub timezone: TimezoneMode,
    /// What to do when a single file fails.
    pub error_policy: ErrorPolicy,
}

/// Interpretation of the capture time embedded in a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimezoneMode {
    /// The file name time is local wall-clock time (no `--tz`).
    #[default]
    Local,
    /// Shift the file name time by a whole number of hours (`--tz`,
    /// `--tz=<hours>`). `None` uses the host's current offset in hours.
    Override(Option<i32>),
}

impl TimezoneMode {
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override(_))
    }
}

/// Behaviour when processing a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first failing file (nothing after it is touched).
    #[default]
    Abort,
    /// Log the failure, carry on with the next file and report at the end.
    Continue,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            timezone: TimezoneMode::default(),
            error_policy: ErrorPolicy::default(),
        }
    }
}
