use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

use write_exif::config::{Config, ErrorPolicy, TimezoneMode};
use write_exif::exif::LittleExifCodec;
use write_exif::pipeline;
use write_exif::timestamp::TimeContext;

#[derive(Parser, Debug)]
#[command(
    name = "write-exif",
    version,
    about = "Write EXIF capture time and GPS position into JPEG photos from their file names",
    override_usage = "write-exif [directory] [--tz]"
)]
struct Cli {
    /// Directory to scan for .jpg files (not recursive)
    #[arg(value_name = "directory", default_value = ".")]
    directory: PathBuf,

    /// Shift file name times by <hours> (default: this machine's UTC offset)
    #[arg(long, value_name = "hours", num_args = 0..=1, require_equals = true)]
    tz: Option<Option<i32>>,

    /// Keep going after a file fails instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            directory: self.directory.clone(),
            timezone: match self.tz {
                Some(hours) => TimezoneMode::Override(hours),
                None => TimezoneMode::Local,
            },
            error_policy: if self.keep_going {
                ErrorPolicy::Continue
            } else {
                ErrorPolicy::Abort
            },
        }
    }
}

/// Help wins over everything else on the command line, valid or not.
fn wants_help(args: impl IntoIterator<Item = OsString>) -> bool {
    args.into_iter().skip(1).any(|a| a == "-h" || a == "--help")
}

fn main() -> Result<()> {
    if wants_help(std::env::args_os()) {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = cli.config();
    let ctx = TimeContext::host();
    if config.timezone.is_override() {
        log::debug!("Host UTC offset: {} min", ctx.host_utc_offset_minutes);
    }

    let summary = pipeline::run(&config, &ctx, &LittleExifCodec)
        .with_context(|| format!("Failed to process {}", config.directory.display()))?;

    // JSON output
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary.reports)?);
    }

    let total = summary.reports.len();
    let failed = summary.failed();
    log::info!("Done: {} succeeded, {failed} failed out of {total} images", summary.succeeded());

    if failed > 0 {
        anyhow::bail!("{failed} of {total} file(s) could not be processed");
    }

    Ok(())
}
