//! Capture-time computation for file-name timestamps.
//!
//! The file name carries a naive wall-clock time. It is resolved against the
//! UTC offset in force on the capture date, looked up through [`TimeContext`]
//! so callers (and tests) can pin the zone instead of depending on the
//! machine's.
//!
//! The `--tz` shift is an approximation tied to the host's *current* offset,
//! not a lookup in a timezone database: the hour shift defaults to today's
//! offset even for photos taken in the other DST period.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, TimeDelta, TimeZone, Timelike, Utc,
};
use std::time::SystemTime;

use crate::config::TimezoneMode;
use crate::error::{Error, Result};

/// Layout written to `DateTimeOriginal`.
pub const EXIF_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FILENAME_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Host clock facts the timestamp computation depends on.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    /// Minutes east of UTC right now (e.g. `120` for CEST, `-300` for EST).
    /// Only the `--tz` hour shift uses it.
    pub host_utc_offset_minutes: i32,
    zone: LocalZone,
}

/// Where the offset of a given local wall-clock time comes from.
#[derive(Debug, Clone, Copy)]
enum LocalZone {
    Host,
    Fixed(i32),
    Rule(fn(&NaiveDateTime) -> i32),
}

impl TimeContext {
    /// The running machine's zone, with today's offset for `--tz`.
    pub fn host() -> Self {
        Self {
            host_utc_offset_minutes: Local::now().offset().local_minus_utc() / 60,
            zone: LocalZone::Host,
        }
    }

    /// One offset for every date.
    pub fn fixed(host_utc_offset_minutes: i32) -> Self {
        Self {
            host_utc_offset_minutes,
            zone: LocalZone::Fixed(host_utc_offset_minutes),
        }
    }

    /// Today's offset plus a rule giving the offset (in minutes) in force
    /// at any local wall-clock time.
    pub fn with_zone_rule(host_utc_offset_minutes: i32, rule: fn(&NaiveDateTime) -> i32) -> Self {
        Self {
            host_utc_offset_minutes,
            zone: LocalZone::Rule(rule),
        }
    }

    /// UTC offset in minutes in force at the local wall-clock time `naive`.
    pub fn offset_minutes_at(&self, naive: &NaiveDateTime) -> Result<i32> {
        match self.zone {
            LocalZone::Host => host_offset_minutes_at(naive),
            LocalZone::Fixed(minutes) => Ok(minutes),
            LocalZone::Rule(rule) => Ok(rule(naive)),
        }
    }

    fn offset_at(&self, naive: &NaiveDateTime) -> Result<FixedOffset> {
        let minutes = self.offset_minutes_at(naive)?;
        FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            Error::Timestamp(format!("UTC offset of {minutes} minutes is out of range"))
        })
    }
}

impl Default for TimeContext {
    fn default() -> Self {
        Self::host()
    }
}

fn host_offset_minutes_at(naive: &NaiveDateTime) -> Result<i32> {
    let offset = match Local.offset_from_local_datetime(naive) {
        LocalResult::Single(offset) => offset,
        // Repeated by a backward transition: the earlier instant wins
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Skipped by a forward transition: use the offset before it
        LocalResult::None => TimeDelta::try_hours(3)
            .and_then(|gap| naive.checked_sub_signed(gap))
            .and_then(|before| Local.offset_from_local_datetime(&before).earliest())
            .ok_or_else(|| Error::Timestamp(format!("no local UTC offset for {naive}")))?,
    };
    Ok(offset.local_minus_utc() / 60)
}

/// The instant a photo was taken, as local wall-clock time plus offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTimestamp(DateTime<FixedOffset>);

impl CaptureTimestamp {
    /// Wall-clock time in the local zone.
    pub fn local(&self) -> NaiveDateTime {
        self.0.naive_local()
    }

    pub fn as_datetime(&self) -> DateTime<FixedOffset> {
        self.0
    }

    /// `DateTimeOriginal` value: the instant rendered in UTC as
    /// `YYYY-MM-DD HH:MM:SS`, no fraction, no zone suffix.
    pub fn exif_datetime(&self) -> String {
        self.0.with_timezone(&Utc).format(EXIF_DATETIME_FORMAT).to_string()
    }

    /// Same instant, for the file's access and modification times.
    pub fn system_time(&self) -> SystemTime {
        SystemTime::from(self.0)
    }
}

/// Combine `YYYY-MM-DD` and `HH:MM:SS` into a capture timestamp.
///
/// In [`TimezoneMode::Override`] the hour becomes `hour + target`, truncated
/// toward zero, where `target` is the given whole hours or the host's
/// current offset in fractional hours. Then the minute part of the offset in
/// force at the shifted time is added.
pub fn capture_timestamp(
    date: &str,
    time: &str,
    mode: TimezoneMode,
    ctx: &TimeContext,
) -> Result<CaptureTimestamp> {
    let text = format!("{date} {time}");
    let mut naive = NaiveDateTime::parse_from_str(&text, FILENAME_DATETIME_FORMAT)
        .map_err(|_| Error::Timestamp(text.clone()))?;

    if let TimezoneMode::Override(target_hours) = mode {
        let hour = naive.hour() as f64;
        let shifted_hour = match target_hours {
            Some(hours) => hour + hours as f64,
            None => (hour + ctx.host_utc_offset_minutes as f64 / 60.0).trunc(),
        };
        naive = TimeDelta::try_hours((shifted_hour - hour) as i64)
            .and_then(|shift| naive.checked_add_signed(shift))
            .ok_or_else(|| Error::Timestamp(text.clone()))?;

        let minute_part = ctx.offset_minutes_at(&naive)? % 60;
        naive = TimeDelta::try_minutes(minute_part as i64)
            .and_then(|shift| naive.checked_add_signed(shift))
            .ok_or_else(|| Error::Timestamp(text.clone()))?;
        log::debug!("Shifted capture time for --tz: {naive}");
    }

    let datetime = ctx
        .offset_at(&naive)?
        .from_local_datetime(&naive)
        .single()
        .ok_or(Error::Timestamp(text))?;

    Ok(CaptureTimestamp(datetime))
}
