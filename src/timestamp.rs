//! Conversion between zip date-times and filesystem times.
//!
//! Zip entries store the modification time as an MS-DOS date and time:
//! local wall-clock fields with two-second resolution, no time zone, and no
//! values before 1980. This crate reads and writes those fields as UTC, so an
//! entry extracted and packed again keeps exactly the fields it had.
//!
//! Tools such as `unzip` and `jar` take the same fields as local time. Away
//! from UTC their listing and the filesystem times jarup extracts differ by
//! the local offset.
//!
//! # Example
//!
//! ```rust
//! use jarup::timestamp::{from_zip_datetime, to_zip_datetime};
//! use std::time::{Duration, SystemTime};
//!
//! let time = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
//! let dos = to_zip_datetime(time);
//! assert_eq!(from_zip_datetime(dos), Some(time));
//! ```

use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};
use zip::DateTime;

/// Converts a filesystem time into a zip date-time.
///
/// Times outside the representable range (before 1980 or after 2107) are
/// clamped to the zip epoch, 1980-01-01 00:00:00.
pub fn to_zip_datetime(time: SystemTime) -> DateTime {
    let dt = OffsetDateTime::from(time);
    u16::try_from(dt.year())
        .ok()
        .and_then(|year| {
            DateTime::from_date_and_time(
                year,
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
            )
            .ok()
        })
        .unwrap_or_default()
}

/// Converts a zip date-time into a filesystem time.
///
/// Returns `None` if the stored fields do not form a valid date.
pub fn from_zip_datetime(dt: DateTime) -> Option<SystemTime> {
    let month = Month::try_from(dt.month()).ok()?;
    let date = Date::from_calendar_date(i32::from(dt.year()), month, dt.day()).ok()?;
    let time = Time::from_hms(dt.hour(), dt.minute(), dt.second()).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc().into())
}

/// Sets the modification time of `path` from a zip date-time.
///
/// Failures are logged and otherwise ignored: a lost timestamp never aborts
/// extraction.
pub(crate) fn apply_mtime(path: &Path, dt: Option<DateTime>) {
    let Some(time) = dt.and_then(from_zip_datetime) else {
        log::debug!("No usable modification time for '{}'", path.display());
        return;
    };
    if let Err(e) = filetime::set_file_mtime(path, FileTime::from_system_time(time)) {
        log::warn!(
            "Failed to set modification time on '{}': {}",
            path.display(),
            e
        );
    }
}

/// Returns the modification time recorded in `metadata` as a zip date-time.
pub(crate) fn mtime_of(metadata: &std::fs::Metadata) -> DateTime {
    metadata
        .modified()
        .map(to_zip_datetime)
        .unwrap_or_default()
}
