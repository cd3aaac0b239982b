//! Appointment scheduling arithmetic.
//!
//! Pure functions for creating an appointment a number of days out,
//! serializing it to a UTC timestamp, decomposing a timestamp into calendar
//! components, applying partial wall-clock updates, and comparing two
//! appointments. No function reads the system clock except
//! [`create_appointment_from_now`]; the caller provides the "now" anchor
//! everywhere else.
//!
//! # Calendar zones
//!
//! Calendar components (year, month, day, hour, minute) are always read in a
//! calendar zone. The plain functions use the host's local zone
//! ([`chrono::Local`]); each has an `_in` variant taking any
//! [`chrono::TimeZone`] so results can be pinned to a known zone.
//!
//! # Functions
//!
//! - [`create_appointment`] — Offset an instant by whole days
//! - [`get_appointment_timestamp`] — Serialize an instant as `YYYY-MM-DDTHH:mm:ss.sssZ`
//! - [`get_appointment_details`] — Decompose a timestamp into an [`AppointmentDetails`]
//! - [`update_appointment`] — Overwrite selected calendar components
//! - [`time_between`] — Absolute distance between two timestamps in seconds
//! - [`is_valid`] — Whether an appointment lies strictly after the current instant

use chrono::{
    DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Offset-less formats accepted by [`parse_timestamp_in`], read as wall-clock
/// time in the calendar zone.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// ── create_appointment ──────────────────────────────────────────────────────

/// Create an appointment `days` whole days after `now`.
///
/// A day is exactly 86 400 000 ms; the offset does not follow wall-clock
/// time across DST transitions. Negative and zero offsets are allowed.
///
/// # Errors
///
/// Returns [`ConciergeError::OutOfRange`] if the result falls outside the
/// representable range of [`DateTime<Utc>`].
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use concierge::appointment::{create_appointment, get_appointment_timestamp};
///
/// let now = Utc.with_ymd_and_hms(2026, 3, 15, 14, 0, 0).unwrap();
/// let appointment = create_appointment(4, now).unwrap();
/// assert_eq!(get_appointment_timestamp(&appointment), "2026-03-19T14:00:00.000Z");
/// ```
pub fn create_appointment(days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let out_of_range = || ConciergeError::OutOfRange(format!("{days} days from {now}"));

    let offset = days
        .checked_mul(MILLIS_PER_DAY)
        .and_then(TimeDelta::try_milliseconds)
        .ok_or_else(out_of_range)?;

    now.checked_add_signed(offset).ok_or_else(out_of_range)
}

/// [`create_appointment`] anchored at the system clock.
pub fn create_appointment_from_now(days: i64) -> Result<DateTime<Utc>> {
    create_appointment(days, Utc::now())
}

/// Convert milliseconds since the Unix epoch into an instant.
///
/// # Errors
///
/// Returns [`ConciergeError::OutOfRange`] if `millis` is not representable.
pub fn instant_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| ConciergeError::OutOfRange(format!("{millis} ms since epoch")))
}

/// Milliseconds since the Unix epoch for `instant`. Sub-millisecond precision is dropped.
pub fn instant_to_millis(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

// ── get_appointment_timestamp ───────────────────────────────────────────────

/// Serialize an instant as a UTC timestamp with millisecond precision
/// (`YYYY-MM-DDTHH:mm:ss.sssZ`).
///
/// Years outside 0000–9999 use the ISO 8601 expanded form with a sign and
/// six digits (`+010000-01-01T00:00:00.000Z`, `-000001-03-15T14:05:00.000Z`),
/// which [`parse_timestamp_in`] reads back.
pub fn get_appointment_timestamp(instant: &DateTime<Utc>) -> String {
    let year = instant.year();
    if (0..=9999).contains(&year) {
        return instant.to_rfc3339_opts(SecondsFormat::Millis, true);
    }

    let sign = if year < 0 { '-' } else { '+' };
    format!(
        "{sign}{:06}-{}",
        year.unsigned_abs(),
        instant.format("%m-%dT%H:%M:%S%.3fZ")
    )
}

// ── get_appointment_details ─────────────────────────────────────────────────

/// Calendar components of an appointment as seen in a calendar zone.
///
/// `month` is zero-based (0 = January). Only obtainable by decomposing an
/// instant, see [`AppointmentDetails::of`] and [`get_appointment_details`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AppointmentDetails {
    year: i32,
    month: u32,
    date: u32,
    hour: u32,
    minute: u32,
}

impl AppointmentDetails {
    /// Decompose `instant` into its calendar components in `zone`.
    pub fn of<Z: TimeZone>(instant: &DateTime<Utc>, zone: &Z) -> Self {
        let local = instant.with_timezone(zone);
        Self {
            year: local.year(),
            month: local.month0(),
            date: local.day(),
            hour: local.hour(),
            minute: local.minute(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month (0 = January).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day of the month, starting at 1.
    pub fn date(&self) -> u32 {
        self.date
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

/// Decompose a timestamp into calendar components in the host's local zone.
///
/// See [`get_appointment_details_in`].
pub fn get_appointment_details(timestamp: &str) -> Result<AppointmentDetails> {
    get_appointment_details_in(timestamp, &Local)
}

/// Decompose a timestamp into calendar components in `zone`.
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimestamp`] if the timestamp cannot be
/// parsed (see [`parse_timestamp_in`] for accepted forms).
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use concierge::appointment::get_appointment_details_in;
///
/// let details = get_appointment_details_in("2026-03-15T14:05:00.000Z", &Utc).unwrap();
/// assert_eq!(details.year(), 2026);
/// assert_eq!(details.month(), 2); // March
/// assert_eq!(details.date(), 15);
/// ```
pub fn get_appointment_details_in<Z: TimeZone>(
    timestamp: &str,
    zone: &Z,
) -> Result<AppointmentDetails> {
    let instant = parse_timestamp_in(timestamp, zone)?;
    Ok(AppointmentDetails::of(&instant, zone))
}

// ── update_appointment ──────────────────────────────────────────────────────

/// Calendar components to overwrite in [`update_appointment`].
///
/// Keys mirror [`AppointmentDetails`]; `month` is zero-based. Every present
/// key is applied with no range check, and out-of-range values roll over
/// into the neighbouring component the way a calendar normalizes them
/// (`month: 12` is January of the following year, `date: 0` the last day of
/// the previous month, `hour: -1` 23:00 the day before).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppointmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i64>,
}

impl AppointmentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Update an appointment in the host's local zone.
///
/// See [`update_appointment_in`].
pub fn update_appointment(
    timestamp: &str,
    options: &AppointmentUpdate,
) -> Result<AppointmentDetails> {
    update_appointment_in(timestamp, options, &Local)
}

/// Overwrite the calendar components named in `options`, then return the
/// details of the resulting appointment.
///
/// Components are applied in the order year, month, date, hour, minute, each
/// on top of the previous one, so `{year: 2025}` applied to 29 February 2024
/// lands on 1 March 2025 before any month or date is set. Seconds and
/// sub-second precision are kept.
///
/// A wall-clock result that occurs twice (DST fall-back) resolves to the
/// earlier instant; one that never occurs (DST spring-forward gap) is pushed
/// forward by one hour.
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimestamp`] if the timestamp cannot be
/// parsed, [`ConciergeError::OutOfRange`] if a component pushes the date out
/// of the representable range, or [`ConciergeError::NonexistentLocalTime`]
/// if the updated wall-clock time cannot be placed in `zone`.
pub fn update_appointment_in<Z: TimeZone>(
    timestamp: &str,
    options: &AppointmentUpdate,
    zone: &Z,
) -> Result<AppointmentDetails> {
    let instant = parse_timestamp_in(timestamp, zone)?;
    let wall = instant.with_timezone(zone).naive_local();

    let updated_wall = apply_update(wall, options)?;
    let updated = resolve_wall_clock(zone, updated_wall)?;
    tracing::debug!(%timestamp, ?options, %updated, "updated appointment");

    get_appointment_details_in(&get_appointment_timestamp(&updated), zone)
}

// ── time_between / is_valid ─────────────────────────────────────────────────

/// Seconds between two timestamps, in the host's local zone for offset-less input.
///
/// See [`time_between_in`].
pub fn time_between(timestamp_a: &str, timestamp_b: &str) -> Result<u64> {
    time_between_in(timestamp_a, timestamp_b, &Local)
}

/// Absolute distance between two timestamps, rounded to the nearest whole
/// second (half a second rounds up).
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimestamp`] if either timestamp cannot be parsed.
pub fn time_between_in<Z: TimeZone>(timestamp_a: &str, timestamp_b: &str, zone: &Z) -> Result<u64> {
    let a = parse_timestamp_in(timestamp_a, zone)?;
    let b = parse_timestamp_in(timestamp_b, zone)?;

    let millis = (a - b).num_milliseconds().unsigned_abs();
    Ok((millis + 500) / 1000)
}

/// Whether the appointment is in the future, in the host's local zone for offset-less input.
///
/// See [`is_valid_in`].
pub fn is_valid(appointment_timestamp: &str, current_timestamp: &str) -> Result<bool> {
    is_valid_in(appointment_timestamp, current_timestamp, &Local)
}

/// `true` iff the appointment is strictly later than the current instant.
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimestamp`] if either timestamp cannot be parsed.
pub fn is_valid_in<Z: TimeZone>(
    appointment_timestamp: &str,
    current_timestamp: &str,
    zone: &Z,
) -> Result<bool> {
    let appointment = parse_timestamp_in(appointment_timestamp, zone)?;
    let current = parse_timestamp_in(current_timestamp, zone)?;
    Ok(appointment > current)
}

// ── Parsing ─────────────────────────────────────────────────────────────────

/// Parse a timestamp into an instant.
///
/// Accepted forms, tried in order:
///
/// 1. RFC 3339 with `Z` or a numeric offset (`2026-03-15T14:00:00.000Z`)
/// 2. The same with an expanded six-digit signed year (`+010000-01-01T00:00:00.000Z`)
/// 3. Date and time without offset (`2026-03-15T14:00`, `2026-03-15 14:00:00.250`),
///    read as wall-clock time in `zone`
/// 4. Date only (`2026-03-15`), year and month (`2026-03`) or year (`2026`),
///    read as midnight UTC on the first missing day and month
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimestamp`] for anything else, or
/// [`ConciergeError::NonexistentLocalTime`] if an offset-less time cannot be
/// placed in `zone`.
pub fn parse_timestamp_in<Z: TimeZone>(timestamp: &str, zone: &Z) -> Result<DateTime<Utc>> {
    let s = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(dt) = parse_expanded_year(s) {
        tracing::trace!(timestamp = s, "expanded-year timestamp");
        return Ok(dt);
    }

    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        tracing::trace!(timestamp = s, "offset-less timestamp, reading as wall-clock time");
        return resolve_wall_clock(zone, naive);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        tracing::trace!(timestamp = s, "date-only timestamp, reading as UTC midnight");
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    if let Some(date) = parse_partial_date(s) {
        tracing::trace!(timestamp = s, "partial date, reading as UTC midnight");
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err(ConciergeError::InvalidTimestamp(format!("'{}'", timestamp)))
}

/// Parse an IANA timezone name (e.g. `"Europe/Madrid"`).
///
/// # Errors
///
/// Returns [`ConciergeError::InvalidTimezone`] if the name is not a known IANA zone.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ConciergeError::InvalidTimezone(format!("'{}'", name)))
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn all_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

/// `±YYYYYY-MM-DDTHH:mm:ss[.sss](Z|±HH:MM)`. `-000000` is not a year.
fn parse_expanded_year(s: &str) -> Option<DateTime<Utc>> {
    let sign = match s.as_bytes().first().copied()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits = s.get(1..7)?;
    let rest = s.get(7..)?.strip_prefix('-')?;
    if !all_digits(digits) || (sign < 0 && digits == "000000") {
        return None;
    }
    let year = sign * digits.parse::<i32>().ok()?;

    // Parse under a leap placeholder year, then move to the real one so that
    // 29 February is only accepted in leap years.
    let placeholder = DateTime::parse_from_rfc3339(&format!("2000-{rest}")).ok()?;
    let offset = *placeholder.offset();
    let wall = placeholder.naive_local().with_year(year)?;
    offset
        .from_local_datetime(&wall)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `YYYY-MM` or `YYYY`, padded to the first of the month or year.
fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    let (year, month) = match s.split_once('-') {
        Some((year, month)) => (year, Some(month)),
        None => (s, None),
    };
    if year.len() != 4 || !all_digits(year) {
        return None;
    }
    if month.is_some_and(|m| m.len() != 2 || !all_digits(m)) {
        return None;
    }

    let year = year.parse::<i32>().ok()?;
    let month = month.map_or(Ok(1), str::parse::<u32>).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Place a wall-clock time in `zone`: earlier instant when ambiguous, one hour
/// later when it falls in a gap.
fn resolve_wall_clock<Z: TimeZone>(zone: &Z, wall: NaiveDateTime) -> Result<DateTime<Utc>> {
    zone.from_local_datetime(&wall)
        .earliest()
        .or_else(|| {
            let shifted = wall.checked_add_signed(TimeDelta::hours(1))?;
            zone.from_local_datetime(&shifted).earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| ConciergeError::NonexistentLocalTime(wall.to_string()))
}

/// Apply each present component in order year, month, date, hour, minute.
fn apply_update(mut wall: NaiveDateTime, options: &AppointmentUpdate) -> Result<NaiveDateTime> {
    if let Some(year) = options.year {
        wall = with_calendar_date(
            wall,
            i64::from(year),
            i64::from(wall.month0()),
            i64::from(wall.day()),
        )?;
    }
    if let Some(month) = options.month {
        wall = with_calendar_date(wall, i64::from(wall.year()), month, i64::from(wall.day()))?;
    }
    if let Some(date) = options.date {
        wall = with_calendar_date(
            wall,
            i64::from(wall.year()),
            i64::from(wall.month0()),
            date,
        )?;
    }
    if let Some(hour) = options.hour {
        wall = with_clock(wall, hour, i64::from(wall.minute()))?;
    }
    if let Some(minute) = options.minute {
        wall = with_clock(wall, i64::from(wall.hour()), minute)?;
    }
    Ok(wall)
}

/// Rebuild the date part from a possibly out-of-range (year, month0, day),
/// carrying overflow into the larger units. Time of day is kept.
fn with_calendar_date(wall: NaiveDateTime, year: i64, month0: i64, day: i64) -> Result<NaiveDateTime> {
    let out_of_range =
        || ConciergeError::OutOfRange(format!("year {year}, month {month0}, day {day}"));

    let months = year
        .checked_mul(12)
        .and_then(|m| m.checked_add(month0))
        .ok_or_else(out_of_range)?;
    let year = i32::try_from(months.div_euclid(12)).map_err(|_| out_of_range())?;
    let month = months.rem_euclid(12) as u32 + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let date = day
        .checked_sub(1)
        .and_then(TimeDelta::try_days)
        .and_then(|offset| first.checked_add_signed(offset))
        .ok_or_else(out_of_range)?;

    Ok(date.and_time(wall.time()))
}

/// Rebuild the time of day from a possibly out-of-range (hour, minute),
/// carrying overflow into the date. Seconds and sub-seconds are kept.
fn with_clock(wall: NaiveDateTime, hour: i64, minute: i64) -> Result<NaiveDateTime> {
    let out_of_range = || ConciergeError::OutOfRange(format!("hour {hour}, minute {minute}"));

    let sub_minute = TimeDelta::seconds(i64::from(wall.second()))
        + TimeDelta::nanoseconds(i64::from(wall.nanosecond()));

    hour.checked_mul(60)
        .and_then(|m| m.checked_add(minute))
        .and_then(TimeDelta::try_minutes)
        .and_then(|offset| wall.date().and_time(NaiveTime::MIN).checked_add_signed(offset))
        .and_then(|dt| dt.checked_add_signed(sub_minute))
        .ok_or_else(out_of_range)
}
