//! UTC calendar helpers for epoch-nanosecond timestamps.

const NS_PER_SECOND: i64 = 1_000_000_000;
const SECONDS_PER_DAY: i64 = 86_400;

/// Nanoseconds in one day.
pub const NS_PER_DAY: i64 = SECONDS_PER_DAY * NS_PER_SECOND;

/// Nanoseconds in one hour.
pub const NS_PER_HOUR: i64 = 3_600 * NS_PER_SECOND;

/// Days since 1970-01-01 (UTC) for a timestamp.
#[must_use]
pub fn days_since_epoch(timestamp_ns: i64) -> i64 {
    timestamp_ns.div_euclid(NS_PER_DAY)
}

/// Weekday index for a timestamp, Monday = 0 .. Sunday = 6.
#[must_use]
pub fn weekday_index(timestamp_ns: i64) -> usize {
    let weekday = (days_since_epoch(timestamp_ns) + 3).rem_euclid(7);
    // rem_euclid(7) is always in 0..7
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let weekday = weekday as usize;
    weekday
}

/// Converts days since epoch to a (year, month, day) civil date.
#[must_use]
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    (year, month as u32, day as u32)
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
#[must_use]
pub fn format_utc(timestamp_ns: i64) -> String {
    let seconds = timestamp_ns.div_euclid(NS_PER_SECOND);
    let (year, month, day) = civil_from_days(seconds.div_euclid(SECONDS_PER_DAY));
    let rem = seconds.rem_euclid(SECONDS_PER_DAY);
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02}",
        rem / 3_600,
        (rem % 3_600) / 60,
        rem % 60
    )
}
