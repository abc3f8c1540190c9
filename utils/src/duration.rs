//! Human-readable lock and epoch lengths for log lines.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const YEAR: u64 = 365 * DAY;

/// Format a duration in seconds as at most two units, largest first,
/// dropping a zero minor unit: `"7d"`, `"30d 1h"`, `"1y 35d"`.
pub fn format_duration(secs: u64) -> String {
    let (major, major_unit, minor, minor_unit) = match secs {
        s if s >= YEAR => (s / YEAR, "y", (s % YEAR) / DAY, "d"),
        s if s >= DAY => (s / DAY, "d", (s % DAY) / HOUR, "h"),
        s if s >= HOUR => (s / HOUR, "h", (s % HOUR) / MINUTE, "m"),
        s if s >= MINUTE => (s / MINUTE, "m", s % MINUTE, "s"),
        s => return format!("{s}s"),
    };
    if minor == 0 {
        format!("{major}{major_unit}")
    } else {
        format!("{major}{major_unit} {minor}{minor_unit}")
    }
}
