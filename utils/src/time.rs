//! Time formatting helpers.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Format a duration in seconds as its two largest units, e.g. `"6d 23h"`.
pub fn format_duration(secs: u64) -> String {
    match secs {
        s if s < MINUTE => format!("{s}s"),
        s if s < HOUR => format!("{}m {}s", s / MINUTE, s % MINUTE),
        s if s < DAY => format!("{}h {}m", s / HOUR, (s % HOUR) / MINUTE),
        s if s < WEEK => format!("{}d {}h", s / DAY, (s % DAY) / HOUR),
        s => format!("{}w {}d", s / WEEK, (s % WEEK) / DAY),
    }
}
