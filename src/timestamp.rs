use chrono::{DateTime, Duration, Utc};

/// Hours the report's display zone lags behind UTC. No daylight saving.
pub const DISPLAY_OFFSET_HOURS: i64 = 3;

/// Renders a CloudWatch timestamp as the display-local hour of day, `HH:MM`.
///
/// The date is dropped, so instants on different days that share a
/// time of day render identically.
pub fn normalize(instant: &DateTime<Utc>) -> String {
    let shifted = *instant - Duration::hours(DISPLAY_OFFSET_HOURS);
    shifted.format("%H:%M").to_string()
}
