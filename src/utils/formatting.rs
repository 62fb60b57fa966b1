use chrono::{FixedOffset, Offset, TimeZone};

/// Renders an offset east of UTC as `UTC+HH:MM` / `UTC-HH:MM`, truncated to whole minutes.
/// Anything that truncates to zero is rendered as `UTC+00:00`.
pub fn format_utc_offset(offset_seconds: i64) -> String {
    let minutes = offset_seconds.unsigned_abs() / 60;
    let sign = if offset_seconds < 0 && minutes > 0 { '-' } else { '+' };

    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

pub fn format_fixed_offset(offset: &FixedOffset) -> String {
    format_utc_offset(offset.local_minus_utc() as i64)
}

/// The UTC offset label of a zoned date time.
pub fn offset_label<Z: TimeZone>(date_time: &chrono::DateTime<Z>) -> String {
    format_fixed_offset(&date_time.offset().fix())
}
