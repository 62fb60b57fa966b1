//! Mean solar noon: the instant the sun crosses the meridian of a longitude, ignoring the
//! equation of time.

use crate::utils::formatting::{format_utc_offset, offset_label};
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
const MILLIS_PER_DAY: i64 = 86_400_000;
const NOON_MILLIS: i64 = 12 * 3_600_000;

/// How much earlier than 12:00 UTC the sun culminates at `longitude`, to the nearest millisecond.
/// East is positive, so +180° gives 12 hours and -180° gives -12 hours.
pub fn solar_noon_utc_offset(longitude: f64) -> TimeDelta {
    TimeDelta::milliseconds((longitude / 180.0 * 12.0 * MILLIS_PER_HOUR).round() as i64)
}

/// Solar noon on the calendar day of `reference`, shown in the timezone of `reference`.
pub fn solar_noon(reference: &DateTime<Tz>, longitude: f64) -> DateTime<Tz> {
    let midnight = reference.date_naive().and_time(NaiveTime::MIN).and_utc();
    let noon = midnight + TimeDelta::milliseconds(NOON_MILLIS) - solar_noon_utc_offset(longitude);

    noon.with_timezone(&reference.timezone())
}

/// The first solar noon at or after `instant`, always less than a day later.
pub fn next_solar_noon<Z: TimeZone>(instant: &DateTime<Z>, longitude: f64) -> DateTime<Z> {
    let noon_in_day = (NOON_MILLIS - solar_noon_utc_offset(longitude).num_milliseconds())
        .rem_euclid(MILLIS_PER_DAY);
    let elapsed_in_day = instant.timestamp_millis().rem_euclid(MILLIS_PER_DAY);

    let mut wait = noon_in_day - elapsed_in_day;
    if wait < 0 {
        wait += MILLIS_PER_DAY;
    }

    instant.clone() + TimeDelta::milliseconds(wait)
}

/// The whole-hour UTC offset closest to the local mean solar time of `longitude`.
pub fn ideal_utc_offset_hours(longitude: f64) -> i64 {
    // as-cast turns -0.0 into 0
    (longitude / 180.0 * 12.0).round() as i64
}

pub fn ideal_utc_offset_label(longitude: f64) -> String {
    format_utc_offset(ideal_utc_offset_hours(longitude) * 3600)
}

/// Display form of a solar noon in a specific timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarNoonResult {
    pub calendar_date: String,
    pub local_time: String,
    pub utc_offset_label: String,
}
impl From<&DateTime<Tz>> for SolarNoonResult {
    fn from(noon: &DateTime<Tz>) -> Self {
        SolarNoonResult {
            calendar_date: noon.format("%Y-%m-%d").to_string(),
            local_time: noon.format("%H:%M:%S").to_string(),
            utc_offset_label: offset_label(noon),
        }
    }
}
