use crate::localization::{localize, Messages};
use crate::solar::noon::{self, SolarNoonResult};
use crate::solar::transitions::{Transition, TransitionError, TransitionFinder};
use crate::sources::geo_time::{self, ResolvedTimezone, TimezoneLookup, Tz};
use crate::sources::common::Location;
use crate::sources::nominatim::PlaceSearch;
use crate::utils::formatting::format_fixed_offset;
use crate::Error;
use chrono::{DateTime, Utc};
use log::*;

/// Number of upcoming offset changes shown per timezone.
pub const MAX_TRANSITIONS: usize = 2;

/// Solar noon of one location in one of its timezones.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub location: Location,
    pub timezone: Tz,
    pub solar_noon: SolarNoonResult,
    /// Empty if the timezone has no scheduled offset changes.
    pub upcoming: Vec<UpcomingChange>,
    pub ideal_offset: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingChange {
    pub transition: Transition,
    /// First solar noon at or after the change.
    pub solar_noon: SolarNoonResult,
}

impl Report {
    pub fn build(resolved: &ResolvedTimezone, finder: &TransitionFinder, now: DateTime<Utc>)
        -> Result<Report, TransitionError>
    {
        let longitude = resolved.location.longitude();
        let local_now = now.with_timezone(&resolved.timezone);

        let upcoming = finder.transitions(local_now)
            .take(MAX_TRANSITIONS)
            .map(|transition| transition.map(|transition| {
                let solar_noon = SolarNoonResult::from(&noon::next_solar_noon(&transition.at, longitude));
                UpcomingChange { transition, solar_noon }
            }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Report {
            location: resolved.location.clone(),
            timezone: resolved.timezone,
            solar_noon: SolarNoonResult::from(&noon::solar_noon(&local_now, longitude)),
            upcoming,
            ideal_offset: noon::ideal_utc_offset_label(longitude),
        })
    }

    pub fn render(&self, messages: &Messages) -> String {
        let mut lines = vec![
            localize!(messages, "report-header",
                name: self.location.display_name(),
                timezone: self.timezone.name()),
            localize!(messages, "solar-noon-now",
                date: self.solar_noon.calendar_date,
                time: self.solar_noon.local_time,
                offset: self.solar_noon.utc_offset_label),
        ];

        if self.upcoming.is_empty() {
            lines.push(localize!(messages, "no-changes-scheduled"));
        }

        for change in &self.upcoming {
            let at = &change.transition.at;
            lines.push(localize!(messages, "solar-noon-after-change",
                change_date: at.format("%Y-%m-%d"),
                change_time: at.format("%H:%M:%S"),
                before: format_fixed_offset(&change.transition.offset_before),
                after: format_fixed_offset(&change.transition.offset_after),
                date: change.solar_noon.calendar_date,
                time: change.solar_noon.local_time,
                offset: change.solar_noon.utc_offset_label));
        }

        lines.push(localize!(messages, "ideal-offset", offset: self.ideal_offset));
        lines.join("\n")
    }
}

/// Geocodes `query` and builds a report for every timezone of every place found.
pub async fn run(geocoder: &impl PlaceSearch, lookup: &impl TimezoneLookup, finder: &TransitionFinder,
                 query: &str, now: DateTime<Utc>) -> Result<Vec<Report>, Error>
{
    let locations = geocoder.search(query).await?;
    if locations.is_empty() {
        warn!("No place found for {:?}", query);
    }

    let mut reports = Vec::new();
    for location in &locations {
        for resolved in geo_time::resolve(lookup, location) {
            debug!("Building report for {} in {}", resolved.location, resolved.timezone);
            reports.push(Report::build(&resolved, finder, now)?);
        }
    }

    Ok(reports)
}

pub fn render_all(reports: &[Report], messages: &Messages) -> String {
    reports.iter()
        .map(|report| report.render(messages))
        .collect::<Vec<_>>()
        .join("\n\n")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::common::{ApiError, Coordinates};
    use chrono::TimeZone;

    struct StubGeocoder(Vec<Location>);
    impl PlaceSearch for StubGeocoder {
        async fn search(&self, _: &str) -> Result<Vec<Location>, ApiError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGeocoder;
    impl PlaceSearch for FailingGeocoder {
        async fn search(&self, _: &str) -> Result<Vec<Location>, ApiError> {
            Err(ApiError::FetchFailure { url: "https://example.org/search".into(), status: "500 Internal Server Error".into() })
        }
    }

    struct FixedLookup(Vec<&'static str>);
    impl TimezoneLookup for FixedLookup {
        fn timezone_names(&self, _: &Coordinates) -> Vec<String> {
            self.0.iter().map(|name| name.to_string()).collect()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap()
    }

    fn place(latitude: f64, longitude: f64, name: &str) -> Location {
        Location::new(latitude, longitude, name).unwrap()
    }

    async fn report_for(location: Location, zones: Vec<&'static str>) -> Vec<Report> {
        run(&StubGeocoder(vec![location]), &FixedLookup(zones), &TransitionFinder::default(), "query", now())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn tokyo_has_no_scheduled_changes() {
        let reports = report_for(place(35.6762, 139.6503, "Tokyo, Japan"), vec!["Asia/Tokyo"]).await;

        assert_eq!(reports.len(), 1);
        assert!(reports[0].upcoming.is_empty());
        assert_eq!(render_all(&reports, &Messages::for_locale("en-US")), "\
Tokyo, Japan (Asia/Tokyo)
Solar noon today: 2026-10-19 at 11:41:23 (UTC+09:00)
No UTC offset changes are scheduled.
Ideal UTC offset: UTC+09:00");
    }

    #[tokio::test]
    async fn berlin_reports_the_next_two_changes() {
        let reports = report_for(place(52.5170, 13.405, "Berlin, Deutschland"), vec!["Europe/Berlin"]).await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].upcoming.len(), MAX_TRANSITIONS);
        assert_eq!(render_all(&reports, &Messages::for_locale("en-US")), "\
Berlin, Deutschland (Europe/Berlin)
Solar noon today: 2026-10-19 at 13:06:22 (UTC+02:00)
After the change on 2026-10-25 at 02:00:00 (UTC+02:00 to UTC+01:00): solar noon on 2026-10-25 at 12:06:22 (UTC+01:00)
After the change on 2027-03-28 at 03:00:00 (UTC+01:00 to UTC+02:00): solar noon on 2027-03-28 at 13:06:22 (UTC+02:00)
Ideal UTC offset: UTC+01:00");
    }

    #[tokio::test]
    async fn german_output() {
        let reports = report_for(place(35.6762, 139.6503, "Tokio, Japan"), vec!["Asia/Tokyo"]).await;

        assert_eq!(render_all(&reports, &Messages::for_locale("de")), "\
Tokio, Japan (Asia/Tokyo)
Sonnenmittag heute: 2026-10-19 um 11:41:23 (UTC+09:00)
Es sind keine Änderungen des UTC-Versatzes geplant.
Idealer UTC-Versatz: UTC+09:00");
    }

    #[tokio::test]
    async fn longitude_near_the_antimeridian() {
        let reports = report_for(place(-16.5, 179.99, "Labasa, Fiji"), vec!["Pacific/Fiji"]).await;
        assert_eq!(reports[0].ideal_offset, "UTC+12:00");

        let reports = report_for(place(-14.3, -179.99, "Somewhere west"), vec!["Etc/GMT+12"]).await;
        assert_eq!(reports[0].ideal_offset, "UTC-12:00");
        assert_eq!(reports[0].solar_noon.utc_offset_label, "UTC-12:00");
    }

    #[tokio::test]
    async fn just_west_of_greenwich_is_not_negative_zero() {
        let reports = report_for(place(51.4779, -0.0015, "Greenwich"), vec!["Europe/London"]).await;

        assert_eq!(reports[0].ideal_offset, "UTC+00:00");
        assert!(!render_all(&reports, &Messages::default()).contains("UTC-00:00"));
    }

    #[tokio::test]
    async fn every_timezone_of_an_ambiguous_location_is_reported() {
        let reports = report_for(place(47.0, 8.0, "Border"), vec!["Europe/Zurich", "Europe/Berlin"]).await;

        let zones: Vec<Tz> = reports.iter().map(|report| report.timezone).collect();
        assert_eq!(zones, vec![chrono_tz::Europe::Zurich, chrono_tz::Europe::Berlin]);
        assert_eq!(render_all(&reports, &Messages::default()).matches("\n\n").count(), 1);
    }

    #[tokio::test]
    async fn locations_without_timezone_produce_nothing() {
        let reports = report_for(place(0.0, -30.0, "Mid-Atlantic"), vec![]).await;
        assert!(reports.is_empty());
        assert_eq!(render_all(&reports, &Messages::default()), "");
    }

    #[tokio::test]
    async fn geocoding_failure_aborts_the_run() {
        let result = run(&FailingGeocoder, &FixedLookup(vec!["Asia/Tokyo"]), &TransitionFinder::default(),
                         "Tokyo", now()).await;

        assert!(matches!(result, Err(Error::ApiError(ApiError::FetchFailure { .. }))));
    }
}
