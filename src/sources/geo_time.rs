use super::common::{Coordinates, Location};
use cached::proc_macro::cached;
use cached::SizedCache;
pub use chrono_tz::Tz;
use log::*;
use std::sync::OnceLock;
use tzf_rs::DefaultFinder;

const CACHED_COORDINATES: usize = 256;

static FINDER: OnceLock<DefaultFinder> = OnceLock::new();

fn get_finder() -> &'static DefaultFinder {
    FINDER.get_or_init(DefaultFinder::new)
}

/// Maps coordinates to the IANA identifiers of every timezone containing them.
pub trait TimezoneLookup {
    fn timezone_names(&self, coordinates: &Coordinates) -> Vec<String>;
}

/// Lookup backed by the timezone polygons bundled with `tzf-rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TzfLookup;
impl TzfLookup {
    pub fn init() -> TzfLookup {
        get_finder(); // force initialization of the static FINDER if it hasn't been initialized yet
        TzfLookup
    }
}
impl TimezoneLookup for TzfLookup {
    fn timezone_names(&self, coordinates: &Coordinates) -> Vec<String> {
        get_timezone_names(coordinates)
    }
}

#[cached(
    ty = "SizedCache<Coordinates, Vec<String>>",
    create = "{ SizedCache::with_size(CACHED_COORDINATES) }",
    convert = r#"{ coordinates.clone() }"#
)]
fn get_timezone_names(coordinates: &Coordinates) -> Vec<String> {
    get_finder().get_tz_names(coordinates.longitude, coordinates.latitude)
        .into_iter()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// One timezone a location falls into.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimezone {
    pub location: Location,
    pub timezone: Tz,
}

/// Resolves every timezone of `location`. Boundary coordinates may yield several, open water none.
pub fn resolve(lookup: &impl TimezoneLookup, location: &Location) -> Vec<ResolvedTimezone> {
    let names = lookup.timezone_names(&location.coordinates());

    if names.len() > 1 {
        warn!("{} lies in {} timezones ({}), reporting all of them",
              location, names.len(), names.join(", "));
    }

    names.iter()
        .filter_map(|name| match name.parse::<Tz>() {
            Ok(timezone) => Some(ResolvedTimezone { location: location.clone(), timezone }),
            Err(_) => {
                warn!("Unknown timezone identifier {:?} for {}", name, location);
                None
            }
        })
        .collect()
}
