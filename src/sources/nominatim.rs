use super::cache::ResponseCache;
use super::common::{self, ApiError, Location};
use log::*;
use serde::Deserialize;
use std::fmt;


pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
const RESPONSE_FORMAT: &str = "jsonv2";


/// A single search hit as returned by Nominatim. Coordinates arrive as strings.
#[derive(Deserialize, Clone)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(rename = "display_name")]
    pub full_name: String,
}
impl fmt::Debug for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [lat: {}, lon: {}]", &self.full_name, &self.lat, &self.lon)
    }
}
impl From<&Place> for Option<Location> {
    fn from(place: &Place) -> Option<Location> {
        // unparseable coordinates become NaN and are rejected together with out-of-range values
        let lat = place.lat.trim().parse::<f64>().unwrap_or(f64::NAN);
        let lon = place.lon.trim().parse::<f64>().unwrap_or(f64::NAN);
        Location::new(lat, lon, &place.full_name)
    }
}

type NominatimResult = Vec<Place>;

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimError {
    pub error: NominatimErrorDetails,
}
impl From<NominatimError> for ApiError {
    fn from(nomi_error: NominatimError) -> Self {
        ApiError::BadRequest { reason: nomi_error.error.message }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimErrorDetails {
    pub message: String,
}


/// Anything that turns free text into a list of locations.
#[allow(async_fn_in_trait)] // only ever used through generics
pub trait PlaceSearch {
    async fn search(&self, query: &str) -> Result<Vec<Location>, ApiError>;
}

pub struct Geocoder {
    client: reqwest::Client,
    cache: ResponseCache,
    base_url: String,
    language: String,
}
impl Geocoder {
    pub fn new(client: reqwest::Client, cache: ResponseCache, base_url: &str, language: &str) -> Geocoder {
        Geocoder {
            client,
            cache,
            base_url: base_url.to_string(),
            language: language.to_string(),
        }
    }
}
impl PlaceSearch for Geocoder {
    async fn search(&self, query: &str) -> Result<Vec<Location>, ApiError> {
        let params = [
            ("q", query.to_string()),
            ("format", RESPONSE_FORMAT.to_string()),
            ("accept-language", self.language.clone()),
        ];

        let places = common::query_api::<Vec<Place>, NominatimResult, NominatimError>
            (&self.cache, &self.client, &self.base_url, params).await?;

        Ok(places.iter()
            .filter_map(|place| {
                let location: Option<Location> = place.into();
                if location.is_none() {
                    warn!("Skipping place with invalid coordinates: {:?}", place);
                }
                location
            })
            .collect())
    }
}
