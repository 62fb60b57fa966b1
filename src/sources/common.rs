use super::cache::{CacheError, ResponseCache};
use serde::Deserialize;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Communication(#[from] reqwest::Error),

    #[error("Failed to construct URL and parameters: {0}")]
    Url(#[from] url::ParseError),

    #[error("Failed to parse API response: {0}")]
    Parsing(#[from] serde_json::Error),

    #[error("Failed to fetch {url}: {status}")]
    FetchFailure {
        url: String,
        status: String,
    },

    #[error("Bad request: {reason:?}")]
    BadRequest {
        reason: String
    },

    #[error("Response cache failure: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64
}
impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {latitude, longitude}
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}
impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        // this is fine because we never do math with coordinates, we just use parsed string coordinates
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}
impl Eq for Coordinates {} // marker interface to guarantee that PartialEq implementation is reflexive
impl Hash for Coordinates {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

/// A validated geocoding result.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    display_name: String,
}
impl Location {
    pub fn new(latitude: f64, longitude: f64, display_name: &str) -> Option<Location> {
        let location = Location { latitude, longitude, display_name: display_name.to_string() };
        location.coordinates().is_valid().then_some(location)
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude(), self.longitude())
    }
}
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [lat: {}, lon: {}]", self.display_name, self.latitude, self.longitude)
    }
}


/// Queries `url` with the given parameters through the response cache and decodes the body.
///
/// The body is first decoded as the success type `S`. If that fails, the provider's error shape `F`
/// is tried, and only if both fail the original parsing error is returned.
pub async fn query_api<O, S, F>(cache: &ResponseCache, client: &reqwest::Client, url: &str,
                                params: impl IntoIterator<Item = (&str, String)>)
                                -> Result<O, ApiError>
where
    S: for<'de> Deserialize<'de> + Into<O>,
    F: for<'de> Deserialize<'de> + Into<ApiError>,
{
    let url = reqwest::Url::parse_with_params(url, params)?;

    let payload = cache.fetch(client, &url).await?;

    // try to parse the response body as the given success type S
    match serde_json::from_value::<S>(payload.clone()) {
        Ok(result) => Ok(result.into()),
        Err(e) => {
            // If it fails, attempt to parse the body as the given failure type F
            match serde_json::from_value::<F>(payload) {
                Ok(api_error) => Err(api_error.into()),
                Err(_) => Err(ApiError::Parsing(e)), // Return the error if both parsing attempts fail
            }
        }
    }
}
