use crate::localization::DEFAULT_LOCALE;
use crate::solar::transitions::{DEFAULT_HORIZON_YEARS, MAX_HORIZON_YEARS};
use crate::sources::nominatim;
use log::*;
use std::path::PathBuf;

pub const CACHE_FILE_NAME: &str = "geocode-cache.json.gz";

const CACHE_PATH_VAR: &str = "SOLAR_NOON_CACHE";
const LOCALE_VAR: &str = "SOLAR_NOON_LOCALE";
const GEOCODER_URL_VAR: &str = "SOLAR_NOON_GEOCODER_URL";
const USER_AGENT_VAR: &str = "SOLAR_NOON_USER_AGENT";
const HORIZON_VAR: &str = "SOLAR_NOON_TRANSITION_HORIZON_YEARS";
const VERBOSE_VAR: &str = "VERBOSE_LOGGING";

/// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_path: PathBuf,
    /// Sent to the geocoder as `accept-language` and used for the output language.
    pub locale: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub transition_horizon_years: u32,
    pub verbose_logging: bool,
}
impl Config {
    pub fn from_env() -> Config {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Config {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let transition_horizon_years = match var(HORIZON_VAR) {
            Some(value) => match value.trim().parse::<u32>() {
                Ok(years) if years > MAX_HORIZON_YEARS => {
                    warn!("{}={} is too far ahead, using {} years", HORIZON_VAR, years, MAX_HORIZON_YEARS);
                    MAX_HORIZON_YEARS
                }
                Ok(years) => years,
                Err(_) => {
                    warn!("Ignoring invalid {}={:?}, using {} years", HORIZON_VAR, value, DEFAULT_HORIZON_YEARS);
                    DEFAULT_HORIZON_YEARS
                }
            },
            None => DEFAULT_HORIZON_YEARS,
        };

        Config {
            cache_path: var(CACHE_PATH_VAR).map(PathBuf::from).unwrap_or_else(default_cache_path),
            locale: var(LOCALE_VAR).unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
            geocoder_url: var(GEOCODER_URL_VAR).unwrap_or_else(|| nominatim::DEFAULT_BASE_URL.to_string()),
            user_agent: var(USER_AGENT_VAR)
                .unwrap_or_else(|| format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))),
            transition_horizon_years,
            verbose_logging: var(VERBOSE_VAR).map(|b| b.parse::<bool>().unwrap_or(false)).unwrap_or(false),
        }
    }
}

// next to the executable, or the working directory if that cannot be determined
fn default_cache_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CACHE_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CACHE_FILE_NAME))
}
