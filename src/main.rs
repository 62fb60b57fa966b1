mod commands;
mod config;
mod localization;
mod solar;
mod sources;
mod utils;

use chrono::Utc;
use commands::report;
use config::Config;
use localization::{localize, Messages};
use log::*;
use solar::transitions::TransitionFinder;
use sources::cache::ResponseCache;
use sources::geo_time::TzfLookup;
use sources::nominatim::Geocoder;
use thiserror::Error;


// custom error type used throughout the project
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error in API request: {0}")]
    ApiError(#[from] sources::common::ApiError),

    #[error("Failed to look up timezone changes: {0}")]
    TransitionError(#[from] solar::transitions::TransitionError),

    #[error("Unexpected error occurred: {reason:?}\nsubject: {subject:?}")]
    Unexpected {
        reason: String,
        subject: Option<String>
    },
}


#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env();
    let messages = Messages::for_locale(&config.locale);

    // every argument is part of the place name
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("{}", localize!(messages, "usage", program: env!("CARGO_PKG_NAME")));
        std::process::exit(1);
    }

    match solar_noon_report(&config, &messages, query.trim()).await {
        Ok(output) if output.is_empty() => {},
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn solar_noon_report(config: &Config, messages: &Messages, query: &str) -> Result<String, Error> {
    debug!("Running with {:?}", config);

    let http_client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .connection_verbose(config.verbose_logging)
        .build()
        .map_err(|e| Error::Unexpected {
            reason: e.to_string(),
            subject: Some("HTTP client".to_string()),
        })?;

    let cache = ResponseCache::new(&config.cache_path);
    let geocoder = Geocoder::new(http_client, cache, &config.geocoder_url, &config.locale);
    let finder = TransitionFinder::new(config.transition_horizon_years);

    let reports = report::run(&geocoder, &TzfLookup::init(), &finder, query, Utc::now()).await?;

    Ok(report::render_all(&reports, messages))
}
