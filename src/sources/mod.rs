pub mod cache;
pub mod common;
pub mod geo_time;
pub mod nominatim;
