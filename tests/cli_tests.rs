use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// nothing listens on the discard port, so an accidental request fails fast
const UNREACHABLE_GEOCODER: &str = "http://127.0.0.1:9/search";

fn solar_noon(cache: &Path, geocoder_url: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("solar-noon"));
    cmd.env("SOLAR_NOON_CACHE", cache)
        .env("SOLAR_NOON_GEOCODER_URL", geocoder_url)
        .env("SOLAR_NOON_LOCALE", "en-US")
        .env_remove("RUST_LOG");
    cmd
}

async fn geocoder_returning(body: serde_json::Value, expected_requests: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "jsonv2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_requests)
        .mount(&server)
        .await;
    server
}

#[test]
fn missing_location_prints_usage() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache.json.gz");

    solar_noon(&cache, UNREACHABLE_GEOCODER)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Usage: solar-noon <location>"));

    assert!(!cache.exists());
}

#[test]
fn blank_location_prints_usage() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache.json.gz");

    solar_noon(&cache, UNREACHABLE_GEOCODER)
        .args(["  ", ""])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Usage:"));

    assert!(!cache.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn tokyo_report_is_cached_between_runs() {
    let server = geocoder_returning(json!([
        { "lat": "35.6762", "lon": "139.6503", "display_name": "Tokyo, Japan", "osm_type": "relation" }
    ]), 1).await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache.json.gz");
    let url = format!("{}/search", server.uri());

    for _ in 0..2 {
        solar_noon(&cache, &url)
            .arg("Tokyo")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("Tokyo, Japan (Asia/Tokyo)\nSolar noon today: "))
            .stdout(predicate::str::contains("No UTC offset changes are scheduled."))
            .stdout(predicate::str::contains("Ideal UTC offset: UTC+09:00"));
    }

    assert!(cache.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn arguments_are_joined_into_one_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "New York City"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "lat": "40.7127", "lon": "-74.0059", "display_name": "New York, United States" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    solar_noon(&dir.path().join("cache.json.gz"), &format!("{}/search", server.uri()))
        .args(["New", "York", "City"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New York, United States (America/New_York)"))
        .stdout(predicate::str::contains("After the change on ").count(2))
        .stdout(predicate::str::contains("Ideal UTC offset: UTC-05:00"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_place_prints_nothing() {
    let server = geocoder_returning(json!([]), 1).await;
    let dir = TempDir::new().unwrap();

    solar_noon(&dir.path().join("cache.json.gz"), &format!("{}/search", server.uri()))
        .arg("Atlantis")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn german_locale() {
    let server = geocoder_returning(json!([
        { "lat": "35.6762", "lon": "139.6503", "display_name": "Tokio, Japan" }
    ]), 1).await;
    let dir = TempDir::new().unwrap();

    solar_noon(&dir.path().join("cache.json.gz"), &format!("{}/search", server.uri()))
        .env("SOLAR_NOON_LOCALE", "de")
        .arg("Tokio")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sonnenmittag heute: "))
        .stdout(predicate::str::contains("Idealer UTC-Versatz: UTC+09:00"));
}

#[tokio::test(flavor = "multi_thread")]
async fn geocoder_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    solar_noon(&dir.path().join("cache.json.gz"), &format!("{}/search", server.uri()))
        .arg("Tokyo")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error: "))
        .stderr(predicate::str::contains("500"));
}

#[test]
fn corrupt_cache_is_fatal() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache.json.gz");
    std::fs::write(&cache, "not a cache").unwrap();

    solar_noon(&cache, UNREACHABLE_GEOCODER)
        .arg("Tokyo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Response cache failure"));

    assert_eq!(std::fs::read_to_string(&cache).unwrap(), "not a cache");
}
