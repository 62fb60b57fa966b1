use super::common::ApiError;
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Cached provider responses, keyed by the exact request URL.
/// A `BTreeMap` keeps the serialized document in a stable key order.
pub type CacheEntries = BTreeMap<String, CacheEntry>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Cache file is not a valid document: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub data: Value,
    pub last_cached_at: DateTime<Utc>,
    pub last_retrieved_at: DateTime<Utc>,
}

/// Gzip-compressed JSON document holding every response ever fetched.
///
/// Entries never expire. The whole document is read, modified and rewritten on every access, so
/// only one process should use a given cache file at a time.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    path: PathBuf,
}
impl ResponseCache {
    pub fn new(path: impl Into<PathBuf>) -> ResponseCache {
        ResponseCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole cache. A missing file is initialized with an empty document.
    pub async fn load(&self) -> Result<CacheEntries, CacheError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode(&bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cache at {}, creating an empty one", self.path().display());
                let entries = CacheEntries::new();
                self.save(&entries).await?;
                Ok(entries)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrites the backing file with the full set of entries.
    pub async fn save(&self, entries: &CacheEntries) -> Result<(), CacheError> {
        let bytes = encode(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        debug!("Wrote {} cache entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    /// Returns the cached body for `url`, or requests it and caches the body on success.
    pub async fn fetch(&self, client: &reqwest::Client, url: &url::Url) -> Result<Value, ApiError> {
        let key = url.as_str();
        let mut entries = self.load().await?;

        if let Some(entry) = entries.get_mut(key) {
            debug!("Cache hit for {}", key);
            entry.last_retrieved_at = Utc::now();
            let data = entry.data.clone();
            self.save(&entries).await?;
            return Ok(data);
        }

        info!("Requesting {}", key);
        let response = client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::FetchFailure {
                url: key.to_string(),
                status: status.to_string(),
            });
        }

        let data: Value = response.json().await?;
        let now = Utc::now();
        entries.insert(key.to_string(), CacheEntry {
            data: data.clone(),
            last_cached_at: now,
            last_retrieved_at: now,
        });
        self.save(&entries).await?;

        Ok(data)
    }
}

fn encode(entries: &CacheEntries) -> Result<Vec<u8>, CacheError> {
    let document = serde_json::to_vec_pretty(entries)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&document)?;
    Ok(encoder.finish()?)
}

fn decode(bytes: &[u8]) -> Result<CacheEntries, CacheError> {
    let mut document = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut document)?;
    Ok(serde_json::from_slice(&document)?)
}
