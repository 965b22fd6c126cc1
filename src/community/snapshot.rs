//! Cached community snapshot
//!
//! Reads the previously published `community_data.json` (from disk or over
//! HTTP) and writes new snapshots for the static web client.

use reqwest::Client;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::types::CommunitySnapshot;
use crate::error::ScanError;

/// Location of a cached snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(String),
}

impl SnapshotSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }

    /// Load the snapshot. A missing file or non-success response is `Ok(None)`.
    pub async fn load(&self, timeout: Duration) -> Result<Option<CommunitySnapshot>, ScanError> {
        match self {
            Self::File(path) => load_file(path).await,
            Self::Url(url) => load_url(url, timeout).await,
        }
    }
}

impl fmt::Display for SnapshotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

async fn load_file(path: &Path) -> Result<Option<CommunitySnapshot>, ScanError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No snapshot at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_slice(&bytes)?))
}

async fn load_url(url: &str, timeout: Duration) -> Result<Option<CommunitySnapshot>, ScanError> {
    let client = Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        debug!("Snapshot request to {} returned {}", url, response.status());
        return Ok(None);
    }

    Ok(Some(response.json::<CommunitySnapshot>().await?))
}

impl CommunitySnapshot {
    /// Write the snapshot as indented JSON, creating parent directories
    pub async fn write_to(&self, path: &Path) -> Result<(), ScanError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;

        info!("Saved {} entries to {}", self.forks.len(), path.display());
        Ok(())
    }
}
