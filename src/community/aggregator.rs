//! Fork Network Aggregator
//!
//! Discovers the root repository and its forks, fetches each candidate's
//! published artifacts concurrently and keeps the candidates that produced
//! anything. Discovery failures fall back to the cached snapshot.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::snapshot::SnapshotSource;
use super::types::{Aggregation, AggregationSource, ArtifactSummary, RepoIdentity, RepositoryRef};
use crate::config::AppConfig;
use crate::error::ScanError;
use crate::github::RepositoryHost;

/// Tunables for one scan
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub per_page: u8,
    pub max_candidates: usize,
    pub request_timeout: Duration,
    pub stats_path: String,
    pub image_path: String,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            per_page: 30,
            max_candidates: 15,
            request_timeout: Duration::from_secs(10),
            stats_path: "monkey_data/stats.json".to_string(),
            image_path: "monkey_data/monkey.svg".to_string(),
        }
    }
}

impl ScanSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            per_page: config.per_page,
            max_candidates: config.max_candidates,
            request_timeout: config.request_timeout(),
            stats_path: config.stats_path.clone(),
            image_path: config.image_path.clone(),
        }
    }
}

/// A repository queued for artifact collection
#[derive(Debug, Clone)]
struct Candidate {
    repo: RepositoryRef,
    is_root: bool,
}

pub struct ForkNetworkAggregator<H> {
    host: Arc<H>,
    settings: ScanSettings,
    snapshot: Option<SnapshotSource>,
}

impl<H: RepositoryHost + 'static> ForkNetworkAggregator<H> {
    pub fn new(host: H, settings: ScanSettings) -> Self {
        Self {
            host: Arc::new(host),
            settings,
            snapshot: None,
        }
    }

    /// Use `source` when discovery fails
    pub fn with_snapshot(mut self, source: SnapshotSource) -> Self {
        self.snapshot = Some(source);
        self
    }

    /// Scan the fork network that `identity` belongs to.
    ///
    /// Per-candidate failures are absorbed. Only a failure to resolve the root
    /// or to list its forks is an error, and only when no non-empty cached
    /// snapshot is available.
    pub async fn aggregate(&self, identity: &RepoIdentity) -> Result<Aggregation, ScanError> {
        info!("Starting community scan from {}", identity);

        let (root, candidates) = match self.discover(identity).await {
            Ok(discovered) => discovered,
            Err(err) if err.is_discovery_failure() => return self.fall_back(identity, err).await,
            Err(err) => return Err(err),
        };

        let forks = self.collect(candidates).await;
        info!("Scan complete, found {} entries in the network of {}", forks.len(), root);

        Ok(Aggregation {
            source: AggregationSource::Live,
            source_repo: root.to_string(),
            forks,
        })
    }

    /// Resolve the root and build the bounded candidate list, root first
    async fn discover(&self, identity: &RepoIdentity) -> Result<(RepoIdentity, Vec<Candidate>), ScanError> {
        let timeout = self.settings.request_timeout;

        let repo = bounded(timeout, self.host.get_repository(identity))
            .await
            .map_err(|e| ScanError::root_unresolved(&identity.to_string(), &e))?;

        if repo.fork && repo.parent.is_some() {
            info!("{} is a fork, scanning its parent's network", identity);
        }
        let root = repo.into_root();
        let root_identity = root.identity();

        let forks = bounded(timeout, self.host.list_forks(&root_identity, self.settings.per_page))
            .await
            .map_err(|e| ScanError::listing_failed(&root_identity.to_string(), &e))?;

        let candidates: Vec<Candidate> = std::iter::once(Candidate { repo: root, is_root: true })
            .chain(forks.into_iter().map(|repo| Candidate { repo, is_root: false }))
            .take(self.settings.max_candidates)
            .collect();

        info!("Found {} candidates in the network of {}", candidates.len(), root_identity);
        Ok((root_identity, candidates))
    }

    /// Fetch artifacts for every candidate, waiting for all of them to settle
    async fn collect(&self, candidates: Vec<Candidate>) -> Vec<ArtifactSummary> {
        let mut tasks = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let host = Arc::clone(&self.host);
            let settings = self.settings.clone();
            let name = candidate.repo.identity();

            let task = tokio::spawn(async move { collect_artifacts(&*host, &settings, candidate).await });
            tasks.push((name, task));
        }

        let mut summaries = Vec::new();
        for (name, task) in tasks {
            match task.await {
                Ok(Some(summary)) => summaries.push(summary),
                Ok(None) => debug!("No artifacts in {}", name),
                Err(e) => warn!("Artifact collection for {} aborted: {}", name, e),
            }
        }

        summaries
    }

    async fn fall_back(&self, identity: &RepoIdentity, err: ScanError) -> Result<Aggregation, ScanError> {
        warn!("Community scan failed: {}", err);

        let Some(source) = &self.snapshot else {
            return Err(err);
        };

        match source.load(self.settings.request_timeout).await {
            Ok(Some(snapshot)) if !snapshot.forks.is_empty() => {
                info!("Using cached snapshot from {} ({} entries)", source, snapshot.forks.len());
                Ok(Aggregation {
                    source: AggregationSource::Cached,
                    source_repo: snapshot.source_repo.unwrap_or_else(|| identity.to_string()),
                    forks: snapshot.forks,
                })
            }
            Ok(_) => {
                warn!("Cached snapshot at {} is missing or empty", source);
                Err(err)
            }
            Err(snapshot_err) => {
                warn!("Cached snapshot at {} is unusable: {}", source, snapshot_err);
                Err(err)
            }
        }
    }
}

async fn collect_artifacts<H: RepositoryHost + ?Sized>(
    host: &H,
    settings: &ScanSettings,
    candidate: Candidate,
) -> Option<ArtifactSummary> {
    let identity = candidate.repo.identity();

    let (stats, image) = tokio::join!(
        fetch_artifact(host, &identity, &settings.stats_path, settings.request_timeout),
        fetch_artifact(host, &identity, &settings.image_path, settings.request_timeout),
    );

    let monkey_stats = stats.and_then(decode_stats).unwrap_or_else(|e| {
        debug!("{}", e);
        None
    });
    let monkey_svg = image.and_then(decode_image).unwrap_or_else(|e| {
        debug!("{}", e);
        None
    });

    let summary = ArtifactSummary {
        owner: candidate.repo.owner,
        repo: candidate.repo.name,
        url: candidate.repo.url,
        is_root: candidate.is_root,
        monkey_stats,
        monkey_svg,
    };

    if summary.has_artifacts() {
        debug!("Found artifacts in {}", identity);
        Some(summary)
    } else {
        None
    }
}

/// One sub-resource fetch; timeouts count as ordinary failures
async fn fetch_artifact<H: RepositoryHost + ?Sized>(
    host: &H,
    identity: &RepoIdentity,
    path: &str,
    timeout: Duration,
) -> Result<Vec<u8>, ScanError> {
    bounded(timeout, host.get_file_contents(identity, path))
        .await
        .map_err(|e| ScanError::PartialData(format!("{}:{}: {}", identity, path, e)))
}

/// Run one API request under `timeout`; elapsing counts as a request failure
async fn bounded<T, F>(timeout: Duration, request: F) -> Result<T, ScanError>
where
    F: std::future::Future<Output = Result<T, ScanError>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .unwrap_or_else(|_| Err(ScanError::GitHubError(format!("request timed out after {:?}", timeout))))
}

fn decode_stats(bytes: Vec<u8>) -> Result<Option<serde_json::Value>, ScanError> {
    let stats: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ScanError::PartialData(format!("Invalid stats document: {}", e)))?;

    Ok((!stats.is_null()).then_some(stats))
}

fn decode_image(bytes: Vec<u8>) -> Result<Option<String>, ScanError> {
    let svg = String::from_utf8(bytes)
        .map_err(|e| ScanError::PartialData(format!("Image is not UTF-8: {}", e)))?;

    Ok((!svg.trim().is_empty()).then_some(svg))
}
