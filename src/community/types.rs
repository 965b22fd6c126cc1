//! Community Scan Types
//!
//! Repository identities, per-fork artifact summaries and the snapshot
//! document shared with the static web client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScanError;

/// An `owner/name` pair identifying a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoIdentity {
    pub owner: String,
    pub name: String,
}

impl RepoIdentity {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoIdentity {
    type Err = ScanError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self::new(owner, name))
            }
            _ => Err(ScanError::invalid_identity(value)),
        }
    }
}

/// Repository metadata as far as the scan needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub fork: bool,
    pub parent: Option<Box<RepositoryRef>>,
}

impl RepositoryRef {
    pub fn identity(&self) -> RepoIdentity {
        RepoIdentity::new(self.owner.clone(), self.name.clone())
    }

    /// The canonical origin: the declared parent for forks, otherwise self
    pub fn into_root(mut self) -> RepositoryRef {
        match self.parent.take() {
            Some(parent) if self.fork => *parent,
            parent => {
                self.parent = parent;
                self
            }
        }
    }
}

/// Published artifact data for one repository of the network.
///
/// Field names match `community_data.json` as consumed by the web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub owner: String,
    pub repo: String,
    pub url: String,
    #[serde(default)]
    pub is_root: bool,
    /// Generator-owned stats document, passed through untouched
    #[serde(default)]
    pub monkey_stats: Option<serde_json::Value>,
    #[serde(default)]
    pub monkey_svg: Option<String>,
}

impl ArtifactSummary {
    pub fn has_artifacts(&self) -> bool {
        self.monkey_stats.is_some() || self.monkey_svg.is_some()
    }
}

/// Where an aggregation result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationSource {
    Live,
    Cached,
}

/// Outcome of a community scan: the ordered summaries plus their provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub source: AggregationSource,
    pub source_repo: String,
    pub forks: Vec<ArtifactSummary>,
}

impl Aggregation {
    pub fn is_cached(&self) -> bool {
        self.source == AggregationSource::Cached
    }

    pub fn to_snapshot(&self, now: DateTime<Utc>) -> CommunitySnapshot {
        CommunitySnapshot {
            last_updated: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
            source_repo: Some(self.source_repo.clone()),
            forks: self.forks.clone(),
        }
    }
}

/// Serialized scan result (`community_data.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySnapshot {
    /// Kept as text: older snapshots carry naive local timestamps
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub source_repo: Option<String>,
    #[serde(default)]
    pub forks: Vec<ArtifactSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repo(owner: &str, name: &str) -> RepositoryRef {
        RepositoryRef {
            owner: owner.to_string(),
            name: name.to_string(),
            url: format!("https://github.com/{}/{}", owner, name),
            fork: false,
            parent: None,
        }
    }

    #[test]
    fn test_identity_parsing() {
        let identity: RepoIdentity = "forkZoo/forkMonkey".parse().unwrap();
        assert_eq!(identity.owner, "forkZoo");
        assert_eq!(identity.name, "forkMonkey");
        assert_eq!(identity.to_string(), "forkZoo/forkMonkey");

        assert!("forkMonkey".parse::<RepoIdentity>().is_err());
        assert!("/forkMonkey".parse::<RepoIdentity>().is_err());
        assert!("a/b/c".parse::<RepoIdentity>().is_err());
        assert!("owner/".parse::<RepoIdentity>().is_err());
    }

    #[test]
    fn test_fork_resolves_to_parent() {
        let mut fork = repo("alice", "forkMonkey");
        fork.fork = true;
        fork.parent = Some(Box::new(repo("forkZoo", "forkMonkey")));

        assert_eq!(fork.into_root().identity().to_string(), "forkZoo/forkMonkey");
    }

    #[test]
    fn test_non_fork_is_its_own_root() {
        let root = repo("forkZoo", "forkMonkey");
        assert_eq!(root.clone().into_root(), root);
    }

    #[test]
    fn test_snapshot_accepts_legacy_document() {
        let legacy = json!({
            "last_updated": "2025-01-12T08:30:00.123456",
            "source_repo": "forkZoo/forkMonkey",
            "forks": [{
                "owner": "forkZoo",
                "repo": "forkMonkey",
                "url": "https://github.com/forkZoo/forkMonkey",
                "is_root": true,
                "monkey_stats": {"generation": 4, "rarity_score": 61.5, "age_days": 30},
                "monkey_svg": null
            }]
        });

        let snapshot: CommunitySnapshot = serde_json::from_value(legacy).unwrap();
        assert_eq!(snapshot.forks.len(), 1);
        assert!(snapshot.forks[0].is_root);
        assert!(snapshot.forks[0].monkey_svg.is_none());
        assert_eq!(snapshot.forks[0].monkey_stats.as_ref().unwrap()["generation"], 4);
    }

    #[test]
    fn test_aggregation_snapshot_fields() {
        let aggregation = Aggregation {
            source: AggregationSource::Live,
            source_repo: "forkZoo/forkMonkey".to_string(),
            forks: vec![],
        };
        let now = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let snapshot = aggregation.to_snapshot(now);
        assert_eq!(snapshot.last_updated.as_deref(), Some("2026-03-01T10:00:00Z"));
        assert_eq!(snapshot.source_repo.as_deref(), Some("forkZoo/forkMonkey"));
        assert_eq!(
            serde_json::to_value(AggregationSource::Cached).unwrap(),
            json!("cached")
        );
    }
}
