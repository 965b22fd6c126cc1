//! GitHub access for the community scan

pub mod client;
pub mod file_operations;
pub mod types;

use async_trait::async_trait;

use crate::community::{RepoIdentity, RepositoryRef};
use crate::error::ScanError;

pub use client::GitHubClient;

/// The three read endpoints the fork network scan depends on
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Repository metadata, including fork status and parent
    async fn get_repository(&self, repo: &RepoIdentity) -> Result<RepositoryRef, ScanError>;

    /// First page of forks, at most `per_page` entries
    async fn list_forks(&self, repo: &RepoIdentity, per_page: u8)
        -> Result<Vec<RepositoryRef>, ScanError>;

    /// Decoded contents of a file in the default branch
    async fn get_file_contents(&self, repo: &RepoIdentity, path: &str) -> Result<Vec<u8>, ScanError>;
}
