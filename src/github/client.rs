use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use super::file_operations::decode_content;
use super::types::{ContentFile, ForkListParams, Repository};
use super::RepositoryHost;
use crate::community::{RepoIdentity, RepositoryRef};
use crate::error::ScanError;

/// Read-only GitHub REST client used by the community scan
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Build a client against `base_url`, authenticating when a token is given
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ScanError> {
        let mut builder = Octocrab::builder().base_uri(base_url).map_err(|e| {
            ScanError::ConfigError(format!("Invalid GitHub API URL {}: {}", base_url, e))
        })?;

        if let Some(token) = token {
            builder = builder.personal_token(token);
        }

        let client = builder
            .build()
            .map_err(|e| ScanError::GitHubError(format!("Failed to create GitHub client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn get_repository(&self, repo: &RepoIdentity) -> Result<RepositoryRef, ScanError> {
        debug!("Fetching repository metadata: {}", repo);

        let route = format!("/repos/{}/{}", repo.owner, repo.name);
        let response: Repository = self.client.get(route, None::<&()>).await?;
        Ok(response.into())
    }

    async fn list_forks(
        &self,
        repo: &RepoIdentity,
        per_page: u8,
    ) -> Result<Vec<RepositoryRef>, ScanError> {
        debug!("Listing forks of {} ({} per page)", repo, per_page);

        let route = format!("/repos/{}/{}/forks", repo.owner, repo.name);
        let params = ForkListParams { per_page };
        let response: Vec<Repository> = self.client.get(route, Some(&params)).await?;
        Ok(response.into_iter().map(RepositoryRef::from).collect())
    }

    async fn get_file_contents(&self, repo: &RepoIdentity, path: &str) -> Result<Vec<u8>, ScanError> {
        debug!("Fetching file content: {}:{}", repo, path);

        let route = format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path);
        let response: ContentFile = self.client.get(route, None::<&()>).await?;
        decode_content(&response)
    }
}
