use serde::{Deserialize, Serialize};

use crate::community::RepositoryRef;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// Repository object returned by `/repos/{owner}/{repo}` and the forks listing
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    pub owner: User,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub parent: Option<Box<Repository>>,
}

impl From<Repository> for RepositoryRef {
    fn from(repo: Repository) -> Self {
        RepositoryRef {
            owner: repo.owner.login,
            name: repo.name,
            url: repo.html_url,
            fork: repo.fork,
            parent: repo.parent.map(|parent| Box::new(RepositoryRef::from(*parent))),
        }
    }
}

/// File object returned by `/repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: String,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForkListParams {
    pub per_page: u8,
}
