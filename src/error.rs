use thiserror::Error;

impl From<serde_json::Error> for ScanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Snapshot(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        Self::Snapshot(format!("I/O error: {}", err))
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        Self::Snapshot(format!("HTTP error: {}", err))
    }
}

impl From<octocrab::Error> for ScanError {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubError(describe_octocrab_error(&err))
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("GitHub API error: {0}")]
    GitHubError(String),

    #[error("Partial data: {0}")]
    PartialData(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ScanError {
    /// Root repository metadata could not be resolved
    pub fn root_unresolved(repo: &str, cause: &ScanError) -> Self {
        Self::NotFound(format!("{}: {}", repo, cause.detail()))
    }

    /// Fork listing for the root repository failed
    pub fn listing_failed(repo: &str, cause: &ScanError) -> Self {
        Self::Network(format!("failed to list forks of {}: {}", repo, cause.detail()))
    }

    pub fn invalid_identity(value: &str) -> Self {
        Self::ConfigError(format!(
            "Invalid repository identity '{}': expected owner/name",
            value
        ))
    }

    /// True when the hosting API refused the request because of rate limiting
    pub fn is_rate_limited(&self) -> bool {
        let message = self.detail().to_ascii_lowercase();
        message.contains("rate limit")
    }

    /// True for the failures that trigger the cached-snapshot fallback
    pub fn is_discovery_failure(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Network(_))
    }

    fn detail(&self) -> &str {
        match self {
            Self::NotFound(msg)
            | Self::Network(msg)
            | Self::GitHubError(msg)
            | Self::PartialData(msg)
            | Self::Snapshot(msg)
            | Self::ConfigError(msg) => msg,
        }
    }
}

fn describe_octocrab_error(err: &octocrab::Error) -> String {
    match err {
        octocrab::Error::GitHub { source, .. } => source.message.clone(),
        other => other.to_string(),
    }
}
