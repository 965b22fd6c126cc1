use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::community::RepoIdentity;
use crate::error::ScanError;

pub const DEFAULT_REPOSITORY: &str = "forkZoo/forkMonkey";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_CONFIG_FILE: &str = "community-scan.toml";
const ENV_PREFIX: &str = "COMMUNITY_SCAN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub repository: String,
    #[serde(default)]
    pub github_token: Option<String>,
    pub api_base_url: String,
    pub per_page: u8,
    pub max_candidates: usize,
    pub request_timeout_secs: u64,
    pub stats_path: String,
    pub image_path: String,
    pub snapshot: String,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    /// Load configuration from defaults, an optional TOML file and the environment.
    ///
    /// An explicit `path` must exist; otherwise `community-scan.toml` in the
    /// working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ScanError> {
        Self::build(path, None)
    }

    /// Same as [`AppConfig::load`] but reads variables from `vars` instead of
    /// the process environment.
    pub fn build(
        path: Option<&Path>,
        vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ScanError> {
        let lookup = |key: &str| match &vars {
            Some(map) => map.get(key).cloned(),
            None => env::var(key).ok(),
        };

        let mut builder = Config::builder()
            .set_default("repository", DEFAULT_REPOSITORY)?
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("per_page", 30)?
            .set_default("max_candidates", 15)?
            .set_default("request_timeout_secs", 10)?
            .set_default("stats_path", "monkey_data/stats.json")?
            .set_default("image_path", "monkey_data/monkey.svg")?
            .set_default("snapshot", "web/community_data.json")?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 3000)?;

        // Conventional CI variables sit just above the built-in defaults
        if let Some(repo) = lookup("GITHUB_REPOSITORY").filter(|v| !v.is_empty()) {
            builder = builder.set_default("repository", repo)?;
        }
        if let Some(token) = lookup("GITHUB_TOKEN").filter(|v| !v.is_empty()) {
            builder = builder.set_default("github_token", token)?;
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let environment = Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        let environment = match vars {
            Some(map) => environment.source(Some(map.into_iter().collect())),
            None => environment,
        };

        let config: AppConfig = builder
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        info!("Configuration loaded for {}", config.repository);
        if config.github_token.is_none() {
            warn!("No GitHub token configured, API rate limits will be strict");
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.per_page == 0 || self.per_page > 100 {
            return Err(ScanError::ConfigError(format!(
                "per_page must be between 1 and 100, got {}",
                self.per_page
            )));
        }

        if self.max_candidates == 0 {
            return Err(ScanError::ConfigError(
                "max_candidates must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ScanError::ConfigError(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }

        self.repository_identity()?;
        Ok(())
    }

    pub fn repository_identity(&self) -> Result<RepoIdentity, ScanError> {
        self.repository.parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
