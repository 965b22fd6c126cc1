use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use community_scan::api::{self, AppState};
use community_scan::community::{ForkNetworkAggregator, RepoIdentity, ScanSettings, SnapshotSource};
use community_scan::config::AppConfig;
use community_scan::github::GitHubClient;

#[derive(Parser)]
#[command(name = "community-scan")]
#[command(about = "Aggregate published pet artifacts across a GitHub fork network")]
struct Cli {
    /// Configuration file (defaults to ./community-scan.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the fork network and print or save the snapshot
    Scan {
        /// Repository to start from (owner/name)
        #[arg(short, long)]
        repo: Option<String>,

        /// Write the snapshot to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail instead of falling back to the cached snapshot
        #[arg(long)]
        no_fallback: bool,
    },
    /// Serve the scan over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `scan` output stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "community_scan=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan {
            repo,
            output,
            no_fallback,
        } => scan(&config, repo, output, no_fallback).await,
        Commands::Serve { host, port } => serve(config, host, port).await,
    }
}

fn build_aggregator(config: &AppConfig, fallback: bool) -> anyhow::Result<ForkNetworkAggregator<GitHubClient>> {
    let client = GitHubClient::new(&config.api_base_url, config.github_token.clone())?;
    let aggregator = ForkNetworkAggregator::new(client, ScanSettings::from_config(config));

    Ok(if fallback {
        aggregator.with_snapshot(SnapshotSource::parse(&config.snapshot))
    } else {
        aggregator
    })
}

async fn scan(
    config: &AppConfig,
    repo: Option<String>,
    output: Option<PathBuf>,
    no_fallback: bool,
) -> anyhow::Result<()> {
    let identity: RepoIdentity = match repo {
        Some(repo) => repo.parse()?,
        None => config.repository_identity()?,
    };

    // Never fall back onto the file we are about to overwrite
    let writes_snapshot = output
        .as_ref()
        .is_some_and(|path| SnapshotSource::File(path.clone()) == SnapshotSource::parse(&config.snapshot));
    let aggregator = build_aggregator(config, !no_fallback && !writes_snapshot)?;

    let aggregation = match aggregator.aggregate(&identity).await {
        Ok(aggregation) => aggregation,
        Err(err) => {
            if err.is_rate_limited() {
                error!("GitHub API rate limit exceeded, set GITHUB_TOKEN to raise it");
            }
            return Err(err).context(format!("Community scan of {} failed", identity));
        }
    };

    if aggregation.is_cached() {
        warn!("Live scan unavailable, using cached data");
    }
    info!("Discovered {} entries", aggregation.forks.len());

    let snapshot = aggregation.to_snapshot(chrono::Utc::now());
    match output {
        Some(path) => snapshot.write_to(&path).await?,
        None => println!("{}", serde_json::to_string_pretty(&snapshot)?),
    }

    Ok(())
}

async fn serve(config: AppConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let identity = config.repository_identity()?;
    let aggregator = build_aggregator(&config, true)?;
    let state = Arc::new(AppState { aggregator, identity });

    let host = host.unwrap_or_else(|| config.server_host.clone());
    let port = port.unwrap_or(config.server_port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api::router(state)).await?;

    Ok(())
}
