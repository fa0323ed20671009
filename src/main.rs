use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use users_cluster::cluster::{primary, worker, Replicator};
use users_cluster::config::{ClusterConfig, WorkerEnv};
use users_cluster::http::ApiServer;
use users_cluster::users::UserStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "users_cluster=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClusterConfig::from_env()?;

    match WorkerEnv::from_env()? {
        Some(env) => {
            tracing::info!(worker = env.index, pid = std::process::id(), "worker starting");
            worker::run(&config, &env).await
        }
        None if config.workers == 0 => {
            tracing::info!(address = %config.public_addr(), "standalone users API starting");
            run_standalone(&config).await
        }
        None => {
            tracing::info!(
                address = %config.public_addr(),
                workers = config.workers,
                pid = std::process::id(),
                "primary starting"
            );
            primary::run(&config).await
        }
    }
}

/// WORKERS=0: serve the users API directly on the public port, no balancer
/// and no replication.
async fn run_standalone(config: &ClusterConfig) -> Result<()> {
    let store = Arc::new(UserStore::new());
    let server = ApiServer::new(store, Replicator::disconnected());

    let addr = config.public_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    server.run(listener).await.context("users api server failed")
}
