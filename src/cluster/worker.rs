//! Worker-side runtime: the users API plus the replication link.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::cluster::protocol::{read_message, write_message, PrimaryMessage, WorkerMessage};
use crate::config::{ClusterConfig, WorkerEnv};
use crate::http::ApiServer;
use crate::users::{User, UserStore};

/// Handle that request handlers use to publish post-mutation snapshots.
///
/// Cheap to clone. A disconnected replicator (standalone mode, unit tests)
/// silently drops snapshots — there is no cluster to notify.
#[derive(Debug, Clone, Default)]
pub struct Replicator {
    tx: Option<mpsc::UnboundedSender<Vec<User>>>,
}

impl Replicator {
    fn connected(tx: mpsc::UnboundedSender<Vec<User>>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Replicator for processes with no cluster behind them.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Queue a full-state snapshot for broadcast to every worker.
    pub fn publish(&self, users: Vec<User>) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(users).is_err() {
            tracing::warn!("replication link closed, snapshot dropped");
        }
    }
}

/// Run one worker until its API server fails or the primary goes away.
pub async fn run(config: &ClusterConfig, env: &WorkerEnv) -> Result<()> {
    let store = Arc::new(UserStore::new());

    let stream = TcpStream::connect(&env.control_addr)
        .await
        .with_context(|| {
            format!(
                "worker {} failed to reach control socket {}",
                env.index, env.control_addr
            )
        })?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    // Bind before the hello: once the primary counts this worker as
    // registered, its listener must already be accepting.
    let addr = config.worker_addr(env.index);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("worker {} failed to bind {addr}", env.index))?;

    write_message(&mut writer, &WorkerMessage::Hello { index: env.index })
        .await
        .context("control handshake failed")?;
    tracing::info!(worker = env.index, address = %addr, "worker ready");

    let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel();
    let replicator = Replicator::connected(snapshot_tx);

    let server = ApiServer::new(store.clone(), replicator);

    // Control link: apply inbound syncs, flush outbound snapshots. The two
    // directions run as separate loops so an outbound snapshot never
    // cancels a half-read frame; the link ends when the primary disappears.
    let inbound = async {
        loop {
            match read_message::<_, PrimaryMessage>(&mut reader).await? {
                Some(PrimaryMessage::Sync { users }) => {
                    tracing::debug!(
                        worker = env.index,
                        count = users.len(),
                        "store replaced from broadcast"
                    );
                    store.replace_all(users).await;
                }
                None => break,
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    let outbound = async {
        while let Some(users) = snapshot_rx.recv().await {
            write_message(&mut writer, &WorkerMessage::StateChanged { users }).await?;
        }
        Ok::<_, anyhow::Error>(())
    };

    let control = async {
        tokio::select! {
            result = inbound => result,
            result = outbound => result,
        }
    };

    tokio::select! {
        result = server.run(listener) => {
            result.context("worker api server failed")
        }
        result = control => {
            result?;
            tracing::info!(worker = env.index, "control link closed, shutting down");
            Ok(())
        }
    }
}
