//! Primary-side runtime: worker supervision and the replication hub.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, mpsc};

use crate::balancer::pool::{WorkerBackend, WorkerPool};
use crate::balancer::BalancerServer;
use crate::cluster::protocol::{read_message, write_message, PrimaryMessage, WorkerMessage};
use crate::config::{ClusterConfig, CONTROL_ADDR_ENV, WORKER_INDEX_ENV};

/// The replication hub: one control connection per worker, every snapshot
/// re-broadcast to all of them, originator included.
pub struct ControlHub {
    addr: SocketAddr,
    registered: mpsc::UnboundedReceiver<usize>,
}

impl ControlHub {
    /// Bind the loopback control socket on an ephemeral port and start
    /// accepting workers.
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("failed to bind control socket")?;
        let addr = listener.local_addr()?;

        // Snapshots are whole-state, so the channel can stay shallow: a
        // worker that lags simply picks up the next broadcast.
        let (broadcaster, _) = broadcast::channel(16);
        let (registered_tx, registered) = mpsc::unbounded_channel();
        tokio::spawn(accept_workers(listener, broadcaster, registered_tx));

        tracing::info!(address = %addr, "control socket bound");
        Ok(Self { addr, registered })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait until `count` workers have completed the control handshake.
    pub async fn wait_for_workers(&mut self, count: usize) -> Result<()> {
        let mut seen = 0;
        while seen < count {
            let index = self
                .registered
                .recv()
                .await
                .context("control socket task died")?;
            seen += 1;
            tracing::info!(worker = index, registered = seen, expected = count, "worker registered");
        }
        Ok(())
    }
}

async fn accept_workers(
    listener: TcpListener,
    broadcaster: broadcast::Sender<PrimaryMessage>,
    registered_tx: mpsc::UnboundedSender<usize>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let broadcaster = broadcaster.clone();
                let registered_tx = registered_tx.clone();
                tokio::spawn(async move {
                    if let Err(error) = handle_worker(stream, broadcaster, registered_tx).await {
                        tracing::warn!(peer = %peer, error = %error, "control connection failed");
                    }
                });
            }
            Err(error) => {
                tracing::warn!(error = %error, "control accept failed");
            }
        }
    }
}

/// Serve one worker's control connection: relay its snapshots into the
/// broadcast, relay broadcasts back down to it.
async fn handle_worker(
    stream: TcpStream,
    broadcaster: broadcast::Sender<PrimaryMessage>,
    registered_tx: mpsc::UnboundedSender<usize>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let index = match read_message::<_, WorkerMessage>(&mut reader).await? {
        Some(WorkerMessage::Hello { index }) => index,
        Some(other) => bail!("expected hello, got {other:?}"),
        None => bail!("worker disconnected before handshake"),
    };

    // Subscribe before reporting the registration: once the primary counts
    // this worker, no broadcast may slip past it.
    let mut inbox = broadcaster.subscribe();
    let _ = registered_tx.send(index);

    // Inbound and outbound run as separate loops so a broadcast never
    // cancels a half-read frame.
    let inbound = async {
        loop {
            match read_message::<_, WorkerMessage>(&mut reader).await? {
                Some(WorkerMessage::StateChanged { users }) => {
                    tracing::debug!(worker = index, count = users.len(), "rebroadcasting snapshot");
                    // Send only fails with zero subscribers, i.e. no
                    // workers left to notify.
                    let _ = broadcaster.send(PrimaryMessage::Sync { users });
                }
                Some(WorkerMessage::Hello { .. }) => {
                    tracing::warn!(worker = index, "duplicate hello ignored");
                }
                None => break,
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    let outbound = async {
        loop {
            match inbox.recv().await {
                Ok(message) => write_message(&mut writer, &message).await?,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Safe to skip: the next snapshot carries the whole state.
                    tracing::warn!(worker = index, skipped, "worker lagging behind broadcasts");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        Ok::<_, anyhow::Error>(())
    };

    tokio::select! {
        result = inbound => result?,
        result = outbound => result?,
    }

    tracing::info!(worker = index, "worker control connection closed");
    Ok(())
}

/// Fork the worker fleet from the current executable. Role and wiring are
/// conveyed through reserved environment variables; each child dies with
/// the primary.
pub fn spawn_workers(config: &ClusterConfig, control_addr: SocketAddr) -> Result<Vec<Child>> {
    let exe = env::current_exe().context("cannot locate current executable")?;
    let mut children = Vec::with_capacity(config.workers);

    for index in 1..=config.workers {
        let child = Command::new(&exe)
            .env(WORKER_INDEX_ENV, index.to_string())
            .env(CONTROL_ADDR_ENV, control_addr.to_string())
            .env("HOST", &config.host)
            .env("PORT", config.port.to_string())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn worker {index}"))?;

        tracing::info!(
            worker = index,
            pid = child.id().unwrap_or_default(),
            port = config.worker_port(index),
            "worker spawned"
        );
        children.push(child);
    }
    Ok(children)
}

/// Run the primary: control hub first, then the fleet, then the public
/// balancer once every worker has registered.
pub async fn run(config: &ClusterConfig) -> Result<()> {
    let mut hub = ControlHub::start().await?;

    // Children are killed when these handles drop, i.e. when the primary
    // returns for any reason.
    let _children = spawn_workers(config, hub.addr())?;
    hub.wait_for_workers(config.workers).await?;

    let workers = (1..=config.workers)
        .map(|index| {
            let addr = config.worker_addr(index);
            WorkerBackend::new(index, &addr)
                .with_context(|| format!("invalid worker address {addr}"))
        })
        .collect::<Result<Vec<_>>>()?;
    let pool = Arc::new(WorkerPool::new(workers));

    let public_addr = config.public_addr();
    let listener = TcpListener::bind(&public_addr)
        .await
        .with_context(|| format!("failed to bind public address {public_addr}"))?;
    tracing::info!(address = %public_addr, workers = config.workers, "balancer ready");

    BalancerServer::new(pool)
        .run(listener)
        .await
        .context("balancer server failed")
}
