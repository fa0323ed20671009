//! Configuration schema and environment parsing.

use std::env;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved variable carrying a worker's 1-based index. Its presence is what
/// makes a process a worker instead of the primary.
pub const WORKER_INDEX_ENV: &str = "CLUSTER_WORKER_INDEX";

/// Reserved variable carrying the primary's control socket address.
pub const CONTROL_ADDR_ENV: &str = "CLUSTER_CONTROL_ADDR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("missing required variable {var}")]
    Missing { var: &'static str },

    #[error("PORT {port} leaves no room for {workers} worker ports")]
    PortRange { port: u16, workers: usize },
}

/// Runtime configuration, sourced from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Bind host for the balancer and every worker.
    pub host: String,

    /// Public port of the balancer; worker `i` serves on `port + i`.
    pub port: u16,

    /// Number of worker processes. Zero selects standalone mode: the users
    /// API served directly on the public port, no balancer, no replication.
    pub workers: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4000,
            workers: default_workers(),
        }
    }
}

/// One worker per core, keeping a core for the balancer, floor of one.
fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

impl ClusterConfig {
    /// Read configuration from `HOST`, `PORT` and `WORKERS`, falling back to
    /// defaults for absent variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: port.clone(),
            })?;
        }
        if let Ok(workers) = env::var("WORKERS") {
            config.workers = workers.parse().map_err(|_| ConfigError::Invalid {
                var: "WORKERS",
                value: workers.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Worker ports must not wrap around the u16 range.
    fn validate(&self) -> Result<(), ConfigError> {
        if u32::from(self.port) + self.workers as u32 > u32::from(u16::MAX) {
            return Err(ConfigError::PortRange {
                port: self.port,
                workers: self.workers,
            });
        }
        Ok(())
    }

    /// Address of the public-facing listener.
    pub fn public_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Private port of the worker with this 1-based index.
    pub fn worker_port(&self, index: usize) -> u16 {
        self.port + index as u16
    }

    /// Private address of the worker with this 1-based index.
    pub fn worker_addr(&self, index: usize) -> String {
        format!("{}:{}", self.host, self.worker_port(index))
    }
}

/// Identity handed to a worker process by the primary.
#[derive(Debug, Clone)]
pub struct WorkerEnv {
    /// 1-based index of this worker, doubling as its port offset.
    pub index: usize,

    /// Address of the primary's control socket.
    pub control_addr: String,
}

impl WorkerEnv {
    /// Detect the worker role. Returns `None` in processes the primary did
    /// not spawn.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(index) = env::var(WORKER_INDEX_ENV) else {
            return Ok(None);
        };
        let index = index.parse().map_err(|_| ConfigError::Invalid {
            var: WORKER_INDEX_ENV,
            value: index.clone(),
        })?;
        let control_addr = env::var(CONTROL_ADDR_ENV).map_err(|_| ConfigError::Missing {
            var: CONTROL_ADDR_ENV,
        })?;
        Ok(Some(Self {
            index,
            control_addr,
        }))
    }
}
