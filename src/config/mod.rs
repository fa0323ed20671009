//! Configuration management.
//!
//! # Data Flow
//! ```text
//! process environment (HOST, PORT, WORKERS)
//!     → schema.rs (parse & validate)
//!     → ClusterConfig (validated, immutable)
//!     → shared by the primary, every worker, and standalone mode
//!
//! primary → worker handoff:
//!     CLUSTER_WORKER_INDEX / CLUSTER_CONTROL_ADDR set on the child process
//!     → WorkerEnv::from_env() detects the worker role at startup
//! ```
//!
//! # Design Decisions
//! - The environment is the only configuration surface; there are no CLI
//!   flags and no config files
//! - Invalid numeric variables are startup errors, never silent defaults
//! - Worker identity travels through reserved variables so the same binary
//!   can play both roles, the way a forked process inherits its role

pub mod schema;

pub use schema::{ClusterConfig, ConfigError, WorkerEnv};
pub use schema::{CONTROL_ADDR_ENV, WORKER_INDEX_ENV};
