//! Process cluster and replication subsystem.
//!
//! # Data Flow
//! ```text
//! primary startup:
//!     bind loopback control socket (ephemeral port)
//!     → fork workers from the current executable (role via environment)
//!     → wait for every worker's hello on the control socket
//!     → open the public balancer
//!
//! replication:
//!     worker mutates its store
//!     → state_changed { users } over the worker's control connection
//!     → primary re-broadcasts sync { users } to every worker (originator too)
//!     → each worker replaces its store wholesale
//! ```
//!
//! # Design Decisions
//! - Snapshots only, never diffs: the latest broadcast wins, and a worker
//!   that misses one is made whole by the next
//! - A worker whose control connection closes shuts itself down; a primary
//!   that exits takes its fleet with it (`kill_on_drop`)
//! - No delivery guarantees beyond TCP ordering per connection — reads
//!   served between a write and its broadcast may be stale by design

pub mod primary;
pub mod protocol;
pub mod worker;

pub use worker::Replicator;
