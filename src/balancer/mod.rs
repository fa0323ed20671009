//! Load balancing subsystem: the public entry point of the cluster.
//!
//! # Data Flow
//! ```text
//! Inbound request on the public port
//!     → proxy.rs (any-route handler)
//!     → pool.rs (fixed worker set)
//!     → round_robin.rs (pick the next worker, wrap at the end)
//!     → forward to the worker's private port, relay the response verbatim
//! ```
//!
//! # Design Decisions
//! - The balancer owns no business data; it only forwards and relays
//! - Worker selection is blind rotation: no health tracking, no retries —
//!   a worker that cannot be reached turns into a 500 for that request
//! - The worker set is frozen at startup, so selection needs no locks

pub mod pool;
pub mod proxy;
pub mod round_robin;

use self::pool::WorkerBackend;

/// Strategy for picking the worker that serves the next request.
pub trait Balancer: Send + Sync + std::fmt::Debug {
    fn next_worker<'a>(&self, workers: &'a [WorkerBackend]) -> Option<&'a WorkerBackend>;
}

pub use pool::WorkerPool;
pub use proxy::BalancerServer;
pub use round_robin::RoundRobin;
