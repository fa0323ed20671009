//! Worker pool bookkeeping.
//!
//! # Responsibilities
//! - Hold the fixed set of workers behind the balancer
//! - Apply the selection strategy to pick a worker per request

use axum::http::uri::Authority;
use axum::http::uri::InvalidUri;
use std::str::FromStr;

use crate::balancer::round_robin::RoundRobin;
use crate::balancer::Balancer;

/// A single worker process, as seen from the balancer.
#[derive(Debug, Clone)]
pub struct WorkerBackend {
    /// 1-based worker index; also its port offset from the public port.
    pub index: usize,

    /// Authority of the worker's private listener, pre-parsed so request
    /// forwarding only clones it.
    pub authority: Authority,
}

impl WorkerBackend {
    pub fn new(index: usize, addr: &str) -> Result<Self, InvalidUri> {
        let authority = Authority::from_str(addr)?;
        Ok(Self { index, authority })
    }
}

/// The fixed, immutable set of workers behind the balancer.
///
/// Built once at startup after every worker has registered. Worker failures
/// are not tracked here: a dead worker surfaces as a 500 on the requests
/// routed to it.
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<WorkerBackend>,
    balancer: Box<dyn Balancer>,
}

impl WorkerPool {
    pub fn new(workers: Vec<WorkerBackend>) -> Self {
        Self {
            workers,
            balancer: Box::new(RoundRobin::new()),
        }
    }

    /// Pick the worker that serves the next request.
    pub fn next(&self) -> Option<&WorkerBackend> {
        self.balancer.next_worker(&self.workers)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
