//! Round-robin worker selection.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::balancer::pool::WorkerBackend;
use crate::balancer::Balancer;

/// Rotates through the worker list in fixed order, wrapping at the end.
/// An internal counter carries the rotation across requests.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Balancer for RoundRobin {
    fn next_worker<'a>(&self, workers: &'a [WorkerBackend]) -> Option<&'a WorkerBackend> {
        if workers.is_empty() {
            return None;
        }
        let index = self.counter.fetch_add(1, Ordering::Relaxed) % workers.len();
        workers.get(index)
    }
}
