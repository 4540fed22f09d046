//! Worker pool configuration

use crate::params::QUEUE_SLOTS_PER_WORKER;

/// Sizing for the worker pool and dispatch queue
///
/// The output of a hasher never depends on these values, only its throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of worker threads armed per computation
    pub workers: usize,
    /// Capacity of the dispatch queue in blocks
    pub queue_depth: usize,
}

impl Config {
    /// Configuration with `workers` threads and a queue of two blocks per worker
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_depth: workers * QUEUE_SLOTS_PER_WORKER,
        }
    }

    /// Override the dispatch queue capacity (at least one block)
    pub fn queue_depth(mut self, depth: usize) -> Self {
        self.queue_depth = depth.max(1);
        self
    }
}

impl Default for Config {
    /// One worker per logical CPU
    fn default() -> Self {
        Self::with_workers(num_cpus::get())
    }
}
