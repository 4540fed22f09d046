//! Dispatch queue and worker pool
//!
//! A pool lives for exactly one computation: it is armed, fed blocks through
//! a bounded queue, then drained. Draining closes the queue, lets the workers
//! finish whatever is still queued, and waits on the completion barrier.
//!
//! Without the `parallel` feature blocks are chained inline on the writer's
//! thread; the resulting digests are identical.

use std::sync::Arc;

#[cfg(feature = "parallel")]
use std::sync::mpsc::{self, Receiver, SendError, SyncSender};
#[cfg(feature = "parallel")]
use std::sync::{Condvar, Mutex, PoisonError};
#[cfg(feature = "parallel")]
use std::thread;

use crate::chain::{ChainTable, consume};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::segment::Block;

/// State shared between the dispatcher and its workers
#[cfg(feature = "parallel")]
struct Shared {
    chain: Arc<ChainTable>,
    queue: Mutex<Receiver<Block>>,
    /// Workers that have not exited yet
    active: Mutex<usize>,
    idle: Condvar,
    /// First failure raised during this computation
    failure: Mutex<Option<Error>>,
}

#[cfg(feature = "parallel")]
impl Shared {
    fn fail(&self, err: Error) {
        log::error!("hash worker failed: {err}");
        let mut slot = self.failure.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(err);
        }
        drop(slot);
        self.chain.poison();
    }

    fn next_block(&self) -> Option<Block> {
        match self.queue.lock() {
            Ok(queue) => queue.recv().ok(),
            Err(_) => {
                self.fail(Error::sync("dispatch queue lock poisoned"));
                None
            }
        }
    }

    fn failure(&self) -> Option<Error> {
        self.failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Leaves the completion barrier when a worker exits, including by unwinding
#[cfg(feature = "parallel")]
struct ActiveGuard<'a>(&'a Shared);

#[cfg(feature = "parallel")]
impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0
                .fail(Error::sync("worker panicked while chaining a block"));
        }
        let mut active = self.0.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        drop(active);
        self.0.idle.notify_all();
    }
}

/// Worker loop: pull blocks until the queue is closed and empty
///
/// After a failure the remaining blocks are still drained (so the dispatcher
/// never blocks on a full queue) but no longer chained.
#[cfg(feature = "parallel")]
fn run_worker(shared: Arc<Shared>) {
    let _active = ActiveGuard(&shared);
    while let Some(block) = shared.next_block() {
        if shared.chain.is_poisoned() {
            continue;
        }
        if let Err(err) = consume(&shared.chain, &block) {
            shared.fail(err);
        }
    }
}

/// One-shot pool of interchangeable chain workers
#[cfg(feature = "parallel")]
pub(crate) struct WorkerPool {
    sender: Option<SyncSender<Block>>,
    shared: Arc<Shared>,
    _threads: rayon::ThreadPool,
}

#[cfg(feature = "parallel")]
impl WorkerPool {
    /// Spawn `config.workers` workers chaining into `chain`
    pub fn arm(config: &Config, chain: Arc<ChainTable>) -> Result<Self> {
        let (sender, receiver) = mpsc::sync_channel(config.queue_depth);
        let shared = Arc::new(Shared {
            chain,
            queue: Mutex::new(receiver),
            active: Mutex::new(config.workers),
            idle: Condvar::new(),
            failure: Mutex::new(None),
        });

        let threads = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("rathash-worker-{i}"))
            // Unwinding is already recorded by `ActiveGuard`.
            .panic_handler(|_| log::error!("rathash worker unwound"))
            .build()
            .map_err(|e| Error::Spawn(e.to_string()))?;

        for _ in 0..config.workers {
            let shared = Arc::clone(&shared);
            threads.spawn(move || run_worker(shared));
        }

        log::debug!(
            "armed {} workers, queue depth {}",
            config.workers,
            config.queue_depth
        );

        Ok(Self {
            sender: Some(sender),
            shared,
            _threads: threads,
        })
    }

    /// Queue a block, blocking while the queue is full
    pub fn dispatch(&mut self, block: Block) {
        let Some(sender) = &self.sender else {
            self.shared.fail(Error::sync(format!(
                "block {} dispatched to a drained pool",
                block.index
            )));
            return;
        };
        if let Err(SendError(block)) = sender.send(block) {
            self.shared.fail(Error::sync(format!(
                "dispatch queue disconnected at block {}",
                block.index
            )));
        }
    }

    /// Close the queue and wait until every worker has exited
    ///
    /// Returns the first failure any worker reported. Draining twice is a no-op.
    pub fn drain(&mut self) -> Result<()> {
        drop(self.sender.take());

        let mut active = self
            .shared
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        while *active > 0 {
            active = self
                .shared
                .idle
                .wait(active)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(active);

        match self.shared.failure() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Serial stand-in for the pool: blocks are chained as they are dispatched
#[cfg(not(feature = "parallel"))]
pub(crate) struct WorkerPool {
    chain: Arc<ChainTable>,
    failure: Option<Error>,
}

#[cfg(not(feature = "parallel"))]
impl WorkerPool {
    pub fn arm(_config: &Config, chain: Arc<ChainTable>) -> Result<Self> {
        log::debug!("armed serial chain (parallel feature disabled)");
        Ok(Self {
            chain,
            failure: None,
        })
    }

    pub fn dispatch(&mut self, block: Block) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = consume(&self.chain, &block) {
            log::error!("chaining block {} failed: {err}", block.index);
            self.chain.poison();
            self.failure = Some(err);
        }
    }

    pub fn drain(&mut self) -> Result<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Workers must be gone before the chain table can be retired.
        let _ = self.drain();
    }
}
