//! Shared chain table
//!
//! Maps block index to chain value. Entries are write-once: the worker that
//! owns block `i` inserts `chain[i]` exactly once, and only after reading
//! `chain[i - 1]`. Readers block on a condition variable until the entry they
//! need appears or the table is poisoned by a failing worker.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};

use zeroize::{Zeroize, Zeroizing};

use crate::error::{Error, Result};
use crate::primitives::{ChainValue, chain_iv, chain_step};
use crate::segment::Block;

#[derive(Default)]
struct Entries {
    values: HashMap<u64, ChainValue>,
    poisoned: bool,
}

impl Entries {
    /// Scrub `chain[index]` where it lives, then drop it from the map
    ///
    /// `HashMap::remove` moves the value out and leaves the bucket bytes
    /// behind, so the entry is overwritten before it is removed.
    fn retire(&mut self, index: u64) {
        if let Some(value) = self.values.get_mut(&index) {
            value.zeroize();
        }
        self.values.remove(&index);
    }
}

/// Write-once map from block index to chain value
#[derive(Default)]
pub(crate) struct ChainTable {
    entries: Mutex<Entries>,
    published: Condvar,
}

impl ChainTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Entries>> {
        self.entries
            .lock()
            .map_err(|_| Error::sync("chain table lock poisoned"))
    }

    /// Block until `chain[index]` exists and return a copy of it
    pub fn wait_for(&self, index: u64) -> Result<Zeroizing<ChainValue>> {
        let mut entries = self.lock()?;
        loop {
            if entries.poisoned {
                return Err(Error::sync(format!(
                    "computation aborted while waiting for chain entry {index}"
                )));
            }
            if let Some(value) = entries.values.get(&index) {
                return Ok(Zeroizing::new(*value));
            }
            entries = self
                .published
                .wait(entries)
                .map_err(|_| Error::sync("chain table lock poisoned"))?;
        }
    }

    /// Publish `chain[index]` and wake every waiter
    ///
    /// `chain[index - 2]` is retired here: once `chain[index]` exists nothing
    /// can depend on it any more.
    pub fn insert(&self, index: u64, value: ChainValue) -> Result<()> {
        let mut entries = self.lock()?;
        if entries.values.contains_key(&index) {
            return Err(Error::sync(format!("chain entry {index} written twice")));
        }
        entries.values.insert(index, value);
        if let Some(stale) = index.checked_sub(2) {
            entries.retire(stale);
        }
        drop(entries);

        self.published.notify_all();
        Ok(())
    }

    pub fn get(&self, index: u64) -> Result<Option<Zeroizing<ChainValue>>> {
        Ok(self.lock()?.values.get(&index).map(|v| Zeroizing::new(*v)))
    }

    /// Retire a single entry (finalize's synthetic block rollback)
    pub fn remove(&self, index: u64) -> Result<()> {
        self.lock()?.retire(index);
        Ok(())
    }

    /// Mark the computation as failed and release every waiter
    pub fn poison(&self) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.poisoned = true;
        drop(entries);
        self.published.notify_all();
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    pub fn is_poisoned(&self) -> bool {
        self.entries.lock().map(|e| e.poisoned).unwrap_or(true)
    }

    /// Zeroize every entry and clear the poison flag
    pub fn clear(&self) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for value in entries.values.values_mut() {
            value.zeroize();
        }
        entries.values.clear();
        entries.poisoned = false;
        self.entries.clear_poison();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.values.len()).unwrap_or(0)
    }
}

/// Compute and publish the chain value of `block`
///
/// Waits for the predecessor first, so blocks complete in index order no
/// matter which worker picked them up.
pub(crate) fn consume(table: &ChainTable, block: &Block) -> Result<()> {
    let prev = match block.index {
        0 => Zeroizing::new(chain_iv()),
        i => table.wait_for(i - 1)?,
    };
    let value = chain_step(&prev, block.index, &block.bytes);
    log::trace!("chained block {} ({} bytes)", block.index, block.bytes.len());
    table.insert(block.index, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_insert_is_write_once() {
        let table = ChainTable::new();
        table.insert(0, [1u8; 32]).unwrap();
        assert!(matches!(
            table.insert(0, [2u8; 32]),
            Err(Error::Synchronization(_))
        ));
        assert_eq!(*table.get(0).unwrap().unwrap(), [1u8; 32]);
    }

    #[test]
    fn test_old_entries_are_retired() {
        let table = ChainTable::new();
        for i in 0..5 {
            table.insert(i, [i as u8; 32]).unwrap();
        }
        assert_eq!(table.len(), 2);
        assert!(table.get(2).unwrap().is_none());
        assert!(table.get(3).unwrap().is_some());
        assert!(table.get(4).unwrap().is_some());
    }

    #[test]
    fn test_retired_entries_are_scrubbed_in_place() {
        let table = ChainTable::new();
        table.insert(0, [0xA5u8; 32]).unwrap();
        table.insert(1, [0x5Au8; 32]).unwrap();

        let mut entries = table.lock().unwrap();
        let slot: *const ChainValue = entries.values.get(&0).unwrap();
        entries.retire(0);
        assert!(!entries.values.contains_key(&0));

        // SAFETY: removing an entry never shrinks or frees the table's
        // allocation, so the old bucket is still readable memory.
        let left_behind = unsafe { std::ptr::read_volatile(slot) };
        assert_eq!(left_behind, [0u8; 32]);
    }

    #[test]
    fn test_waiter_sees_later_insert() {
        let table = Arc::new(ChainTable::new());
        let waiter = {
            let table = Arc::clone(&table);
            thread::spawn(move || table.wait_for(7).map(|v| *v))
        };

        thread::sleep(Duration::from_millis(20));
        table.insert(7, [9u8; 32]).unwrap();
        assert_eq!(waiter.join().unwrap().unwrap(), [9u8; 32]);
    }

    #[test]
    fn test_poison_releases_waiters() {
        let table = Arc::new(ChainTable::new());
        let waiter = {
            let table = Arc::clone(&table);
            thread::spawn(move || table.wait_for(3).map(|v| *v))
        };

        thread::sleep(Duration::from_millis(20));
        table.poison();
        assert!(matches!(
            waiter.join().unwrap(),
            Err(Error::Synchronization(_))
        ));

        table.clear();
        assert!(!table.is_poisoned());
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn test_out_of_order_consumers_chain_in_order() {
        let table = Arc::new(ChainTable::new());
        let blocks: Vec<Block> = (0..6u64)
            .map(|i| Block::new(i, &[i as u8; 100]))
            .collect();

        let handles: Vec<_> = blocks
            .into_iter()
            .rev()
            .map(|block| {
                let table = Arc::clone(&table);
                thread::spawn(move || consume(&table, &block))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let mut expected = chain_iv();
        for i in 0..6u64 {
            expected = chain_step(&expected, i, &[i as u8; 100]);
        }
        assert_eq!(*table.get(5).unwrap().unwrap(), expected);
    }
}
