//! Stream segmentation into indexed blocks

use zeroize::{Zeroize, Zeroizing};

use crate::params::BLOCK_SIZE;

/// One indexed slice of input
pub(crate) struct Block {
    pub index: u64,
    pub bytes: Zeroizing<Vec<u8>>,
}

impl Block {
    pub fn new(index: u64, bytes: &[u8]) -> Self {
        Self {
            index,
            bytes: Zeroizing::new(bytes.to_vec()),
        }
    }
}

/// Cuts arbitrarily chunked writes into full blocks with contiguous indexes
///
/// Bytes that do not yet fill a block are held back in `pending`.
pub(crate) struct Segmenter {
    pending: Zeroizing<Vec<u8>>,
    next_index: u64,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            pending: Zeroizing::new(Vec::with_capacity(BLOCK_SIZE)),
            next_index: 0,
        }
    }

    /// Index the next dispatched block will receive
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Feed `data`, handing every completed block to `emit` in index order
    pub fn push(&mut self, mut data: &[u8], mut emit: impl FnMut(Block)) -> usize {
        let count = data.len();

        if !self.pending.is_empty() {
            let take = (BLOCK_SIZE - self.pending.len()).min(data.len());
            self.pending.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.pending.len() < BLOCK_SIZE {
                return count;
            }
            emit(Block::new(self.next_index, &self.pending));
            self.pending.zeroize();
            self.next_index += 1;
        }

        let mut chunks = data.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            emit(Block::new(self.next_index, chunk));
            self.next_index += 1;
        }
        self.pending.extend_from_slice(chunks.remainder());

        count
    }

    /// Block finalize must synthesize, if any
    ///
    /// A computation that wrote nothing still gets one empty block at index 0.
    /// A computation ending on a block boundary needs no synthetic block.
    /// Neither `pending` nor `next_index` is consumed.
    pub fn final_block(&self) -> Option<Block> {
        if !self.pending.is_empty() || self.next_index == 0 {
            Some(Block::new(self.next_index, &self.pending))
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.pending.zeroize();
        self.next_index = 0;
    }
}
