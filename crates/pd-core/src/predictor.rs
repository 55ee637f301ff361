//! Context predictor shared by one LZP session
//!
//! A fixed table of [`TABLE_SIZE`] byte slots addressed by a rolling hash
//! over everything emitted so far:
//!
//! ```text
//! hash' = ((hash << 7) ^ byte) mod TABLE_SIZE
//! ```
//!
//! Literal bytes are stored at the current hash before the update; predicted
//! bytes are only read. Collisions are expected and never resolved.

/// log2 of the table size.
pub const TABLE_BITS: u32 = 18;

/// Number of predictor slots (2^18).
pub const TABLE_SIZE: usize = 1 << TABLE_BITS;

const HASH_MASK: u32 = (TABLE_SIZE as u32) - 1;

/// Advance a context hash by one emitted byte.
#[inline]
pub const fn next_hash(hash: u32, byte: u8) -> u32 {
    ((hash << 7) ^ byte as u32) & HASH_MASK
}

/// Predictor table plus its rolling context hash.
#[derive(Clone)]
pub struct ContextPredictor {
    table: Box<[u8]>,
    hash: u32,
}

impl ContextPredictor {
    /// Zeroed table, hash 0.
    pub fn new() -> Self {
        Self {
            table: vec![0u8; TABLE_SIZE].into_boxed_slice(),
            hash: 0,
        }
    }

    /// Current context hash, always in `[0, TABLE_SIZE)`.
    #[inline]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Byte predicted for the current context. Does not write.
    #[inline]
    pub fn predict(&self) -> u8 {
        self.table[self.hash as usize]
    }

    /// Record a literal byte at the current context. Does not update the hash.
    #[inline]
    pub fn learn(&mut self, byte: u8) {
        self.table[self.hash as usize] = byte;
    }

    /// Fold an emitted byte into the context hash.
    #[inline]
    pub fn update(&mut self, byte: u8) {
        self.hash = next_hash(self.hash, byte);
    }

    /// Slot value at `index` (test and diagnostics access).
    pub fn slot(&self, index: usize) -> Option<u8> {
        self.table.get(index).copied()
    }

    /// Overwrite the slot at `index`.
    pub fn seed(&mut self, index: usize, byte: u8) {
        if let Some(slot) = self.table.get_mut(index) {
            *slot = byte;
        }
    }
}

impl Default for ContextPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextPredictor")
            .field("hash", &self.hash)
            .field("table_size", &self.table.len())
            .finish()
    }
}
