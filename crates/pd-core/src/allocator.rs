//! Bucket allocation over the continuous LZP stream
//!
//! The encoder compressed all buckets as one stream; the metadata only says
//! how many entries each bucket owns. The allocator pulls bytes from the
//! session in budgeted chunks, hands each bucket exactly its entries, and
//! keeps whatever was decoded past that point for the next bucket.

use serde::{Deserialize, Serialize};

use crate::error::{FailingStage, UnderrunError};
use crate::lzp::LzpSession;
use crate::metadata::GroupRequest;

// =============================================================================
// Layout & Budget
// =============================================================================

/// How entries are laid out inside the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryLayout {
    /// Entries are non-empty runs between `separator` bytes.
    Delimited { separator: u8 },
    /// Entries are exactly `length` raw bytes wide, back to back.
    FixedWidth,
}

impl Default for EntryLayout {
    fn default() -> Self {
        Self::Delimited { separator: b' ' }
    }
}

/// Chunk sizing for session reads.
///
/// Only affects how many `expand` calls a bucket takes: surplus bytes are
/// carried over, so any positive budget decodes the same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetPolicy {
    /// Raw bytes requested per missing entry.
    pub bytes_per_entry: usize,
    pub min_chunk: usize,
    pub max_chunk: usize,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            bytes_per_entry: 25,
            min_chunk: 64,
            max_chunk: 16384,
        }
    }
}

impl BudgetPolicy {
    /// Bytes to request when `missing` entries are still needed.
    pub fn chunk_for(&self, missing: usize) -> usize {
        missing
            .saturating_mul(self.bytes_per_entry)
            .clamp(self.min_chunk, self.max_chunk.max(self.min_chunk))
    }
}

// =============================================================================
// Allocation
// =============================================================================

/// Half-open range of emitted stream offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreamSpan {
    pub start: usize,
    pub end: usize,
}

impl StreamSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Raw entries handed to one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Raw (unexpanded) entries, at most the requested count.
    pub entries: Vec<Vec<u8>>,
    /// Stream bytes attributed to this bucket.
    pub span: StreamSpan,
    /// Set when fewer entries than requested were available.
    pub shortfall: Option<FailingStage>,
}

/// Slices one session's output into buckets, in request order.
#[derive(Debug, Clone)]
pub struct GroupAllocator {
    layout: EntryLayout,
    budget: BudgetPolicy,
    /// Decoded bytes not yet attributed to any bucket.
    pending: Vec<u8>,
    /// Stream offset of `pending[0]`.
    assigned: usize,
    underrun: Option<UnderrunError>,
}

impl GroupAllocator {
    pub fn new(layout: EntryLayout, budget: BudgetPolicy) -> Self {
        Self {
            layout,
            budget,
            pending: Vec::new(),
            assigned: 0,
            underrun: None,
        }
    }

    /// Carve the next bucket out of the stream.
    pub fn allocate(&mut self, session: &mut LzpSession<'_>, request: &GroupRequest<'_>) -> Allocation {
        if request.count == 0 {
            return self.take(Vec::new(), 0, None);
        }

        match self.layout {
            EntryLayout::Delimited { separator } => self.allocate_delimited(session, request, separator),
            EntryLayout::FixedWidth => self.allocate_fixed(session, request),
        }
    }

    fn allocate_delimited(
        &mut self,
        session: &mut LzpSession<'_>,
        request: &GroupRequest<'_>,
        separator: u8,
    ) -> Allocation {
        let want = request.count;
        loop {
            let exhausted = self.underrun.is_some();
            let (ranges, _) = split_entries(&self.pending, separator, want, exhausted);
            if ranges.len() >= want || exhausted {
                break;
            }
            let chunk = self.budget.chunk_for(want - ranges.len());
            self.pull(session, chunk);
        }

        let (ranges, cut) = split_entries(&self.pending, separator, want, self.underrun.is_some());
        let entries = ranges.into_iter().map(|r| self.pending[r].to_vec()).collect::<Vec<_>>();
        let shortfall = self.shortfall(entries.len(), want);
        self.take(entries, cut, shortfall)
    }

    fn allocate_fixed(&mut self, session: &mut LzpSession<'_>, request: &GroupRequest<'_>) -> Allocation {
        let width = request.length as usize;
        if width == 0 {
            return self.take(Vec::new(), 0, Some(FailingStage::ZeroWidth));
        }

        let need = width.saturating_mul(request.count);
        while self.pending.len() < need && self.underrun.is_none() {
            self.pull(session, need - self.pending.len());
        }

        let have = (self.pending.len() / width).min(request.count);
        let entries = self.pending[..have * width]
            .chunks(width)
            .map(<[u8]>::to_vec)
            .collect::<Vec<_>>();
        let shortfall = self.shortfall(have, request.count);
        self.take(entries, have * width, shortfall)
    }

    fn pull(&mut self, session: &mut LzpSession<'_>, chunk: usize) {
        let expansion = session.expand(chunk);
        log::debug!(
            "pulled {} bytes ({} literal, {} mask bits)",
            expansion.output.len(),
            expansion.data_consumed,
            expansion.mask_bits_consumed
        );
        self.pending.extend_from_slice(&expansion.output);
        if expansion.underrun.is_some() {
            self.underrun = expansion.underrun;
        }
    }

    fn shortfall(&self, have: usize, want: usize) -> Option<FailingStage> {
        if have >= want {
            return None;
        }
        Some(self.underrun.map_or(FailingStage::DataUnderrun, FailingStage::from))
    }

    fn take(&mut self, entries: Vec<Vec<u8>>, cut: usize, shortfall: Option<FailingStage>) -> Allocation {
        let span = StreamSpan {
            start: self.assigned,
            end: self.assigned + cut,
        };
        self.pending.drain(..cut);
        self.assigned += cut;
        Allocation {
            entries,
            span,
            shortfall,
        }
    }

    /// Decoded bytes waiting for the next bucket.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Stream bytes already attributed to buckets.
    pub fn assigned(&self) -> usize {
        self.assigned
    }

    /// Underrun that ended the stream, if any.
    pub fn underrun(&self) -> Option<UnderrunError> {
        self.underrun
    }
}

/// Find up to `limit` non-empty entries in `buf`.
///
/// Returns the entry ranges and the offset just past the last taken entry
/// (including its terminating separator). An unterminated trailing run only
/// counts when `final_run` is set.
fn split_entries(
    buf: &[u8],
    separator: u8,
    limit: usize,
    final_run: bool,
) -> (Vec<std::ops::Range<usize>>, usize) {
    let mut ranges = Vec::new();
    let mut cut = 0;
    let mut start = None;

    for (i, &b) in buf.iter().enumerate() {
        if ranges.len() >= limit {
            break;
        }
        if b == separator {
            if let Some(s) = start.take() {
                ranges.push(s..i);
                cut = i + 1;
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if ranges.len() < limit && final_run {
        if let Some(s) = start {
            ranges.push(s..buf.len());
            cut = buf.len();
        }
    }

    (ranges, cut)
}
