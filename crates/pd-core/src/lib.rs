//! PacDecode Core Library
//!
//! Recovers the domain block-list packed into a proxy auto-config script.
//! The list is stored as one LZP-compressed stream driven by a base64
//! control mask, with common domain substrings folded into dictionary
//! tokens before compression.
//!
//! # Pipeline
//!
//! 1. `mask`: expand escapes and base64-decode the control mask.
//! 2. `lzp`: replay the context-predictive decoder over the literal data.
//! 3. `allocator`: slice the continuous output into zone/length buckets.
//! 4. `patterns`: expand dictionary tokens in each entry.
//!
//! `decode` sequences all of it for one payload.
//!
//! # Modules
//!
//! - `patterns`: mask escape and domain token dictionaries
//! - `mask`: control mask decoding and bit cursor
//! - `predictor`: predictor table and rolling context hash
//! - `lzp`: per-payload decode session
//! - `metadata`: zone/length bucket declarations
//! - `allocator`: bucket slicing over the stream
//! - `decode`: end-to-end pipeline and report types
//! - `error`: error types

pub mod allocator;
pub mod decode;
pub mod error;
pub mod lzp;
pub mod mask;
pub mod metadata;
pub mod patterns;
pub mod predictor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use allocator::{BudgetPolicy, EntryLayout, GroupAllocator, StreamSpan};
pub use decode::{decode_payload, decode_with_mask, payload_bytes, BucketOutcome, DecodeOptions, DecodeReport, DecodeStats, PayloadInput};
pub use error::{DecodeError, FailingStage, MaskDecodeError, PartialDecodeError, UnderrunError};
pub use lzp::{Expansion, LzpSession};
pub use mask::{decode_mask, RawMask};
pub use metadata::{GroupRequest, ZoneMetadata};
pub use patterns::{expand_domain_tokens, expand_mask_escapes};
pub use predictor::{ContextPredictor, TABLE_SIZE};
