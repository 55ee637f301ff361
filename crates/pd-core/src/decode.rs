//! Payload decoding: mask, LZP session, buckets, pattern expansion
//!
//! [`decode_payload`] runs the whole pipeline for one payload. It owns a
//! single [`LzpSession`] for the duration of the run; independent payloads
//! can be decoded concurrently by calling it from separate threads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::allocator::{BudgetPolicy, EntryLayout, GroupAllocator, StreamSpan};
use crate::error::{DecodeError, PartialDecodeError, UnderrunError};
use crate::lzp::LzpSession;
use crate::mask::{decode_mask, RawMask};
use crate::metadata::ZoneMetadata;
use crate::patterns::{expand_domain_tokens, is_domain_token_byte, occurs_in_expansion};

// =============================================================================
// Inputs & Options
// =============================================================================

/// Already-extracted inputs for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadInput {
    /// Encoded control mask text.
    pub mask: String,
    /// Compressed literal data, one byte value (U+0000..=U+00FF) per character.
    pub data: String,
    /// Bucket declarations in stream order.
    pub zones: ZoneMetadata,
}

/// Tunables for a decode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub layout: EntryLayout,
    pub budget: BudgetPolicy,
}

impl DecodeOptions {
    /// Reject options that could split or corrupt entries.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if let EntryLayout::Delimited { separator } = self.layout {
            if is_domain_token_byte(separator) || occurs_in_expansion(separator) {
                return Err(DecodeError::InvalidOptions(format!(
                    "separator {:?} collides with the domain dictionary",
                    separator as char
                )));
            }
        }
        if self.budget.bytes_per_entry == 0 {
            return Err(DecodeError::InvalidOptions("bytes_per_entry must be positive".to_string()));
        }
        if self.budget.min_chunk == 0 || self.budget.min_chunk > self.budget.max_chunk {
            return Err(DecodeError::InvalidOptions(format!(
                "chunk bounds {}..={} are invalid",
                self.budget.min_chunk, self.budget.max_chunk
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Report
// =============================================================================

/// Result for one zone/length bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BucketOutcome {
    Decoded {
        domains: Vec<String>,
        span: StreamSpan,
    },
    Partial {
        error: PartialDecodeError,
        /// Entries that were recovered before the stream ran dry.
        recovered: Vec<String>,
        span: StreamSpan,
    },
}

impl BucketOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded { .. })
    }

    /// Domains of a fully decoded bucket.
    pub fn domains(&self) -> Option<&[String]> {
        match self {
            Self::Decoded { domains, .. } => Some(domains),
            Self::Partial { .. } => None,
        }
    }

    /// Space-joined domains, or `None` for a partial bucket.
    pub fn text(&self) -> Option<String> {
        self.domains().map(|d| d.join(" "))
    }

    pub fn error(&self) -> Option<&PartialDecodeError> {
        match self {
            Self::Decoded { .. } => None,
            Self::Partial { error, .. } => Some(error),
        }
    }

    pub fn span(&self) -> StreamSpan {
        match self {
            Self::Decoded { span, .. } | Self::Partial { span, .. } => *span,
        }
    }
}

/// Where every decoded and consumed byte went.
///
/// `bytes_emitted == bytes_assigned + bytes_pending` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StreamAccounting {
    pub data_total: usize,
    pub data_consumed: usize,
    pub mask_bits_total: usize,
    pub mask_bits_consumed: usize,
    pub bytes_emitted: usize,
    pub bytes_assigned: usize,
    pub bytes_pending: usize,
    /// Why the stream stopped, if it ran dry during the run.
    pub underrun: Option<UnderrunError>,
}

/// Summary counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DecodeStats {
    pub zones: usize,
    /// Zones with at least one fully decoded bucket.
    pub successful_zones: usize,
    pub buckets: usize,
    pub decoded_buckets: usize,
    pub partial_buckets: usize,
    pub domains_expected: usize,
    pub domains_recovered: usize,
}

impl DecodeStats {
    /// Recovered domains as a percentage of declared domains.
    pub fn efficiency(&self) -> f64 {
        if self.domains_expected == 0 {
            return 0.0;
        }
        self.domains_recovered as f64 / self.domains_expected as f64 * 100.0
    }
}

/// zone -> length -> outcome, plus accounting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeReport {
    pub zones: IndexMap<String, IndexMap<u32, BucketOutcome>>,
    pub accounting: StreamAccounting,
    pub stats: DecodeStats,
}

impl DecodeReport {
    pub fn bucket(&self, zone: &str, length: u32) -> Option<&BucketOutcome> {
        self.zones.get(zone)?.get(&length)
    }

    /// All fully decoded domains in stream order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.zones
            .values()
            .flat_map(IndexMap::values)
            .filter_map(BucketOutcome::domains)
            .flatten()
            .map(String::as_str)
    }

    pub fn errors(&self) -> impl Iterator<Item = &PartialDecodeError> {
        self.zones
            .values()
            .flat_map(IndexMap::values)
            .filter_map(BucketOutcome::error)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Decode one payload end to end.
///
/// Fails only on invalid options or an undecodable mask; short buckets are
/// reported inside the returned [`DecodeReport`].
pub fn decode_payload(input: &PayloadInput, options: &DecodeOptions) -> Result<DecodeReport, DecodeError> {
    options.validate()?;
    let data = payload_bytes(&input.data)?;
    let mask = decode_mask(&input.mask)?;
    Ok(decode_with_mask(&data, mask, &input.zones, options))
}

/// Map payload characters to the byte values they stand for.
pub fn payload_bytes(data: &str) -> Result<Vec<u8>, DecodeError> {
    data.chars()
        .enumerate()
        .map(|(index, ch)| u8::try_from(ch).map_err(|_| DecodeError::DataOutOfRange { index, ch }))
        .collect()
}

/// Decode with an already-decoded mask.
pub fn decode_with_mask(data: &[u8], mask: RawMask, zones: &ZoneMetadata, options: &DecodeOptions) -> DecodeReport {
    if zones.is_empty() {
        log::warn!("no zone metadata, nothing to decode");
    }

    let mut session = LzpSession::new(data, mask);
    let mut allocator = GroupAllocator::new(options.layout, options.budget);
    let mut out: IndexMap<String, IndexMap<u32, BucketOutcome>> = IndexMap::new();
    let mut stats = DecodeStats {
        zones: zones.zone_count(),
        domains_expected: zones.expected_entries(),
        ..DecodeStats::default()
    };

    for request in zones.requests() {
        let allocation = allocator.allocate(&mut session, &request);
        let domains: Vec<String> = allocation
            .entries
            .iter()
            .map(|raw| expand_domain_tokens(raw))
            .collect();

        stats.buckets += 1;
        let outcome = match allocation.shortfall {
            None => {
                log::debug!(
                    "zone {} length {}: {} entries from {} bytes",
                    request.zone,
                    request.length,
                    domains.len(),
                    allocation.span.len()
                );
                stats.decoded_buckets += 1;
                stats.domains_recovered += domains.len();
                BucketOutcome::Decoded {
                    domains,
                    span: allocation.span,
                }
            }
            Some(stage) => {
                let error = PartialDecodeError {
                    zone: request.zone.to_string(),
                    length: request.length,
                    have: domains.len(),
                    want: request.count,
                    stage,
                };
                log::warn!("{error}");
                stats.partial_buckets += 1;
                BucketOutcome::Partial {
                    error,
                    recovered: domains,
                    span: allocation.span,
                }
            }
        };

        out.entry(request.zone.to_string())
            .or_default()
            .insert(request.length, outcome);
    }

    stats.successful_zones = out
        .values()
        .filter(|buckets| buckets.values().any(BucketOutcome::is_decoded))
        .count();

    let accounting = StreamAccounting {
        data_total: session.data_len(),
        data_consumed: session.data_consumed(),
        mask_bits_total: session.mask_bits_total(),
        mask_bits_consumed: session.mask_bits_consumed(),
        bytes_emitted: session.emitted(),
        bytes_assigned: allocator.assigned(),
        bytes_pending: allocator.pending().len(),
        underrun: allocator.underrun(),
    };

    log::info!(
        "decoded {}/{} buckets, {}/{} domains ({:.1}%)",
        stats.decoded_buckets,
        stats.buckets,
        stats.domains_recovered,
        stats.domains_expected,
        stats.efficiency()
    );

    DecodeReport {
        zones: out,
        accounting,
        stats,
    }
}
