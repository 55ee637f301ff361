//! Zone metadata: which buckets the decoded stream is sliced into

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered zone -> (length bucket -> expected entry count).
///
/// Declaration order is significant: it decides which slice of the single
/// continuous stream belongs to which bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneMetadata {
    zones: IndexMap<String, IndexMap<u32, usize>>,
}

/// One bucket to carve out of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRequest<'a> {
    pub zone: &'a str,
    pub length: u32,
    pub count: usize,
}

impl ZoneMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a bucket. Re-declaring a bucket replaces its count but keeps
    /// its original position.
    pub fn insert(&mut self, zone: &str, length: u32, count: usize) {
        self.zones
            .entry(zone.to_string())
            .or_default()
            .insert(length, count);
    }

    /// Buckets in declaration order.
    pub fn requests(&self) -> impl Iterator<Item = GroupRequest<'_>> {
        self.zones.iter().flat_map(|(zone, buckets)| {
            buckets.iter().map(move |(&length, &count)| GroupRequest {
                zone: zone.as_str(),
                length,
                count,
            })
        })
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn bucket_count(&self) -> usize {
        self.zones.values().map(IndexMap::len).sum()
    }

    /// Sum of all declared entry counts.
    pub fn expected_entries(&self) -> usize {
        self.zones.values().flat_map(IndexMap::values).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
