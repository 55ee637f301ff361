//! Error taxonomy for the decode pipeline
//!
//! Only [`MaskDecodeError`] (and invalid options) abort a run. Stream
//! underruns are downgraded to a bucket-local [`PartialDecodeError`].

use serde::Serialize;

/// Failure while turning the encoded mask into raw control bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskDecodeError {
    #[error("Encoded mask is empty")]
    Empty,
    #[error("Encoded mask has invalid length {0} after escape expansion")]
    InvalidLength(usize),
    #[error("Base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// The LZP stream ran dry before the requested number of bytes was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnderrunError {
    /// A literal control bit was read but no data bytes remain.
    #[error("Data exhausted at mask bit {mask_bit}")]
    DataExhausted { mask_bit: usize },
    /// No control bits remain.
    #[error("Mask exhausted at data byte {data_byte}")]
    MaskExhausted { data_byte: usize },
}

/// Stage that caused a bucket to come up short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailingStage {
    DataUnderrun,
    MaskUnderrun,
    /// Fixed-width layout with a zero-length bucket.
    ZeroWidth,
}

impl From<UnderrunError> for FailingStage {
    fn from(err: UnderrunError) -> Self {
        match err {
            UnderrunError::DataExhausted { .. } => Self::DataUnderrun,
            UnderrunError::MaskExhausted { .. } => Self::MaskUnderrun,
        }
    }
}

/// A bucket produced fewer entries than its metadata declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Partial decode in zone '{zone}' length {length}: have {have}, want {want} ({stage:?})")]
pub struct PartialDecodeError {
    pub zone: String,
    pub length: u32,
    pub have: usize,
    pub want: usize,
    pub stage: FailingStage,
}

/// Fatal errors for a whole decode run.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Mask decode failed: {0}")]
    Mask(#[from] MaskDecodeError),
    #[error("Invalid decode options: {0}")]
    InvalidOptions(String),
    /// Payload characters are byte values; anything past U+00FF has no byte.
    #[error("Data character {ch:?} at index {index} is not a byte value")]
    DataOutOfRange { index: usize, ch: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_underrun() {
        assert_eq!(
            FailingStage::from(UnderrunError::DataExhausted { mask_bit: 3 }),
            FailingStage::DataUnderrun
        );
        assert_eq!(
            FailingStage::from(UnderrunError::MaskExhausted { data_byte: 9 }),
            FailingStage::MaskUnderrun
        );
    }

    #[test]
    fn test_data_out_of_range_message() {
        let err = DecodeError::DataOutOfRange { index: 4, ch: '\u{100}' };
        assert_eq!(err.to_string(), "Data character 'Ā' at index 4 is not a byte value");
    }

    #[test]
    fn test_partial_error_message() {
        let err = PartialDecodeError {
            zone: "ru".to_string(),
            length: 5,
            have: 2,
            want: 7,
            stage: FailingStage::DataUnderrun,
        };
        assert_eq!(
            err.to_string(),
            "Partial decode in zone 'ru' length 5: have 2, want 7 (DataUnderrun)"
        );
    }
}
