//! LZP control mask decoding
//!
//! The encoded mask is base64 text with common runs folded into punctuation
//! escapes. Decoding expands the escapes, pads to a multiple of four and
//! base64-decodes the result. Each raw byte carries eight control bits,
//! consumed low bit first.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use crate::error::MaskDecodeError;
use crate::patterns::expand_mask_escapes;

/// Standard alphabet, lenient about padding and the unused bits of the
/// final symbol, matching browser `atob`.
const MASK_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decoded control bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMask {
    bytes: Vec<u8>,
}

impl RawMask {
    /// Wrap already-decoded control bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Total number of control bits.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Control bit at absolute position `index`, low bit first within a byte.
    #[inline]
    pub fn bit(&self, index: usize) -> Option<bool> {
        self.bytes
            .get(index >> 3)
            .map(|byte| byte & (1 << (index & 7)) != 0)
    }

    /// Number of set ("predict") bits.
    pub fn predicted_bits(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}

/// Read position into a [`RawMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskCursor {
    position: usize,
}

impl MaskCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bits consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Look at the next control bit without consuming it.
    #[inline]
    pub fn peek(&self, mask: &RawMask) -> Option<bool> {
        mask.bit(self.position)
    }

    #[inline]
    pub fn advance(&mut self) {
        self.position += 1;
    }

    pub fn remaining(&self, mask: &RawMask) -> usize {
        mask.bit_len().saturating_sub(self.position)
    }
}

/// Decode an encoded mask string into raw control bytes.
pub fn decode_mask(encoded: &str) -> Result<RawMask, MaskDecodeError> {
    if encoded.is_empty() {
        return Err(MaskDecodeError::Empty);
    }

    let mut text = expand_mask_escapes(encoded);

    // A single dangling character can never be valid base64
    if text.len() % 4 == 1 {
        return Err(MaskDecodeError::InvalidLength(text.len()));
    }
    while text.len() % 4 != 0 {
        text.push('=');
    }

    let bytes = MASK_ENGINE.decode(text.as_bytes())?;
    log::debug!("decoded mask: {} chars -> {} bytes", encoded.len(), bytes.len());
    Ok(RawMask { bytes })
}
