//! LZP expansion session
//!
//! One [`LzpSession`] owns the predictor, the data cursor and the mask
//! cursor for a single payload. Buckets are carved out of it by repeated
//! [`LzpSession::expand`] calls; nothing is reset between calls.

use crate::error::UnderrunError;
use crate::mask::{MaskCursor, RawMask};
use crate::predictor::ContextPredictor;

/// Result of one [`LzpSession::expand`] call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expansion {
    /// Bytes emitted by this call.
    pub output: Vec<u8>,
    /// Literal data bytes consumed by this call.
    pub data_consumed: usize,
    /// Control bits consumed by this call. Always equals `output.len()`.
    pub mask_bits_consumed: usize,
    /// Set when the stream ran dry before `want` bytes were produced.
    pub underrun: Option<UnderrunError>,
}

/// Exclusive decode state for one payload.
#[derive(Debug)]
pub struct LzpSession<'a> {
    data: &'a [u8],
    data_pos: usize,
    mask: RawMask,
    cursor: MaskCursor,
    predictor: ContextPredictor,
    emitted: usize,
}

impl<'a> LzpSession<'a> {
    /// Start a session over `data` driven by `mask`, with a zeroed predictor.
    pub fn new(data: &'a [u8], mask: RawMask) -> Self {
        Self::with_predictor(data, mask, ContextPredictor::new())
    }

    /// Start a session with a caller-provided predictor.
    pub fn with_predictor(data: &'a [u8], mask: RawMask, predictor: ContextPredictor) -> Self {
        Self {
            data,
            data_pos: 0,
            mask,
            cursor: MaskCursor::new(),
            predictor,
            emitted: 0,
        }
    }

    /// Produce up to `want` bytes.
    ///
    /// Stops early when the mask or the data runs out. A literal bit that
    /// finds no data is left unconsumed.
    pub fn expand(&mut self, want: usize) -> Expansion {
        let mut output = Vec::with_capacity(want.min(self.cursor.remaining(&self.mask)));
        let data_start = self.data_pos;
        let mut underrun = None;

        while output.len() < want {
            let predicted = match self.cursor.peek(&self.mask) {
                Some(bit) => bit,
                None => {
                    underrun = Some(UnderrunError::MaskExhausted {
                        data_byte: self.data_pos,
                    });
                    break;
                }
            };

            let byte = if predicted {
                self.predictor.predict()
            } else {
                let Some(&literal) = self.data.get(self.data_pos) else {
                    underrun = Some(UnderrunError::DataExhausted {
                        mask_bit: self.cursor.position(),
                    });
                    break;
                };
                self.data_pos += 1;
                self.predictor.learn(literal);
                literal
            };

            self.cursor.advance();
            output.push(byte);
            self.predictor.update(byte);
        }

        self.emitted += output.len();
        Expansion {
            mask_bits_consumed: output.len(),
            data_consumed: self.data_pos - data_start,
            output,
            underrun,
        }
    }

    /// Whether no further byte can be produced.
    pub fn is_exhausted(&self) -> bool {
        match self.cursor.peek(&self.mask) {
            None => true,
            Some(true) => false,
            Some(false) => self.data_pos >= self.data.len(),
        }
    }

    /// Total bytes emitted by this session.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn data_consumed(&self) -> usize {
        self.data_pos
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    pub fn mask_bits_consumed(&self) -> usize {
        self.cursor.position()
    }

    pub fn mask_bits_total(&self) -> usize {
        self.mask.bit_len()
    }

    pub fn predictor(&self) -> &ContextPredictor {
        &self.predictor
    }
}
