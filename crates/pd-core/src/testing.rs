//! Matching encoder used by the unit tests

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};

use crate::decode::PayloadInput;
use crate::metadata::ZoneMetadata;
use crate::patterns::{DOMAIN_PATTERNS, MASK_ESCAPES};
use crate::predictor::ContextPredictor;

/// LZP-compress `text`, returning (literal data, raw mask bytes).
pub(crate) fn encode_lzp(text: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut predictor = ContextPredictor::new();
    let mut data = Vec::new();
    let mut mask = vec![0u8; text.len().div_ceil(8)];

    for (i, &byte) in text.iter().enumerate() {
        if predictor.predict() == byte {
            mask[i >> 3] |= 1 << (i & 7);
        } else {
            predictor.learn(byte);
            data.push(byte);
        }
        predictor.update(byte);
    }

    (data, mask)
}

/// Base64-encode raw mask bytes and fold runs into escape symbols.
pub(crate) fn encode_mask_text(mask: &[u8]) -> String {
    let mut text = STANDARD_NO_PAD.encode(mask);
    for (symbol, pair) in MASK_ESCAPES {
        text = text.replace(pair, &(*symbol as char).to_string());
    }
    text
}

/// Replace domain substrings with dictionary tokens.
pub(crate) fn compress_domain(domain: &str) -> String {
    let mut text = domain.to_string();
    for (token, expansion) in DOMAIN_PATTERNS {
        text = text.replace(expansion, token);
    }
    text
}

/// Build a complete payload from plain buckets: (zone, length, domains).
pub(crate) fn build_payload(buckets: &[(&str, u32, &[&str])], separator: u8) -> PayloadInput {
    let mut zones = ZoneMetadata::new();
    let mut stream = Vec::new();
    for (zone, length, domains) in buckets {
        zones.insert(zone, *length, domains.len());
        for domain in domains.iter() {
            stream.extend_from_slice(compress_domain(domain).as_bytes());
            stream.push(separator);
        }
    }

    let (data, mask) = encode_lzp(&stream);
    PayloadInput {
        mask: encode_mask_text(&mask),
        data: String::from_utf8(data).expect("compressed domains are ascii"),
        zones,
    }
}
