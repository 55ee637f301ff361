//! End-to-end decoding of payloads whose mask marks every byte as a literal.

use pd_core::{decode_payload, BucketOutcome, DecodeOptions, EntryLayout, FailingStage, PayloadInput, ZoneMetadata};

/// "!" expands to "AA"; four of them decode to six zero mask bytes (48 literal bits).
const ALL_LITERAL_MASK: &str = "!!!!";

fn payload(data: &str, zones: &[(&str, u32, usize)]) -> PayloadInput {
    let mut meta = ZoneMetadata::new();
    for (zone, length, count) in zones {
        meta.insert(zone, *length, *count);
    }
    PayloadInput {
        mask: ALL_LITERAL_MASK.to_string(),
        data: data.to_string(),
        zones: meta,
    }
}

#[test]
fn decodes_literal_stream_into_buckets() {
    let input = payload("!DHDt !Ahub x!K ", &[("ru", 5, 2), ("com", 1, 1)]);
    let report = decode_payload(&input, &DecodeOptions::default()).expect("mask is valid");

    let ru = report.bucket("ru", 5).expect("bucket exists");
    assert_eq!(ru.domains().unwrap(), &["kinostart", "pornhub"]);
    assert_eq!(report.bucket("com", 1).unwrap().text().unwrap(), "x.com");
    assert_eq!(report.accounting.bytes_emitted, 16);
    assert_eq!(report.accounting.bytes_pending, 0);
}

#[test]
fn short_stream_marks_bucket_partial_and_continues() {
    let input = payload("aa bb", &[("ru", 2, 3), ("org", 2, 1)]);
    let report = decode_payload(&input, &DecodeOptions::default()).expect("mask is valid");

    match report.bucket("ru", 2).unwrap() {
        BucketOutcome::Partial { error, recovered, .. } => {
            assert_eq!((error.have, error.want), (2, 3));
            assert_eq!(error.stage, FailingStage::DataUnderrun);
            assert_eq!(recovered, &["aa", "bb"]);
        }
        other => panic!("expected partial bucket, got {other:?}"),
    }
    assert!(!report.bucket("org", 2).unwrap().is_decoded());
    assert_eq!(report.errors().count(), 2);
    assert_eq!(report.stats.successful_zones, 0);
}

#[test]
fn fixed_width_layout_needs_no_separator() {
    let input = payload("!D!B!Nab", &[("ru", 2, 4)]);
    let options = DecodeOptions {
        layout: EntryLayout::FixedWidth,
        ..DecodeOptions::default()
    };
    let report = decode_payload(&input, &options).expect("mask is valid");
    assert_eq!(report.bucket("ru", 2).unwrap().domains().unwrap(), &["kino", "film", "shop", "ab"]);
}

#[test]
fn job_file_round_trips_through_json() {
    let json = r#"{"mask": "!!!!", "data": "sA x!K ", "zones": {"ru": {"3": 2}}}"#;
    let input: PayloadInput = serde_json::from_str(json).expect("valid job");
    let report = decode_payload(&input, &DecodeOptions::default()).expect("mask is valid");
    assert_eq!(report.bucket("ru", 3).unwrap().text().unwrap(), "sin x.com");
}
