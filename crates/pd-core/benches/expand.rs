use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pd_core::{decode_payload, DecodeOptions, LzpSession, PayloadInput, RawMask, ZoneMetadata};

fn literal_payload(entries: usize) -> PayloadInput {
    let mut data = String::new();
    for i in 0..entries {
        data.push_str(&format!("!D{i:04}!K "));
    }
    // every mask byte zero: all literals
    let mask = "!".repeat(data.len().div_ceil(12) * 4);
    let mut zones = ZoneMetadata::new();
    zones.insert("ru", 8, entries / 2);
    zones.insert("com", 8, entries - entries / 2);
    PayloadInput { mask, data, zones }
}

fn bench_expand(c: &mut Criterion) {
    let data = vec![b'a'; 64 * 1024];
    c.bench_function("expand_64k_predicted", |b| {
        b.iter(|| {
            let mut session = LzpSession::new(&data, RawMask::from_bytes(vec![0xaa; 8 * 1024]));
            black_box(session.expand(64 * 1024).output.len())
        })
    });

    let input = literal_payload(2000);
    let options = DecodeOptions::default();
    c.bench_function("decode_payload_2000_entries", |b| {
        b.iter(|| black_box(decode_payload(&input, &options).map(|r| r.stats.domains_recovered)))
    });
}

criterion_group!(benches, bench_expand);
criterion_main!(benches);
