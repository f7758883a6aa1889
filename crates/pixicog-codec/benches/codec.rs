use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixicog_codec::{decode, encode, Image, Rgba, WorkingSet};

fn sample_set() -> WorkingSet {
    let mut frames = Vec::new();
    for i in 0..8u8 {
        frames.push(Image::filled(256, 256, Rgba::new(i, 255 - i, i / 2, 255)));
    }
    let mut ws = WorkingSet::new();
    ws.insert("frames", frames);
    ws
}

fn bench_codec(c: &mut Criterion) {
    let ws = sample_set();
    let text = encode(&ws).unwrap();

    c.bench_function("encode 8x256x256", |b| b.iter(|| encode(black_box(&ws))));
    c.bench_function("decode 8x256x256", |b| b.iter(|| decode(black_box(&text))));
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
