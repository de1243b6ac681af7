use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vaultcy::codec::Compressor;
use vaultcy::crypto::KeyMaterial;
use vaultcy::spn::Spn;

fn bench_lzw_compress(c: &mut Criterion) {
    let data: Vec<u8> = b"AB".iter().cycle().take(1024 * 1024).copied().collect();
    c.bench_function("lzw_compress_1mb_repeating", |b| {
        b.iter(|| {
            let mut compressor = Compressor::new();
            let mut out = compressor.compress(black_box(&data));
            out.extend(compressor.close());
            out
        })
    });
}

fn bench_spn_encode_block(c: &mut Criterion) {
    let key = KeyMaterial::expand(b"benchmark-password").unwrap();
    let mut spn = Spn::with_random_seed(&key);
    let block = [7u8; 256];
    c.bench_function("spn_encode_block_256b", |b| {
        b.iter(|| spn.encode_block(black_box(&block)))
    });
}

criterion_group!(benches, bench_lzw_compress, bench_spn_encode_block);
criterion_main!(benches);
