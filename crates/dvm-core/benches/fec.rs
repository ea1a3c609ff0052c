// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Benchmarks for the Layer 0 FEC coders: encode/decode throughput for
//! the codeword shapes that sit on the hot receive path of every
//! channel coding above them.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dvm_core::fec::{
    bptc_decode, bptc_encode, golay20_decode, golay20_encode, golay24_decode, golay24_encode,
    hamming_15_11_a, qr_decode, qr_encode, rs_24_12,
};

fn golay_bench(c: &mut Criterion) {
    c.bench_function("golay20_encode", |b| b.iter(|| golay20_encode(black_box(0xA5))));
    c.bench_function("golay20_decode", |b| {
        let codeword = golay20_encode(0xA5);
        b.iter(|| golay20_decode(black_box(codeword)))
    });
    c.bench_function("golay24_encode", |b| b.iter(|| golay24_encode(black_box(0x0C3))));
    c.bench_function("golay24_decode", |b| {
        let codeword = golay24_encode(0x0C3);
        b.iter(|| golay24_decode(black_box(codeword)))
    });
}

fn hamming_bench(c: &mut Criterion) {
    let code = hamming_15_11_a();
    c.bench_function("hamming_15_11_a_encode", |b| b.iter(|| code.encode(black_box(0x6B2))));
    c.bench_function("hamming_15_11_a_decode", |b| {
        let codeword = code.encode(0x6B2);
        b.iter(|| code.decode(black_box(codeword)))
    });
}

fn qr_bench(c: &mut Criterion) {
    c.bench_function("qr_encode", |b| b.iter(|| qr_encode(black_box(0x55))));
    c.bench_function("qr_decode", |b| {
        let codeword = qr_encode(0x55);
        b.iter(|| qr_decode(black_box(codeword)))
    });
}

fn bptc_bench(c: &mut Criterion) {
    let mut payload = [false; 96];
    for (i, bit) in payload.iter_mut().enumerate() {
        *bit = i % 3 == 0;
    }
    c.bench_function("bptc_encode", |b| b.iter(|| bptc_encode(black_box(&payload))));
    c.bench_function("bptc_decode", |b| {
        let encoded = bptc_encode(&payload);
        b.iter(|| bptc_decode(black_box(&encoded)))
    });
}

fn reed_solomon_bench(c: &mut Criterion) {
    let code = rs_24_12();
    let mut symbols = [0u8; 12];
    for (i, s) in symbols.iter_mut().enumerate() {
        *s = (i as u8) & 0x3F;
    }
    c.bench_function("rs_24_12_encode", |b| b.iter(|| code.encode(black_box(&symbols))));
    c.bench_function("rs_24_12_decode", |b| {
        let encoded = code.encode(&symbols);
        b.iter(|| code.decode(black_box(&encoded)))
    });
}

criterion_group!(benches, golay_bench, hamming_bench, qr_bench, bptc_bench, reed_solomon_bench);
criterion_main!(benches);
