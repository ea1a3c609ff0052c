// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Benchmarks for PDU assembly/disassembly (spec §4.3): the
//! header-plus-blocks encode path and the block-by-block reassembly path
//! a running FNE drives on every received data PDU.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dvm_core::pdu::{DataHeader, PduAssembler, Sap};

const HEADER_WIRE_LEN: usize = 20; // trellis-coded 10-byte header -> 20 bytes
const BLOCK_WIRE_LEN: usize = 24; // 12 payload bytes -> 96 bits -> 24 bytes
const BLOCKS: u8 = 4;

fn unconfirmed_header() -> DataHeader {
    DataHeader::Unconfirmed {
        outbound: true,
        sap: Sap::USER_DATA,
        mfid: 0,
        llid: 0x1234,
        blocks_to_follow: BLOCKS,
        pad_length: 0,
        header_offset: 0,
    }
}

fn assemble_bench(c: &mut Criterion) {
    let user_data = vec![0x5Au8; 12 * BLOCKS as usize];
    let header = unconfirmed_header();
    c.bench_function("pdu_assemble_unconfirmed", |b| {
        b.iter(|| {
            let mut assembler = PduAssembler::new();
            assembler.assemble(black_box(&header), None, None, black_box(&user_data), None)
        })
    });
}

fn disassemble_bench(c: &mut Criterion) {
    let user_data = vec![0x5Au8; 12 * BLOCKS as usize];
    let header = unconfirmed_header();
    let mut encoder = PduAssembler::new();
    let wire = encoder.assemble(&header, None, None, &user_data, None);

    c.bench_function("pdu_disassemble_unconfirmed", |b| {
        b.iter(|| {
            let mut assembler = PduAssembler::new();
            let mut progress = assembler.disassemble(black_box(&wire[..HEADER_WIRE_LEN]), true);
            let mut offset = HEADER_WIRE_LEN;
            for _ in 0..BLOCKS {
                progress = assembler.disassemble(black_box(&wire[offset..offset + BLOCK_WIRE_LEN]), false);
                offset += BLOCK_WIRE_LEN;
            }
            progress
        })
    });
}

criterion_group!(benches, assemble_bench, disassemble_bench);
criterion_main!(benches);
