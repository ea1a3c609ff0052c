// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for PDU data header decoding.
//!
//! Feeds arbitrary bytes to `DataHeader::decode`. No input, however
//! malformed, should panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = dvm_core::pdu::DataHeader::decode(data);

    let mut assembler = dvm_core::pdu::PduAssembler::new();
    let _ = assembler.disassemble(data, false);
});
