// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layer 0: forward error correction primitives (spec §4.1).
//!
//! Every coder in this module is a pure function (or a small stateless
//! type) over fixed-size buffers: no I/O, no allocation in the hot path
//! beyond what a particular construction genuinely needs (Reed-Solomon's
//! generator-polynomial setup, the trellis coder's path-metric table),
//! and no dependency on anything above Layer 0. [`coding`](super::coding)
//! and [`lc`](super::lc) call down into these to frame actual DMR/P25/NXDN
//! payloads; this module never calls up.

pub mod bptc;
pub mod crc;
pub mod golay;
pub mod hamming;
pub mod qr;
pub mod reed_solomon;
pub mod trellis;

pub use bptc::{decode as bptc_decode, encode as bptc_encode};
pub use crc::{crc32_ieee, crc_ccitt16, verify_ccitt16_trailer};
pub use golay::{golay20_decode, golay20_encode, golay24_decode, golay24_encode};
pub use hamming::{
    hamming_10_6, hamming_13_9, hamming_15_11_a, hamming_15_11_b, hamming_16_11, hamming_17_12,
    hamming_8_4, HammingCode,
};
pub use qr::{decode as qr_decode, encode as qr_encode};
pub use reed_solomon::{
    rs_12_8, rs_16_8, rs_18_6, rs_20_8, rs_24_12, rs_24_16, rs_36_20, Rs64Code,
};
pub use trellis::{
    decode_half_rate, decode_three_quarter_rate, encode_half_rate, encode_three_quarter_rate,
};
