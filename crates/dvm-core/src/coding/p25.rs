// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! P25 channel coding: TDULC and TSBK framing.
//!
//! `TduLcFrame` carries the 72-bit link-control payload of a Terminator
//! Data Unit with Link Control: RS(24,12,13) over the 9 payload bytes (12
//! six-bit symbols), then each 12-bit half of the resulting 18-byte RS
//! codeword is Golay(24,12,8)-protected, producing the 36-byte FEC field.
//! `TsbkFrame` carries a 72-bit trunking signalling block, CRC-CCITT16
//! tagged and 1/2-rate-trellis coded to 25 bytes — the same trellis
//! primitive [`super::super::pdu::block::UnconfirmedBlock`] uses.
//! Both operate purely on bits/bytes here; interpreting the payload
//! fields themselves is [`super::super::lc`]'s job.

use crate::fec::{
    crc_ccitt16, decode_half_rate, encode_half_rate, golay24_decode, golay24_encode, rs_24_12,
};

const LC_PAYLOAD_BITS: usize = 72;

/// RS(24,12) codeword length in symbols; 24 * 6 bits = 18 bytes.
const RS_CODE_SYMBOLS: usize = 24;
/// Each Golay(24,12) group covers 12 bits of the RS codeword.
const GOLAY_GROUP_BITS: usize = 12;
/// `RS_CODE_SYMBOLS * 6 / GOLAY_GROUP_BITS` = 12 Golay groups.
const GOLAY_GROUPS: usize = (RS_CODE_SYMBOLS * 6) / GOLAY_GROUP_BITS;

/// CRC-CCITT16 trailer width.
const TSBK_CRC_BITS: usize = 16;
/// Zero-padding appended so the 1/2-rate input is a clean 100 bits,
/// yielding exactly 200 coded bits (25 bytes).
const TSBK_PAD_BITS: usize = 12;
/// Wire size of a trellis-coded TSBK.
const TSBK_WIRE_BYTES: usize = 25;

fn bytes_to_bits(bytes: &[u8], n_bits: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(n_bits);
    for byte in bytes {
        for b in (0..8).rev() {
            if bits.len() == n_bits {
                break;
            }
            bits.push((byte >> b) & 1);
        }
    }
    bits
}

fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; bits.len().div_ceil(8)];
    for (i, &bit) in bits.iter().enumerate() {
        if bit != 0 {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

/// Pack a bit string into 6-bit Reed-Solomon symbols, MSB-first.
fn bits_to_symbols6(bits: &[u8]) -> Vec<u8> {
    bits.chunks(6)
        .map(|c| c.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

/// Unpack 6-bit Reed-Solomon symbols back into a bit string.
fn symbols6_to_bits(symbols: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(symbols.len() * 6);
    for &s in symbols {
        for i in (0..6).rev() {
            bits.push((s >> i) & 1);
        }
    }
    bits
}

/// Group a bit string into 12-bit Golay data words, MSB-first.
fn bits_to_groups12(bits: &[u8]) -> Vec<u16> {
    bits.chunks(GOLAY_GROUP_BITS)
        .map(|c| c.iter().fold(0u16, |acc, &b| (acc << 1) | u16::from(b)))
        .collect()
}

/// Terminator Data Unit with Link Control payload, RS(24,12,13) and
/// Golay(24,12,8) protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TduLcFrame {
    /// 72-bit link-control payload, MSB-first, packed into 9 bytes.
    pub payload: [u8; 9],
}

impl TduLcFrame {
    #[must_use]
    pub fn new(payload: [u8; 9]) -> Self {
        Self { payload }
    }

    /// RS(24,12,13)-encode the 9-byte payload into an 18-byte codeword,
    /// then Golay(24,12,8)-protect each 12-bit half of it, producing the
    /// 36-byte FEC field.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let data_bits = bytes_to_bits(&self.payload, LC_PAYLOAD_BITS);
        let symbols = bits_to_symbols6(&data_bits);
        let rs_codeword = rs_24_12().encode(&symbols);
        let rs_bits = symbols6_to_bits(&rs_codeword);

        let mut out = Vec::with_capacity(GOLAY_GROUPS * 3);
        for group in bits_to_groups12(&rs_bits) {
            let code = golay24_encode(group);
            out.push(((code >> 16) & 0xFF) as u8);
            out.push(((code >> 8) & 0xFF) as u8);
            out.push((code & 0xFF) as u8);
        }
        out
    }

    /// Reverse of [`Self::encode`]: Golay-correct each 24-bit group (up to
    /// 3 bit errors each), then RS(24,12,13)-correct the reassembled
    /// codeword (up to 6 symbol errors).
    #[must_use]
    pub fn decode(fec_field: &[u8]) -> Self {
        let mut rs_bits = Vec::with_capacity(RS_CODE_SYMBOLS * 6);
        for chunk in fec_field.chunks(3) {
            let code = (u32::from(chunk.first().copied().unwrap_or(0)) << 16)
                | (u32::from(chunk.get(1).copied().unwrap_or(0)) << 8)
                | u32::from(chunk.get(2).copied().unwrap_or(0));
            let (data, _corrected) = golay24_decode(code);
            for i in (0..GOLAY_GROUP_BITS).rev() {
                rs_bits.push(((data >> i) & 1) as u8);
            }
        }
        let rs_symbols = bits_to_symbols6(&rs_bits);
        let (data_symbols, _ok) = rs_24_12().decode(&rs_symbols);
        let data_bits = symbols6_to_bits(&data_symbols);
        let mut payload = [0u8; 9];
        let packed = bits_to_bytes(&data_bits);
        payload[..packed.len().min(9)].copy_from_slice(&packed[..packed.len().min(9)]);
        Self { payload }
    }
}

/// Trunking signalling block payload, CRC-CCITT16-tagged and 1/2-rate
/// trellis protected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsbkFrame {
    /// 72-bit TSBK payload (opcode, arguments), packed as 12 6-bit
    /// symbols.
    pub symbols: [u8; 12],
}

impl TsbkFrame {
    #[must_use]
    pub fn new(symbols: [u8; 12]) -> Self {
        Self { symbols }
    }

    /// CRC-CCITT16-tag the 9-byte content, zero-pad to 100 bits, and
    /// 1/2-rate-trellis encode into a 25-byte transmitted block.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let content_bits = bits_to_symbols6_roundtrip(&self.symbols);
        let content_bytes = bits_to_bytes(&content_bits);
        let crc = crc_ccitt16(&content_bytes);

        let mut bits = content_bits;
        for i in (0..TSBK_CRC_BITS).rev() {
            bits.push(((crc >> i) & 1) as u8);
        }
        bits.extend(std::iter::repeat(0u8).take(TSBK_PAD_BITS));

        let coded = encode_half_rate(&bits);
        pack_pairs(&coded)
    }

    /// 1/2-rate-trellis decode a 25-byte received block and verify the
    /// CRC-CCITT16 trailer. Returns `None` on CRC mismatch.
    #[must_use]
    pub fn decode(received: &[u8]) -> Option<Self> {
        let pairs = unpack_to_pairs(received);
        let bits = decode_half_rate(&pairs);
        if bits.len() < LC_PAYLOAD_BITS + TSBK_CRC_BITS {
            return None;
        }
        let content_bits = &bits[..LC_PAYLOAD_BITS];
        let crc_bits = &bits[LC_PAYLOAD_BITS..LC_PAYLOAD_BITS + TSBK_CRC_BITS];
        let crc_received = crc_bits.iter().fold(0u16, |acc, &b| (acc << 1) | u16::from(b));

        let content_bytes = bits_to_bytes(content_bits);
        let crc_expected = crc_ccitt16(&content_bytes);
        if crc_expected != crc_received {
            return None;
        }

        let symbols = bits_to_symbols6(content_bits);
        let mut out = [0u8; 12];
        out.copy_from_slice(&symbols);
        Some(Self { symbols: out })
    }
}

/// Unpack 12 6-bit symbols back into their 72-bit stream (the `TsbkFrame`
/// content, before CRC and trellis framing).
fn bits_to_symbols6_roundtrip(symbols: &[u8; 12]) -> Vec<u8> {
    symbols6_to_bits(symbols)
}

fn pack_pairs(pairs: &[(u8, u8)]) -> Vec<u8> {
    let bits: Vec<u8> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
    bits_to_bytes(&bits)
}

fn unpack_to_pairs(coded: &[u8]) -> Vec<Option<(u8, u8)>> {
    let bits = bytes_to_bits(coded, coded.len() * 8);
    bits.chunks(2)
        .map(|c| if c.len() == 2 { Some((c[0], c[1])) } else { None })
        .collect()
}
