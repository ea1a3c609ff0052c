// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PDU Data Block (spec §4.1 "PDU Data Block"): the fixed-size unit that
//! carries payload bytes after the [`super::header::DataHeader`].
//!
//! A confirmed block is 16 bytes, 3/4-rate-trellis protected, carrying a
//! 7-bit serial number and a 9-bit intra-block CRC over its 11 payload
//! bytes. An unconfirmed block is 12 bytes, 1/2-rate-trellis protected,
//! and carries no serial number of its own — unconfirmed blocks are
//! numbered by reception order by the assembler.

use crate::fec::trellis;

/// Confirmed blocks carry 11 payload bytes per block.
pub const CONFIRMED_PAYLOAD_BYTES: usize = 11;
/// Unconfirmed blocks carry 12 payload bytes per block.
pub const UNCONFIRMED_PAYLOAD_BYTES: usize = 12;

fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in (0..8).rev() {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            let mut v = 0u8;
            for (i, &b) in chunk.iter().enumerate() {
                v |= b << (7 - i);
            }
            v
        })
        .collect()
}

fn pack_pairs(pairs: &[(u8, u8)]) -> Vec<u8> {
    let bits: Vec<u8> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
    bits_to_bytes(&bits)
}

fn unpack_to_pairs(coded: &[u8]) -> Vec<Option<(u8, u8)>> {
    let bits = bytes_to_bits(coded);
    bits.chunks(2)
        .map(|c| if c.len() == 2 { Some((c[0], c[1])) } else { None })
        .collect()
}

/// 9-bit CRC over a confirmed block's 11 payload bytes (a shortened
/// CRC-CCITT16 truncated to its low 9 bits, the convention the
/// reference trellis blocks use for intra-block integrity).
fn block_crc9(payload: &[u8; CONFIRMED_PAYLOAD_BYTES]) -> u16 {
    crate::fec::crc_ccitt16(payload) & 0x1FF
}

/// A confirmed data block: 7-bit serial number, 9-bit CRC, 11 payload
/// bytes, 3/4-rate-trellis coded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedBlock {
    pub serial_no: u8,
    pub payload: [u8; CONFIRMED_PAYLOAD_BYTES],
}

impl ConfirmedBlock {
    #[must_use]
    pub fn new(serial_no: u8, payload: [u8; CONFIRMED_PAYLOAD_BYTES]) -> Self {
        Self { serial_no: serial_no & 0x7F, payload }
    }

    /// Encode to a 16-byte (128-bit) rate-3/4 trellis frame: 7-bit serial
    /// number, 9-bit CRC, then the 11 payload bytes, zero-tailed.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let crc = block_crc9(&self.payload);
        let mut bits = Vec::with_capacity(16 + 88 + 6);
        for i in (0..7).rev() {
            bits.push((self.serial_no >> i) & 1);
        }
        for i in (0..9).rev() {
            bits.push(((crc >> i) & 1) as u8);
        }
        bits.extend(bytes_to_bits(&self.payload));
        bits.extend(vec![0u8; 6]);
        // Pad to a multiple of 3 for the puncture pattern.
        while bits.len() % 3 != 0 {
            bits.push(0);
        }
        let coded = trellis::encode_three_quarter_rate(&bits);
        bits_to_bytes(&coded)
    }

    /// Decode a rate-3/4 trellis frame. Returns `(block, crc_ok)`.
    #[must_use]
    pub fn decode(coded: &[u8]) -> (Self, bool) {
        let coded_bits = bytes_to_bits(coded);
        let bits = trellis::decode_three_quarter_rate(&coded_bits);
        let serial_no = bits[0..7].iter().fold(0u8, |acc, &b| (acc << 1) | b);
        let crc_bits = &bits[7..16];
        let crc = crc_bits.iter().fold(0u16, |acc, &b| (acc << 1) | u16::from(b));
        let mut payload = [0u8; CONFIRMED_PAYLOAD_BYTES];
        let payload_bytes = bits_to_bytes(&bits[16..16 + CONFIRMED_PAYLOAD_BYTES * 8]);
        payload.copy_from_slice(&payload_bytes);
        let crc_ok = block_crc9(&payload) == crc;
        (Self { serial_no, payload }, crc_ok)
    }
}

/// An unconfirmed data block: 12 payload bytes, 1/2-rate trellis coded,
/// no intra-block serial number or CRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnconfirmedBlock {
    pub payload: [u8; UNCONFIRMED_PAYLOAD_BYTES],
}

impl UnconfirmedBlock {
    #[must_use]
    pub fn new(payload: [u8; UNCONFIRMED_PAYLOAD_BYTES]) -> Self {
        Self { payload }
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let bits = bytes_to_bits(&self.payload);
        let coded = trellis::encode_half_rate(&bits);
        pack_pairs(&coded)
    }

    #[must_use]
    pub fn decode(coded: &[u8]) -> Self {
        let pairs = unpack_to_pairs(coded);
        let bits = trellis::decode_half_rate(&pairs);
        let mut payload = [0u8; UNCONFIRMED_PAYLOAD_BYTES];
        payload.copy_from_slice(&bits_to_bytes(&bits));
        Self { payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_round_trip() {
        let payload = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        let block = ConfirmedBlock::new(42, payload);
        let coded = block.encode();
        let (decoded, crc_ok) = ConfirmedBlock::decode(&coded);
        assert!(crc_ok);
        assert_eq!(decoded, block);
    }

    #[test]
    fn confirmed_detects_corruption() {
        let payload = [0u8; CONFIRMED_PAYLOAD_BYTES];
        let block = ConfirmedBlock::new(1, payload);
        let mut coded = block.encode();
        for byte in coded.iter_mut() {
            *byte ^= 0xFF;
        }
        let (_decoded, crc_ok) = ConfirmedBlock::decode(&coded);
        assert!(!crc_ok);
    }

    #[test]
    fn unconfirmed_round_trip() {
        let payload = [9u8; UNCONFIRMED_PAYLOAD_BYTES];
        let block = UnconfirmedBlock::new(payload);
        let coded = block.encode();
        let decoded = UnconfirmedBlock::decode(&coded);
        assert_eq!(decoded, block);
    }
}
