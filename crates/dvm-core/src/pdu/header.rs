// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! PDU Data Header: a 10-byte (80-bit) header that precedes the data
//! blocks of a P25 or DMR data PDU, 1/2-rate-trellis protected and
//! CRC-CCITT16 checked.
//!
//! Format-code-tagged sum type, grounded on the reference decoder's
//! `DataHeader::decode`/`encode` byte layout: byte 0 carries ack-needed,
//! outbound and format; byte 1 the SAP (or response class/type/status for
//! `RESPONSE`); byte 2 the MFID; bytes 3-5 the logical-link ID; byte 6 the
//! full-message flag and blocks-to-follow; the remaining bytes vary by
//! format.

use crate::fec::{crc_ccitt16, trellis};

pub const HEADER_LENGTH_BYTES: usize = 10;

/// Service access point tag (low 6 bits of byte 1, or byte 3 of the
/// extended-address second header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sap(pub u8);

impl Sap {
    pub const USER_DATA: Sap = Sap(0x00);
    pub const EXT_ADDR: Sap = Sap(0x1F);
    pub const ENC_USER_DATA: Sap = Sap(0x20);
    pub const ENC_KEY_ITEM: Sap = Sap(0x21);

    #[must_use]
    pub fn bits(self) -> u8 {
        self.0 & 0x3F
    }
}

/// A parsed PDU data header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataHeader {
    Confirmed {
        outbound: bool,
        sap: Sap,
        mfid: u8,
        llid: u32,
        blocks_to_follow: u8,
        pad_length: u8,
        resync: bool,
        packet_seq_no: u8,
        fragment_seq_no: u8,
        last_fragment: bool,
        header_offset: u8,
    },
    Unconfirmed {
        outbound: bool,
        sap: Sap,
        mfid: u8,
        llid: u32,
        blocks_to_follow: u8,
        pad_length: u8,
        header_offset: u8,
    },
    Response {
        outbound: bool,
        mfid: u8,
        llid: u32,
        blocks_to_follow: u8,
        response_class: u8,
        response_type: u8,
        response_status: u8,
        /// Present when the response is not to a full message (replies to
        /// an extended-addressing PDU): the source LLID it responds to.
        source_llid: Option<u32>,
    },
    Ambt {
        outbound: bool,
        mfid: u8,
        llid: u32,
        blocks_to_follow: u8,
        opcode: u8,
        field8: u8,
        field9: u8,
    },
}

const FMT_CONFIRMED: u8 = 0x16;
const FMT_UNCONFIRMED: u8 = 0x15;
const FMT_RESPONSE: u8 = 0x03;
const FMT_AMBT: u8 = 0x17;

impl DataHeader {
    /// `packet_length = (confirmed ? 16 : 12) * blocks_to_follow - 4 - pad_length`.
    #[must_use]
    pub fn packet_length(&self) -> i64 {
        let (per_block, blocks, pad) = match self {
            Self::Confirmed { blocks_to_follow, pad_length, .. } => {
                (16i64, i64::from(*blocks_to_follow), i64::from(*pad_length))
            }
            Self::Unconfirmed { blocks_to_follow, pad_length, .. } => {
                (12i64, i64::from(*blocks_to_follow), i64::from(*pad_length))
            }
            Self::Response { blocks_to_follow, .. } => (12i64, i64::from(*blocks_to_follow), 0),
            Self::Ambt { blocks_to_follow, .. } => (12i64, i64::from(*blocks_to_follow), 0),
        };
        per_block * blocks - 4 - pad
    }

    #[must_use]
    pub fn blocks_to_follow(&self) -> u8 {
        match self {
            Self::Confirmed { blocks_to_follow, .. }
            | Self::Unconfirmed { blocks_to_follow, .. }
            | Self::Response { blocks_to_follow, .. }
            | Self::Ambt { blocks_to_follow, .. } => *blocks_to_follow,
        }
    }

    #[must_use]
    pub fn pad_length(&self) -> u8 {
        match self {
            Self::Confirmed { pad_length, .. } | Self::Unconfirmed { pad_length, .. } => *pad_length,
            Self::Response { .. } | Self::Ambt { .. } => 0,
        }
    }

    /// The SAP tag, for the two formats that carry one. `Response` and
    /// `Ambt` headers have no SAP field and never precede a second header.
    #[must_use]
    pub fn sap(&self) -> Option<Sap> {
        match self {
            Self::Confirmed { sap, .. } | Self::Unconfirmed { sap, .. } => Some(*sap),
            Self::Response { .. } | Self::Ambt { .. } => None,
        }
    }

    fn raw_bytes(&self) -> [u8; HEADER_LENGTH_BYTES] {
        let mut h = [0u8; HEADER_LENGTH_BYTES];
        match self {
            Self::Confirmed {
                outbound,
                sap,
                mfid,
                llid,
                blocks_to_follow,
                pad_length,
                resync,
                packet_seq_no,
                fragment_seq_no,
                last_fragment,
                header_offset,
            } => {
                h[0] = 0x40 | (u8::from(*outbound) << 5) | (FMT_CONFIRMED & 0x1F);
                h[1] = 0xC0 | sap.bits();
                h[2] = *mfid;
                h[3] = (llid >> 16) as u8;
                h[4] = (llid >> 8) as u8;
                h[5] = *llid as u8;
                h[6] = 0x80 | (blocks_to_follow & 0x7F);
                h[7] = pad_length & 0x1F;
                h[8] = (u8::from(*resync) << 7)
                    | ((packet_seq_no & 0x07) << 4)
                    | (u8::from(*last_fragment) << 3)
                    | (fragment_seq_no & 0x07);
                h[9] = header_offset & 0x3F;
            }
            Self::Unconfirmed {
                outbound,
                sap,
                mfid,
                llid,
                blocks_to_follow,
                pad_length,
                header_offset,
            } => {
                h[0] = (u8::from(*outbound) << 5) | (FMT_UNCONFIRMED & 0x1F);
                h[1] = 0xC0 | sap.bits();
                h[2] = *mfid;
                h[3] = (llid >> 16) as u8;
                h[4] = (llid >> 8) as u8;
                h[5] = *llid as u8;
                h[6] = 0x80 | (blocks_to_follow & 0x7F);
                h[7] = pad_length & 0x1F;
                h[9] = header_offset & 0x3F;
            }
            Self::Response {
                outbound,
                mfid,
                llid,
                blocks_to_follow,
                response_class,
                response_type,
                response_status,
                source_llid,
            } => {
                h[0] = (u8::from(*outbound) << 5) | (FMT_RESPONSE & 0x1F);
                h[1] = ((response_class & 0x03) << 6) | ((response_type & 0x07) << 3) | (response_status & 0x07);
                h[2] = *mfid;
                h[3] = (llid >> 16) as u8;
                h[4] = (llid >> 8) as u8;
                h[5] = *llid as u8;
                let full_message = source_llid.is_none();
                h[6] = (u8::from(full_message) << 7) | (blocks_to_follow & 0x7F);
                if let Some(src) = source_llid {
                    h[7] = (src >> 16) as u8;
                    h[8] = (src >> 8) as u8;
                    h[9] = *src as u8;
                }
            }
            Self::Ambt { outbound, mfid, llid, blocks_to_follow, opcode, field8, field9 } => {
                h[0] = (u8::from(*outbound) << 5) | (FMT_AMBT & 0x1F);
                h[1] = 0xC0;
                h[2] = *mfid;
                h[3] = (llid >> 16) as u8;
                h[4] = (llid >> 8) as u8;
                h[5] = *llid as u8;
                h[6] = 0x80 | (blocks_to_follow & 0x7F);
                h[7] = opcode & 0x3F;
                h[8] = *field8;
                h[9] = *field9;
            }
        }
        h
    }

    /// Serialize and CRC-protect, then 1/2-rate-trellis encode.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut h = self.raw_bytes();
        let crc = crc_ccitt16(&h[..HEADER_LENGTH_BYTES - 2]);
        h[HEADER_LENGTH_BYTES - 2] = (crc >> 8) as u8;
        h[HEADER_LENGTH_BYTES - 1] = crc as u8;
        let mut bits = Vec::with_capacity(HEADER_LENGTH_BYTES * 8);
        for byte in h {
            for i in (0..8).rev() {
                bits.push((byte >> i) & 1);
            }
        }
        let coded = trellis::encode_half_rate(&bits);
        let mut out = Vec::with_capacity(coded.len() * 2 / 8 + 1);
        let mut acc = 0u8;
        let mut nbits = 0u8;
        for (a, b) in coded {
            for bit in [a, b] {
                acc = (acc << 1) | (bit & 1);
                nbits += 1;
                if nbits == 8 {
                    out.push(acc);
                    acc = 0;
                    nbits = 0;
                }
            }
        }
        if nbits > 0 {
            out.push(acc << (8 - nbits));
        }
        out
    }

    /// Trellis-decode and CRC-check a received header. Returns
    /// `(header, crc_ok)`; a failed CRC still yields the best-effort parse
    /// so the caller can surface `packet_crc_failed` diagnostically.
    #[must_use]
    pub fn decode(coded: &[u8]) -> (Self, bool) {
        let mut pairs = Vec::with_capacity(coded.len() * 4);
        for &byte in coded {
            for i in (0..8).step_by(2) {
                let a = (byte >> (7 - i)) & 1;
                let b = (byte >> (6 - i)) & 1;
                pairs.push(Some((a, b)));
            }
        }
        let bits = trellis::decode_half_rate(&pairs);
        let mut h = [0u8; HEADER_LENGTH_BYTES];
        for (i, byte) in h.iter_mut().enumerate() {
            let mut v = 0u8;
            for b in 0..8 {
                v = (v << 1) | bits.get(i * 8 + b).copied().unwrap_or(0);
            }
            *byte = v;
        }
        let crc_ok = crc_ccitt16(&h[..HEADER_LENGTH_BYTES - 2])
            == u16::from_be_bytes([h[HEADER_LENGTH_BYTES - 2], h[HEADER_LENGTH_BYTES - 1]]);

        let outbound = h[0] & 0x20 != 0;
        let fmt = h[0] & 0x1F;
        let mfid = h[2];
        let llid = (u32::from(h[3]) << 16) | (u32::from(h[4]) << 8) | u32::from(h[5]);
        let blocks_to_follow = h[6] & 0x7F;
        let full_message = h[6] & 0x80 != 0;

        let parsed = match fmt {
            FMT_CONFIRMED => Self::Confirmed {
                outbound,
                sap: Sap(h[1] & 0x3F),
                mfid,
                llid,
                blocks_to_follow,
                pad_length: h[7] & 0x1F,
                resync: h[8] & 0x80 != 0,
                packet_seq_no: (h[8] >> 4) & 0x07,
                fragment_seq_no: h[8] & 0x07,
                last_fragment: h[8] & 0x08 != 0,
                header_offset: h[9] & 0x3F,
            },
            FMT_RESPONSE => Self::Response {
                outbound,
                mfid,
                llid,
                blocks_to_follow,
                response_class: (h[1] >> 6) & 0x03,
                response_type: (h[1] >> 3) & 0x07,
                response_status: h[1] & 0x07,
                source_llid: if full_message {
                    None
                } else {
                    Some((u32::from(h[7]) << 16) | (u32::from(h[8]) << 8) | u32::from(h[9]))
                },
            },
            FMT_AMBT => Self::Ambt {
                outbound,
                mfid,
                llid,
                blocks_to_follow,
                opcode: h[7] & 0x3F,
                field8: h[8],
                field9: h[9],
            },
            _ => Self::Unconfirmed {
                outbound,
                sap: Sap(h[1] & 0x3F),
                mfid,
                llid,
                blocks_to_follow,
                pad_length: h[7] & 0x1F,
                header_offset: h[9] & 0x3F,
            },
        };
        (parsed, crc_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_round_trip() {
        let h = DataHeader::Confirmed {
            outbound: true,
            sap: Sap::ENC_USER_DATA,
            mfid: 0x90,
            llid: 0x12345,
            blocks_to_follow: 3,
            pad_length: 5,
            resync: false,
            packet_seq_no: 2,
            fragment_seq_no: 1,
            last_fragment: true,
            header_offset: 0,
        };
        let coded = h.encode();
        let (decoded, crc_ok) = DataHeader::decode(&coded);
        assert!(crc_ok);
        assert_eq!(decoded, h);
    }

    #[test]
    fn unconfirmed_round_trip() {
        let h = DataHeader::Unconfirmed {
            outbound: false,
            sap: Sap::USER_DATA,
            mfid: 0x00,
            llid: 0xABCDE,
            blocks_to_follow: 10,
            pad_length: 0,
            header_offset: 3,
        };
        let coded = h.encode();
        let (decoded, crc_ok) = DataHeader::decode(&coded);
        assert!(crc_ok);
        assert_eq!(decoded, h);
    }

    #[test]
    fn packet_length_matches_layout() {
        let h = DataHeader::Confirmed {
            outbound: true,
            sap: Sap::USER_DATA,
            mfid: 0,
            llid: 0,
            blocks_to_follow: 2,
            pad_length: 0,
            resync: false,
            packet_seq_no: 0,
            fragment_seq_no: 0,
            last_fragment: true,
            header_offset: 0,
        };
        assert_eq!(h.packet_length(), 16 * 2 - 4);
    }

    #[test]
    fn corrupted_header_detected_by_crc() {
        let h = DataHeader::Unconfirmed {
            outbound: false,
            sap: Sap::USER_DATA,
            mfid: 0,
            llid: 1,
            blocks_to_follow: 1,
            pad_length: 0,
            header_offset: 0,
        };
        let mut coded = h.encode();
        for byte in &mut coded {
            *byte ^= 0xFF;
        }
        let (_decoded, crc_ok) = DataHeader::decode(&coded);
        assert!(!crc_ok);
    }
}
