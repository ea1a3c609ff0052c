// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! KMM frame header and message variants (TIA-102.AACA-C, spec §4.4).
//!
//! Every frame shares a common 10-byte header (message ID, message
//! length, a packed control byte, destination/source logical link IDs)
//! optionally followed by a 2-byte message number, then a variant body,
//! then (for `ENH_MAC`-signed frames) a 13-byte MAC trailer: the MAC
//! bytes themselves, a length byte, the MAC algorithm ID, the MAC key
//! ID, and the MAC format.

use crate::kmm::keyset::Keyset;
use crate::kmm::mac::{self, ENH_MAC_LENGTH};

/// Message indicator length carried by frames that reference one.
pub const MI_LENGTH_BYTES: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MacType {
    NoMac = 0,
    DesMac = 1,
    EnhMac = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MacFormat {
    Cbc = 0,
    Cmac = 1,
}

/// The control fields common to every KMM frame, independent of the
/// message-specific body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmmHeader {
    pub message_id: u8,
    pub resp_kind: u8,
    pub dst_llid: u32,
    pub src_llid: u32,
    pub message_number: u16,
    pub mac_type: MacType,
    pub mac_alg_id: u8,
    pub mac_kid: u16,
    pub mac_format: MacFormat,
}

impl KmmHeader {
    #[must_use]
    pub fn new(message_id: u8, dst_llid: u32, src_llid: u32) -> Self {
        Self {
            message_id,
            resp_kind: 0,
            dst_llid,
            src_llid,
            message_number: 0,
            mac_type: MacType::NoMac,
            mac_alg_id: 0,
            mac_kid: 0,
            mac_format: MacFormat::Cmac,
        }
    }

    fn body_offset(self) -> usize {
        if self.message_number > 0 {
            2
        } else {
            0
        }
    }
}

/// Body variants. Each carries just what's specific to that message;
/// the shared header and optional MAC trailer are handled by
/// [`encode`]/[`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KmmBody {
    Null,
    RegistrationResponse { status: u8 },
    DeregistrationResponse { status: u8 },
    NegativeAck { nak_message_id: u8, message_no: u16, status: u8 },
    InventoryCommand { inventory_type: u8 },
    InventoryResponseHeader { inventory_type: u8, number_of_items: u16 },
    RekeyCommand { alg_id: u8, key_id: u16, mi: Option<[u8; MI_LENGTH_BYTES]>, keysets: Vec<Keyset> },
    RekeyAck { rekey_message_id: u8, key_status: Vec<(u8, u16, u8)> },
}

impl KmmBody {
    fn encode(&self) -> Vec<u8> {
        match self {
            KmmBody::Null => Vec::new(),
            KmmBody::RegistrationResponse { status } | KmmBody::DeregistrationResponse { status } => {
                vec![*status]
            }
            KmmBody::NegativeAck { nak_message_id, message_no, status } => {
                let mut out = vec![*nak_message_id];
                out.extend_from_slice(&message_no.to_be_bytes());
                out.push(*status);
                out
            }
            KmmBody::InventoryCommand { inventory_type } => vec![*inventory_type],
            KmmBody::InventoryResponseHeader { inventory_type, number_of_items } => {
                let mut out = vec![*inventory_type];
                out.extend_from_slice(&number_of_items.to_be_bytes());
                out
            }
            KmmBody::RekeyCommand { alg_id, key_id, mi, keysets } => {
                let decrypt_info_fmt: u8 = if mi.is_some() { 0x01 } else { 0x00 };
                let mut out = vec![decrypt_info_fmt, *alg_id];
                out.extend_from_slice(&key_id.to_be_bytes());
                if let Some(mi) = mi {
                    out.extend_from_slice(mi);
                }
                out.push(keysets.len() as u8);
                for keyset in keysets {
                    out.extend_from_slice(&keyset.encode());
                }
                out
            }
            KmmBody::RekeyAck { rekey_message_id, key_status } => {
                let mut out = vec![*rekey_message_id, key_status.len() as u8];
                for (alg_id, kid, status) in key_status {
                    out.push(*alg_id);
                    out.extend_from_slice(&kid.to_be_bytes());
                    out.push(*status);
                }
                out
            }
        }
    }

    fn decode(message_id: u8, bytes: &[u8]) -> Option<Self> {
        match message_id {
            super::REG_RSP => Some(KmmBody::RegistrationResponse { status: *bytes.first()? }),
            super::DEREG_RSP => Some(KmmBody::DeregistrationResponse { status: *bytes.first()? }),
            super::NAK => {
                if bytes.len() < 4 {
                    return None;
                }
                Some(KmmBody::NegativeAck {
                    nak_message_id: bytes[0],
                    message_no: u16::from_be_bytes([bytes[1], bytes[2]]),
                    status: bytes[3],
                })
            }
            super::INVENTORY_CMD => Some(KmmBody::InventoryCommand { inventory_type: *bytes.first()? }),
            super::INVENTORY_RSP => {
                if bytes.len() < 3 {
                    return None;
                }
                Some(KmmBody::InventoryResponseHeader {
                    inventory_type: bytes[0],
                    number_of_items: u16::from_be_bytes([bytes[1], bytes[2]]),
                })
            }
            super::REKEY_CMD => {
                if bytes.len() < 4 {
                    return None;
                }
                let decrypt_info_fmt = bytes[0];
                let alg_id = bytes[1];
                let key_id = u16::from_be_bytes([bytes[2], bytes[3]]);
                let mut offset = 4;
                let mi = if decrypt_info_fmt == 0x01 {
                    let mi: [u8; MI_LENGTH_BYTES] = bytes.get(offset..offset + MI_LENGTH_BYTES)?.try_into().ok()?;
                    offset += MI_LENGTH_BYTES;
                    Some(mi)
                } else {
                    None
                };
                let keyset_count = *bytes.get(offset)? as usize;
                offset += 1;
                let mut keysets = Vec::with_capacity(keyset_count);
                for _ in 0..keyset_count {
                    let remaining = bytes.get(offset..)?;
                    let keyset = Keyset::decode(remaining)?;
                    offset += keyset.encode().len();
                    keysets.push(keyset);
                }
                Some(KmmBody::RekeyCommand { alg_id, key_id, mi, keysets })
            }
            super::REKEY_ACK => {
                if bytes.len() < 2 {
                    return None;
                }
                let rekey_message_id = bytes[0];
                let count = bytes[1] as usize;
                let mut key_status = Vec::with_capacity(count);
                let mut offset = 2;
                for _ in 0..count {
                    let chunk = bytes.get(offset..offset + 4)?;
                    key_status.push((chunk[0], u16::from_be_bytes([chunk[1], chunk[2]]), chunk[3]));
                    offset += 4;
                }
                Some(KmmBody::RekeyAck { rekey_message_id, key_status })
            }
            super::NULL_CMD => Some(KmmBody::Null),
            _ => None,
        }
    }
}

fn set_u24(out: &mut Vec<u8>, value: u32) {
    out.push((value >> 16) as u8);
    out.push((value >> 8) as u8);
    out.push(value as u8);
}

fn get_u24(bytes: &[u8]) -> u32 {
    (u32::from(bytes[0]) << 16) | (u32::from(bytes[1]) << 8) | u32::from(bytes[2])
}

/// Encode `header`/`body` into a full wire frame, optionally MAC-signing
/// it with `kek` if `header.mac_type` is [`MacType::EnhMac`].
#[must_use]
pub fn encode(header: &KmmHeader, body: &KmmBody, kek: Option<&[u8; 32]>) -> Vec<u8> {
    let body_bytes = body.encode();
    let body_offset = header.body_offset();

    let mut control = Vec::with_capacity(10 + body_offset);
    control.push(header.message_id);
    control.extend_from_slice(&[0, 0]); // message length, patched below
    let control_byte = ((header.resp_kind & 0x03) << 6)
        | if header.message_number > 0 { 0x20 } else { 0x00 }
        | ((header.mac_type as u8 & 0x03) << 2);
    control.push(control_byte);
    set_u24(&mut control, header.dst_llid);
    set_u24(&mut control, header.src_llid);
    if header.message_number > 0 {
        control.extend_from_slice(&header.message_number.to_be_bytes());
    }

    let mut out = control;
    out.extend_from_slice(&body_bytes);

    if header.mac_type == MacType::EnhMac {
        out.extend_from_slice(&[0u8; ENH_MAC_LENGTH]);
        out.push(ENH_MAC_LENGTH as u8);
        out.push(header.mac_alg_id);
        out.extend_from_slice(&header.mac_kid.to_be_bytes());
        out.push(header.mac_format as u8 as u16 as u8);
    }

    let message_length = (out.len() - 3) as u16;
    out[1..3].copy_from_slice(&message_length.to_be_bytes());

    if let (MacType::EnhMac, Some(kek)) = (header.mac_type, kek) {
        let trailer_start = out.len() - (ENH_MAC_LENGTH + 5);
        let tag = match header.mac_format {
            MacFormat::Cbc => mac::cbc_mac(&mac::derive_cbc_mac_key(kek), &out[..trailer_start]),
            MacFormat::Cmac => mac::cmac(kek, &out[..trailer_start]),
        };
        out[trailer_start..trailer_start + ENH_MAC_LENGTH].copy_from_slice(&tag);
    }

    out
}

/// Decode a full wire frame. Returns the header, body, and (if
/// `ENH_MAC`-signed) the MAC bytes as carried on the wire, without
/// verifying them — call [`verify`] with the KEK to do that.
#[must_use]
pub fn decode(data: &[u8]) -> Option<(KmmHeader, KmmBody)> {
    if data.len() < 10 {
        return None;
    }
    let message_id = data[0];
    let message_length = u16::from_be_bytes([data[1], data[2]]);
    let full_length = message_length as usize + 3;
    if data.len() < full_length {
        return None;
    }

    let resp_kind = (data[3] >> 6) & 0x03;
    let has_mn = ((data[3] >> 4) & 0x03) == 0x02;
    let mac_type = match (data[3] >> 2) & 0x03 {
        0 => MacType::NoMac,
        1 => MacType::DesMac,
        _ => MacType::EnhMac,
    };
    let dst_llid = get_u24(&data[4..7]);
    let src_llid = get_u24(&data[7..10]);

    let (message_number, body_offset) =
        if has_mn { (u16::from_be_bytes([data[10], data[11]]), 2) } else { (0, 0) };

    let (mac_alg_id, mac_kid, mac_format, body_end) = if mac_type == MacType::EnhMac {
        let trailer_end = full_length;
        let mac_len = data[trailer_end - 5] as usize;
        let mac_alg_id = data[trailer_end - 4];
        let mac_kid = u16::from_be_bytes([data[trailer_end - 3], data[trailer_end - 2]]);
        let mac_format = if data[trailer_end - 1] == MacFormat::Cbc as u8 { MacFormat::Cbc } else { MacFormat::Cmac };
        (mac_alg_id, mac_kid, mac_format, trailer_end - (mac_len + 5))
    } else {
        (0, 0, MacFormat::Cmac, full_length)
    };

    let body_bytes = &data[10 + body_offset..body_end];
    let body = KmmBody::decode(message_id, body_bytes)?;

    Some((
        KmmHeader {
            message_id,
            resp_kind,
            dst_llid,
            src_llid,
            message_number,
            mac_type,
            mac_alg_id,
            mac_kid,
            mac_format,
        },
        body,
    ))
}

/// Re-derive and compare the MAC trailer of an encoded frame against
/// `kek`. Frames with `mac_type != EnhMac` verify trivially.
#[must_use]
pub fn verify(kek: &[u8; 32], encoded: &[u8]) -> bool {
    let Some((header, _)) = decode(encoded) else { return false };
    if header.mac_type != MacType::EnhMac {
        return true;
    }
    let trailer_start = encoded.len() - (ENH_MAC_LENGTH + 5);
    let carried = &encoded[trailer_start..trailer_start + ENH_MAC_LENGTH];
    let expected = match header.mac_format {
        MacFormat::Cbc => mac::cbc_mac(&mac::derive_cbc_mac_key(kek), &encoded[..trailer_start]),
        MacFormat::Cmac => mac::cmac(kek, &encoded[..trailer_start]),
    };
    carried == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmm::keyset::{KeyFormat, KeyItem};

    #[test]
    fn registration_response_round_trips() {
        let header = KmmHeader::new(super::super::REG_RSP, 0x0102_03, 0x0405_06);
        let body = KmmBody::RegistrationResponse { status: 0 };
        let encoded = encode(&header, &body, None);
        let (decoded_header, decoded_body) = decode(&encoded).expect("decode");
        assert_eq!(decoded_header.dst_llid, 0x0102_03);
        assert_eq!(decoded_header.src_llid, 0x0405_06);
        assert_eq!(decoded_body, body);
    }

    #[test]
    fn negative_ack_round_trips() {
        let header = KmmHeader::new(super::super::NAK, 1, 2);
        let body = KmmBody::NegativeAck { nak_message_id: super::super::REKEY_CMD, message_no: 7, status: 1 };
        let encoded = encode(&header, &body, None);
        let (_, decoded_body) = decode(&encoded).expect("decode");
        assert_eq!(decoded_body, body);
    }

    #[test]
    fn rekey_command_with_keyset_round_trips_and_mac_verifies() {
        let kek = [0x5Au8; 32];
        let tek_kek = [0x33u8; 32];
        let keyset = Keyset {
            keyset_id: 1,
            algorithm_id: 0x84,
            key_length: 32,
            items: vec![KeyItem::new(KeyFormat(0x20), 1, 500, &tek_kek, &[9u8; 32])],
        };

        let mut header = KmmHeader::new(super::super::REKEY_CMD, 0x1111_11, 0x2222_22);
        header.mac_type = MacType::EnhMac;
        header.mac_format = MacFormat::Cmac;
        header.mac_alg_id = 0x84;
        header.mac_kid = 500;

        let body = KmmBody::RekeyCommand { alg_id: 0x84, key_id: 500, mi: Some([7u8; MI_LENGTH_BYTES]), keysets: vec![keyset] };

        let encoded = encode(&header, &body, Some(&kek));
        assert!(verify(&kek, &encoded));
        assert!(!verify(&[0u8; 32], &encoded));

        let (_, decoded_body) = decode(&encoded).expect("decode");
        assert_eq!(decoded_body, body);
    }
}
