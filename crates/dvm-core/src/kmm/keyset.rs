// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Keyset Items carried in a `REKEY_CMD` KMM frame (spec §4.4): a keyset
//! identifies an algorithm and key length, and carries an ordered list of
//! key items, each wrapped under the target radio's KEK with
//! [`crate::kmm::keywrap`].

use crate::kmm::keywrap;

/// Storage location / key-use bits packed into the top 3 bits of a key
/// item's first byte (`key-format & 0xE0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFormat(pub u8);

impl KeyFormat {
    #[must_use]
    pub fn bits(self) -> u8 {
        self.0 & 0xE0
    }
}

/// A single wrapped traffic-encryption key within a keyset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyItem {
    pub format: KeyFormat,
    /// Storage Location Number.
    pub sln: u16,
    /// Key ID.
    pub kid: u16,
    /// Key-wrap container: 8-byte chaining value followed by the wrapped
    /// key body, produced by [`keywrap::wrap`].
    pub wrapped: Vec<u8>,
}

impl KeyItem {
    #[must_use]
    pub fn new(format: KeyFormat, sln: u16, kid: u16, kek: &[u8; 32], key: &[u8]) -> Self {
        Self { format, sln, kid, wrapped: keywrap::wrap(kek, key) }
    }

    /// Unwrap this item's key under `kek`; `None` on integrity failure.
    #[must_use]
    pub fn unwrap_key(&self, kek: &[u8; 32]) -> Option<Vec<u8>> {
        keywrap::unwrap(kek, &self.wrapped)
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(5 + self.wrapped.len());
        out.push(self.format.bits());
        out.extend_from_slice(&self.sln.to_be_bytes());
        out.extend_from_slice(&self.kid.to_be_bytes());
        out.extend_from_slice(&self.wrapped);
        out
    }

    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 5 {
            return None;
        }
        Some(Self {
            format: KeyFormat(bytes[0] & 0xE0),
            sln: u16::from_be_bytes([bytes[1], bytes[2]]),
            kid: u16::from_be_bytes([bytes[3], bytes[4]]),
            wrapped: bytes[5..].to_vec(),
        })
    }
}

/// A keyset: an algorithm, a key length, and its ordered key items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyset {
    pub keyset_id: u8,
    pub algorithm_id: u8,
    pub key_length: u8,
    pub items: Vec<KeyItem>,
}

impl Keyset {
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![self.keyset_id, self.algorithm_id, self.key_length, self.items.len() as u8];
        for item in &self.items {
            let encoded = item.encode();
            out.push(encoded.len() as u8);
            out.extend_from_slice(&encoded);
        }
        out
    }

    #[must_use]
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let keyset_id = bytes[0];
        let algorithm_id = bytes[1];
        let key_length = bytes[2];
        let count = bytes[3] as usize;
        let mut items = Vec::with_capacity(count);
        let mut offset = 4;
        for _ in 0..count {
            let len = *bytes.get(offset)? as usize;
            offset += 1;
            let item = KeyItem::decode(bytes.get(offset..offset + len)?)?;
            items.push(item);
            offset += len;
        }
        Some(Self { keyset_id, algorithm_id, key_length, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_item_round_trips_through_wrap_and_wire_encoding() {
        let kek = [0x99u8; 32];
        let key = [0x11u8; 32];
        let item = KeyItem::new(KeyFormat(0x20), 0x0001, 0x1234, &kek, &key);

        let encoded = item.encode();
        let decoded = KeyItem::decode(&encoded).expect("decode");
        assert_eq!(decoded, item);
        assert_eq!(decoded.unwrap_key(&kek).expect("unwrap"), key);
    }

    #[test]
    fn keyset_round_trips_with_multiple_items() {
        let kek = [0x77u8; 32];
        let keyset = Keyset {
            keyset_id: 1,
            algorithm_id: 0x84,
            key_length: 32,
            items: vec![
                KeyItem::new(KeyFormat(0x20), 1, 100, &kek, &[1u8; 32]),
                KeyItem::new(KeyFormat(0x40), 2, 101, &kek, &[2u8; 32]),
            ],
        };

        let encoded = keyset.encode();
        let decoded = Keyset::decode(&encoded).expect("decode");
        assert_eq!(decoded, keyset);
    }
}
