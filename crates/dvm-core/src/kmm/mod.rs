// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layer 2c: Key Management Message framing (TIA-102.AACA-C, spec §4.4)
//! — frame header/body codecs, MAC signing, and AES key wrap for the
//! traffic-encryption keys a `REKEY_CMD` carries.

pub mod frame;
pub mod keyset;
pub mod keywrap;
pub mod mac;

pub use frame::{decode, encode, verify, KmmBody, KmmHeader, MacFormat, MacType};
pub use keyset::{KeyFormat, KeyItem, Keyset};

/// KMM message ID values (TIA-102.AACA-C Table 14.3-1).
pub const NULL_CMD: u8 = 0x00;
pub const INVENTORY_CMD: u8 = 0x0D;
pub const INVENTORY_RSP: u8 = 0x0F;
pub const REKEY_CMD: u8 = 0x13;
pub const REKEY_ACK: u8 = 0x15;
pub const REG_RSP: u8 = 0x31;
pub const DEREG_RSP: u8 = 0x33;
pub const NAK: u8 = 0x3D;
