// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Whole-datagram AES-256-ECB wrapping under a preshared key (spec §4.6):
//! `[magic: 0xC8A2][AES-256-ECB(pad(payload), PSK)]`.

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;

/// Big-endian magic prefixed to every wrapped datagram.
pub const MAGIC: [u8; 2] = [0xC8, 0xA2];

fn ecb_encrypt_blocks(key: &[u8; 32], data: &mut [u8]) {
    let cipher = Aes256::new(key.into());
    for chunk in data.chunks_mut(16) {
        let mut block = aes::Block::clone_from_slice(chunk);
        cipher.encrypt_block(&mut block);
        chunk.copy_from_slice(&block);
    }
}

fn ecb_decrypt_blocks(key: &[u8; 32], data: &mut [u8]) {
    let cipher = Aes256::new(key.into());
    for chunk in data.chunks_mut(16) {
        let mut block = aes::Block::clone_from_slice(chunk);
        cipher.decrypt_block(&mut block);
        chunk.copy_from_slice(&block);
    }
}

/// Zero-pad `payload` to the next 16-byte boundary and encrypt it under
/// `psk`, prefixing the wire magic.
#[must_use]
pub fn wrap(psk: &[u8; 32], payload: &[u8]) -> Vec<u8> {
    let mut padded = payload.to_vec();
    let pad_to = padded.len().div_ceil(16) * 16;
    padded.resize(pad_to.max(16), 0);
    ecb_encrypt_blocks(psk, &mut padded);

    let mut out = Vec::with_capacity(2 + padded.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&padded);
    out
}

/// Decrypt a wrapped datagram. Returns `None` if the magic is absent or
/// the ciphertext isn't block-aligned — the caller should silently
/// discard the datagram in that case.
#[must_use]
pub fn unwrap(psk: &[u8; 32], datagram: &[u8]) -> Option<Vec<u8>> {
    if datagram.len() < 2 + 16 || datagram[0..2] != MAGIC {
        return None;
    }
    let mut ciphertext = datagram[2..].to_vec();
    if ciphertext.len() % 16 != 0 {
        return None;
    }
    ecb_decrypt_blocks(psk, &mut ciphertext);
    Some(ciphertext)
}
