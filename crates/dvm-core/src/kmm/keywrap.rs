// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! AES key wrap for TEKs carried in a `REKEY_CMD` Keyset Item
//! (TIA-102.AACA-C §14.3.3, spec §4.4): the standard AES key-wrap
//! construction (NIST SP 800-38F / RFC 3394), which wraps an `n`-block
//! (64-bit blocks) key under a KEK into `n + 1` blocks: an 8-byte
//! integrity-check chaining value (`magic(2) | check(6)` in the
//! container framing this module's callers use) followed by the
//! `8*n`-byte wrapped body.

use aes::cipher::{generic_array::GenericArray, BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;

const DEFAULT_IV: u64 = 0xA6A6_A6A6_A6A6_A6A6;

fn aes_encrypt_block(key: &Aes256, block: u128) -> u128 {
    let mut buf = GenericArray::clone_from_slice(&block.to_be_bytes());
    key.encrypt_block(&mut buf);
    u128::from_be_bytes(buf.into())
}

fn aes_decrypt_block(key: &Aes256, block: u128) -> u128 {
    let mut buf = GenericArray::clone_from_slice(&block.to_be_bytes());
    key.decrypt_block(&mut buf);
    u128::from_be_bytes(buf.into())
}

/// Wrap `plaintext` (a multiple of 8 bytes, at least 16) under `kek`.
/// Returns `plaintext.len() + 8` bytes.
#[must_use]
pub fn wrap(kek: &[u8; 32], plaintext: &[u8]) -> Vec<u8> {
    assert!(plaintext.len() % 8 == 0 && plaintext.len() >= 16, "plaintext must be a multiple of 8 bytes, at least 16");
    let cipher = Aes256::new(kek.into());
    let n = plaintext.len() / 8;
    let mut r: Vec<u64> = plaintext.chunks(8).map(|c| u64::from_be_bytes(c.try_into().unwrap())).collect();
    let mut a = DEFAULT_IV;

    for j in 0..6u64 {
        for i in 0..n {
            let block = (u128::from(a) << 64) | u128::from(r[i]);
            let enc = aes_encrypt_block(&cipher, block);
            a = (enc >> 64) as u64 ^ (n as u64 * j + i as u64 + 1);
            r[i] = enc as u64;
        }
    }

    let mut out = Vec::with_capacity(plaintext.len() + 8);
    out.extend_from_slice(&a.to_be_bytes());
    for block in r {
        out.extend_from_slice(&block.to_be_bytes());
    }
    out
}

/// Unwrap a wrapped key produced by [`wrap`]. Returns `None` if the
/// integrity check fails.
#[must_use]
pub fn unwrap(kek: &[u8; 32], wrapped: &[u8]) -> Option<Vec<u8>> {
    if wrapped.len() % 8 != 0 || wrapped.len() < 24 {
        return None;
    }
    let cipher = Aes256::new(kek.into());
    let n = wrapped.len() / 8 - 1;
    let mut a = u64::from_be_bytes(wrapped[0..8].try_into().unwrap());
    let mut r: Vec<u64> =
        wrapped[8..].chunks(8).map(|c| u64::from_be_bytes(c.try_into().unwrap())).collect();

    for j in (0..6u64).rev() {
        for i in (0..n).rev() {
            let t = (n as u64 * j + i as u64 + 1) ^ a;
            let block = (u128::from(t) << 64) | u128::from(r[i]);
            let dec = aes_decrypt_block(&cipher, block);
            a = (dec >> 64) as u64;
            r[i] = dec as u64;
        }
    }

    if a != DEFAULT_IV {
        return None;
    }

    let mut out = Vec::with_capacity(n * 8);
    for block in r {
        out.extend_from_slice(&block.to_be_bytes());
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
    }

    #[test]
    fn forty_byte_tek_wrap_matches_published_vector() {
        let kek: [u8; 32] = hex(
            "4940 02BF 1631 32A4 21FB EF11 7F98 5A0C AADD C250 A4C2 1947 D593 E6C0 67DE 402C",
        )
        .try_into()
        .unwrap();
        let plaintext = hex(
            "2A19 38CD 0B6B 6BD0 B774 5692 FE19 14F0 3876 612F C29D 5777 89A6 2F65 FA05 EF83",
        );
        let expected = hex(
            "8028 9CF6 35FB 68D3 45D3 4F62 EF06 3BA4 E05C AE47 56E7 D304 46D1 F07C 6EB4 E9E0 \
             8409 4537 2372 FB80",
        );

        let wrapped = wrap(&kek, &plaintext);
        assert_eq!(wrapped, expected);

        let unwrapped = unwrap(&kek, &wrapped).expect("unwrap");
        assert_eq!(unwrapped, plaintext);
    }

    #[test]
    fn unwrap_rejects_tampered_ciphertext() {
        let kek = [0x42u8; 32];
        let plaintext = [7u8; 32];
        let mut wrapped = wrap(&kek, &plaintext);
        wrapped[0] ^= 0xFF;
        assert!(unwrap(&kek, &wrapped).is_none());
    }
}
