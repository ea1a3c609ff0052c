// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fuzz target for Key Management Message frame decoding.
//!
//! Feeds arbitrary bytes to `kmm::decode`; no input should panic,
//! including frames that claim an `ENH_MAC` trailer the slice is too
//! short to actually hold.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = dvm_core::kmm::decode(data);
});
