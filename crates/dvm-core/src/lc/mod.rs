// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layer 2b: voice and control link-control structures (spec §4.2, §4.5).
//!
//! Where [`super::coding`] handles raw bit framing and FEC, this module
//! interprets the payload those frames carry: P25's link-control opcodes
//! and trunking signalling blocks, and DMR's full link control and
//! control signalling blocks. Each type here knows how to pack itself
//! into (and parse itself out of) the fixed-width payload its coding-layer
//! frame type expects.

pub mod dmr_csbk;
pub mod dmr_lc;
pub mod p25_lc;
pub mod p25_tdulc;
pub mod p25_tsbk;
