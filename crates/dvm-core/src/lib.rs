// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dvm-core - Digital Voice Modem protocol and link layer
//!
//! A pure Rust implementation of the channel coding, PDU assembly, key
//! management, and peer-framing layers underneath a DVM-style P25/DMR/NXDN
//! fixed network equipment (FNE) stack.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dvm_core::fec::hamming_15_11_a;
//! use dvm_core::jitter::AdaptiveJitterBuffer;
//!
//! // Correct a single-bit error in a DMR half-rate Hamming codeword.
//! let (data, corrected) = hamming_15_11_a().decode(0b0110_1011_0010_110);
//!
//! // Feed RTP-like sequence numbers through the adaptive jitter buffer.
//! let mut jitter = AdaptiveJitterBuffer::new(4, 40_000);
//! let mut ready = Vec::new();
//! jitter.process_frame(0, vec![0xAA], 0, &mut ready);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                    Layer 5: Peer / FNE protocol                     |
//! |   peer::handshake (login)  |  peer::connection (liveness)          |
//! |   peer::list (authorized peers, spec S4.8)                          |
//! +---------------------------------------------------------------------+
//! |           Layer 4: Transport crypto and batched I/O                 |
//! |   crypto::datagram (AES-256-ECB whole-datagram wrap, spec S4.6)     |
//! |   crypto::sendq (sendmmsg-batched outbound queue)                   |
//! +---------------------------------------------------------------------+
//! |         Layer 3: Access control                |  acl (radio IDs,  |
//! |                                                    talkgroups, S4.7)|
//! +---------------------------------------------------------------------+
//! |   Layer 2: PDU / link control / key management messages             |
//! |   pdu (data header, block assembly, SNDCP, S4.3)                    |
//! |   lc (P25 LC/TDULC/TSBK, DMR LC/CSBK, S4.2)                         |
//! |   kmm (TIA-102.AACA-C key management framing, S4.4)                 |
//! +---------------------------------------------------------------------+
//! |        Layer 1: Channel coding       |  coding (DMR/P25/NXDN frame  |
//! |                                          assembly over FEC, S4.2)   |
//! +---------------------------------------------------------------------+
//! |        Layer 0: Forward error correction (fec, S4.1)                |
//! |   Golay, Hamming, QR, BPTC, Reed-Solomon, half/3-rate trellis        |
//! +---------------------------------------------------------------------+
//! ```
//!
//! Jitter buffering (spec S4.5) and configuration/error plumbing sit
//! alongside this stack rather than inside it: [`jitter`] consumes
//! decoded frames from any layer-1 coder, [`config`] and [`error`] are
//! shared across every layer above Layer 0.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`config::RuntimeConfig`] | Lock-free shared runtime configuration |
//! | [`error::DvmError`] | Error taxonomy for cross-layer boundary failures |
//! | [`jitter::AdaptiveJitterBuffer`] | Per-stream adaptive jitter buffer |
//! | [`peer::PeerList`] | Authorized-peer table, loaded from a flat file |
//! | [`kmm::KmmHeader`] | Key Management Message common header |
//!
//! ## Features
//!
//! - **`logging`** (default) - compile-time configurable logging, daily
//!   rolling diagnostic/activity logs, fatal-signal stack traces
//! - **`crypto`** (default) - AES key wrap, datagram wrapping, KMM MAC
//!   signing (pulls in `aes`, `cipher`, `cbc`, `cmac`, `sha2`, `zeroize`)
//! - **`trace`** - function entry/exit tracing, layered on `logging`
//! - **`syslog`** - route the activity log through the system logger
//!
//! ## See Also
//!
//! - [TIA-102.BAAA] Project 25 FDMA Common Air Interface
//! - [TIA-102.AACA-C] Project 25 Over-The-Air-Rekeying (OTAR) Protocol
//! - [ETSI TS 102 361] Digital Mobile Radio (DMR) Air Interface

// Clippy: No blanket suppressions. Fix issues properly or use inline #[allow] with justification.

/// Layer 0: forward error correction primitives (spec S4.1).
pub mod fec;
/// Layer 1: channel codings for DMR, P25, and NXDN (spec S4.2).
pub mod coding;
/// Layer 2a: PDU data header/block framing, assembly, and SNDCP (spec S4.3).
pub mod pdu;
/// Layer 2b: voice and control link-control structures (spec S4.2, S4.5).
pub mod lc;
/// Layer 2c: Key Management Message framing (spec S4.4).
pub mod kmm;
/// Layer 3: radio-ID and talkgroup-ID access control (spec S4.7).
pub mod acl;
/// Layer 4: whole-datagram AES wrapping and the batched send queue (spec S4.6).
pub mod crypto;
/// Layer 3/5: peer list, login handshake, and connection liveness (spec S6, S5).
pub mod peer;
/// Layer 4/5: per-stream adaptive jitter buffering (spec S4.5).
pub mod jitter;
/// Global configuration (protocol constants, runtime config).
pub mod config;
/// The error taxonomy surfaced across layer boundaries (spec S7).
pub mod error;
/// Compile-time configurable logging system.
pub mod logging;

pub use config::RuntimeConfig;
pub use error::{DvmError, TimeoutKind};

/// `dvm-core` version string.
pub const VERSION: &str = "0.1.0";
