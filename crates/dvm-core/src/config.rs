// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DVM core configuration - Single Source of Truth
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: Compile-time constants for protocol timers, retry
//!   ceilings, and buffer defaults that are not meant to vary at runtime.
//! - **Level 2 (Dynamic)**: [`RuntimeConfig`] for the options in the external
//!   interface table: jitter tunables, peer ping liveness, the crypto
//!   preshared key, ACL enable flags, PDU retry count, SNDCP timers.
//!
//! Loading these values from an on-disk YAML file or CLI flags is outside
//! this crate's scope (see the crate root docs); `RuntimeConfig` only models
//! the parsed, in-memory result.

use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::Arc;

// =======================================================================
// Level 1: Static protocol constants
// =======================================================================

/// Default adaptive jitter buffer capacity, in frames (spec §4.5).
pub const DEFAULT_JITTER_MAX_SIZE: u16 = 4;

/// Default adaptive jitter buffer release timeout, in microseconds (spec §4.5).
pub const DEFAULT_JITTER_MAX_WAIT_US: u32 = 40_000;

/// PDU retransmit ceiling before `NACK_UNDELIVERABLE` is surfaced (spec §5).
pub const DEFAULT_PDU_RETRY_CNT: u8 = 2;

/// SNDCP `READY` state timer, in seconds (spec §3).
pub const DEFAULT_SNDCP_READY_S: u32 = 10;

/// SNDCP `STANDBY` state timer, in seconds (spec §3).
pub const DEFAULT_SNDCP_STANDBY_S: u32 = 60;

/// Big-endian magic prefix for an AES-wrapped datagram (spec §4.6).
pub const DATAGRAM_MAGIC: u16 = 0xC8A2;

/// Consecutive socket read errors after which per-failure log lines are
/// suppressed until the next success (spec §7).
pub const SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD: u32 = 5;

/// Peer-list file field count below which trailing fields take documented
/// defaults (spec §4.8): `id,password,replica,alias,canRequestKeys,
/// canIssueInhibit,hasCallPriority,jitterEnabled,jitterMaxSize,jitterMaxWait`.
pub const PEER_LIST_FIELD_COUNT: usize = 10;

// =======================================================================
// Level 2: Runtime configuration (dynamic, lock-free)
// =======================================================================

/// Jitter buffer tunables (spec §6 `jitter.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterConfig {
    /// `jitter.enabled`.
    pub enabled: bool,
    /// `jitter.max_size`, buffer capacity in frames.
    pub max_size: u16,
    /// `jitter.max_wait_µs`, release timeout.
    pub max_wait_us: u32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: DEFAULT_JITTER_MAX_SIZE,
            max_wait_us: DEFAULT_JITTER_MAX_WAIT_US,
        }
    }
}

/// Peer connection liveness tunables (spec §6 `peer.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerLivenessConfig {
    /// `peer.ping_interval_ms`.
    pub ping_interval_ms: u32,
    /// `peer.ping_timeout_cycles`; missing this many consecutive pings
    /// disconnects the peer.
    pub ping_timeout_cycles: u32,
}

impl Default for PeerLivenessConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: 5_000,
            ping_timeout_cycles: 3,
        }
    }
}

/// ACL enable flags (spec §6 `acl.*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AclConfig {
    /// `acl.radio_ids_enabled`.
    pub radio_ids_enabled: bool,
    /// `acl.talkgroups_enabled`.
    pub talkgroups_enabled: bool,
}

/// SNDCP per-LLID state machine timers (spec §6 `sndcp.*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SndcpConfig {
    /// `sndcp.ready_s`.
    pub ready_s: u32,
    /// `sndcp.standby_s`.
    pub standby_s: u32,
}

impl Default for SndcpConfig {
    fn default() -> Self {
        Self {
            ready_s: DEFAULT_SNDCP_READY_S,
            standby_s: DEFAULT_SNDCP_STANDBY_S,
        }
    }
}

/// Shared runtime configuration (thread-safe, lock-free).
///
/// - `DashMap` holds free-form overrides (sharded, no global lock).
/// - `ArcSwap` holds the preshared key so the hot encrypt/decrypt path never
///   blocks on a mutex even while an operator rotates the key.
#[derive(Clone)]
pub struct RuntimeConfig {
    jitter: Arc<ArcSwap<JitterConfig>>,
    peer_liveness: Arc<ArcSwap<PeerLivenessConfig>>,
    acl: Arc<ArcSwap<AclConfig>>,
    sndcp: Arc<ArcSwap<SndcpConfig>>,
    pdu_retry_cnt: Arc<ArcSwap<u8>>,
    preshared_key: Arc<ArcSwap<Option<[u8; 32]>>>,
    overrides: Arc<DashMap<Arc<str>, Arc<str>>>,
}

impl RuntimeConfig {
    /// Create a runtime config with every documented default.
    #[must_use]
    pub fn new() -> Self {
        Self {
            jitter: Arc::new(ArcSwap::new(Arc::new(JitterConfig::default()))),
            peer_liveness: Arc::new(ArcSwap::new(Arc::new(PeerLivenessConfig::default()))),
            acl: Arc::new(ArcSwap::new(Arc::new(AclConfig::default()))),
            sndcp: Arc::new(ArcSwap::new(Arc::new(SndcpConfig::default()))),
            pdu_retry_cnt: Arc::new(ArcSwap::new(Arc::new(DEFAULT_PDU_RETRY_CNT))),
            preshared_key: Arc::new(ArcSwap::new(Arc::new(None))),
            overrides: Arc::new(DashMap::new()),
        }
    }

    /// Current jitter buffer tunables.
    #[must_use]
    pub fn jitter(&self) -> JitterConfig {
        **self.jitter.load()
    }

    /// Replace the jitter buffer tunables.
    pub fn set_jitter(&self, cfg: JitterConfig) {
        self.jitter.store(Arc::new(cfg));
    }

    /// Current peer liveness tunables.
    #[must_use]
    pub fn peer_liveness(&self) -> PeerLivenessConfig {
        **self.peer_liveness.load()
    }

    /// Replace the peer liveness tunables.
    pub fn set_peer_liveness(&self, cfg: PeerLivenessConfig) {
        self.peer_liveness.store(Arc::new(cfg));
    }

    /// Current ACL enable flags.
    #[must_use]
    pub fn acl(&self) -> AclConfig {
        **self.acl.load()
    }

    /// Replace the ACL enable flags.
    pub fn set_acl(&self, cfg: AclConfig) {
        self.acl.store(Arc::new(cfg));
    }

    /// Current SNDCP timers.
    #[must_use]
    pub fn sndcp(&self) -> SndcpConfig {
        **self.sndcp.load()
    }

    /// Replace the SNDCP timers.
    pub fn set_sndcp(&self, cfg: SndcpConfig) {
        self.sndcp.store(Arc::new(cfg));
    }

    /// `pdu.retry_cnt` (default 2, spec §6).
    #[must_use]
    pub fn pdu_retry_cnt(&self) -> u8 {
        **self.pdu_retry_cnt.load()
    }

    /// Set `pdu.retry_cnt`.
    pub fn set_pdu_retry_cnt(&self, n: u8) {
        self.pdu_retry_cnt.store(Arc::new(n));
    }

    /// The 32-byte preshared key, if datagram wrapping is enabled.
    ///
    /// Lock-free read on the per-datagram hot path (one atomic load).
    #[must_use]
    pub fn preshared_key(&self) -> Option<[u8; 32]> {
        **self.preshared_key.load()
    }

    /// Set (or clear, with `None`) the preshared key. `crypto.preshared_key`
    /// is a 32-byte hex string at the configuration-file boundary; the typed
    /// key is what flows through this struct.
    pub fn set_preshared_key(&self, key: Option<[u8; 32]>) {
        self.preshared_key.store(Arc::new(key));
    }

    /// Whether datagram wrapping is active (a preshared key is configured).
    #[must_use]
    pub fn crypto_enabled(&self) -> bool {
        self.preshared_key().is_some()
    }

    /// Record a free-form configuration override not otherwise modeled
    /// above (forward-compatibility escape hatch for fields this struct
    /// hasn't grown typed accessors for yet).
    pub fn set_override(&self, key: &str, value: &str) {
        self.overrides.insert(Arc::from(key), Arc::from(value));
    }

    /// Read a free-form override.
    #[must_use]
    pub fn get_override(&self, key: &str) -> Option<Arc<str>> {
        self.overrides.get(key).map(|v| Arc::clone(&v))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = RuntimeConfig::new();
        assert_eq!(config.jitter(), JitterConfig::default());
        assert_eq!(config.pdu_retry_cnt(), 2);
        assert_eq!(config.sndcp().ready_s, 10);
        assert_eq!(config.sndcp().standby_s, 60);
        assert!(!config.crypto_enabled());
    }

    #[test]
    fn preshared_key_round_trip() {
        let config = RuntimeConfig::new();
        let key = [0x42u8; 32];
        config.set_preshared_key(Some(key));
        assert!(config.crypto_enabled());
        assert_eq!(config.preshared_key(), Some(key));

        config.set_preshared_key(None);
        assert!(!config.crypto_enabled());
    }

    #[test]
    fn jitter_override_is_visible_to_clones() {
        let config = RuntimeConfig::new();
        let cloned = config.clone();

        config.set_jitter(JitterConfig {
            enabled: false,
            max_size: 8,
            max_wait_us: 80_000,
        });

        assert_eq!(cloned.jitter().max_size, 8);
        assert!(!cloned.jitter().enabled);
    }

    #[test]
    fn acl_defaults_are_disabled() {
        let config = RuntimeConfig::new();
        assert!(!config.acl().radio_ids_enabled);
        assert!(!config.acl().talkgroups_enabled);
    }

    #[test]
    fn free_form_override_round_trip() {
        let config = RuntimeConfig::new();
        assert!(config.get_override("custom.flag").is_none());
        config.set_override("custom.flag", "on");
        assert_eq!(config.get_override("custom.flag").as_deref(), Some("on"));
    }
}
