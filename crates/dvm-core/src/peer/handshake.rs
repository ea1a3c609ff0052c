// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! FNE peer login handshake (spec §6):
//!
//! 1. Peer → FNE: `RPTL` + peer-id.
//! 2. FNE → Peer: a random salt, or `MSTNAK` + reason code.
//! 3. Peer → FNE: `RPTK` + peer-id + `SHA-256(salt ∥ password)`.
//! 4. FNE → Peer: `MSTACK` or `MSTNAK`.
//! 5. Peer → FNE: `RPTC` + peer-id + JSON configuration blob.
//! 6. FNE enters `RUNNING` for this peer.

use sha2::{Digest, Sha256};

use crate::error::DvmError;

/// Login state as tracked by the FNE side of the handshake for one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Waiting for `RPTL`.
    AwaitingLogin,
    /// Salt issued, waiting for `RPTK`.
    AwaitingKey { salt: u32 },
    /// Key accepted, waiting for `RPTC`.
    AwaitingConfig,
    /// `RPTC` accepted; the peer is live.
    Running,
}

/// Reason codes carried in an `MSTNAK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NakReason {
    PeerNotAllowed,
    BadPassword,
    MalformedConfig,
}

/// Compute the `RPTK` digest: `SHA-256(salt ∥ password)`, salt as
/// big-endian bytes.
#[must_use]
pub fn key_digest(salt: u32, password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt.to_be_bytes());
    hasher.update(password.as_bytes());
    hasher.into()
}

/// FNE-side handshake driver for a single peer connection.
pub struct Handshake {
    peer_id: u32,
    state: HandshakeState,
    password: String,
}

impl Handshake {
    #[must_use]
    pub fn new(peer_id: u32, password: String) -> Self {
        Self { peer_id, state: HandshakeState::AwaitingLogin, password }
    }

    #[must_use]
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Step 1/2: accept `RPTL`, checking `peer_allowed` (typically
    /// `PeerList::is_peer_allowed`). Returns the salt to send, or a NAK.
    pub fn handle_login(&mut self, peer_id: u32, peer_allowed: bool) -> Result<u32, NakReason> {
        if peer_id != self.peer_id || !peer_allowed {
            return Err(NakReason::PeerNotAllowed);
        }
        let salt = ((u64::from(peer_id) * 2_654_435_761) & 0xFFFF_FFFF) as u32 | 1;
        self.state = HandshakeState::AwaitingKey { salt };
        Ok(salt)
    }

    /// Step 3/4: accept `RPTK`'s digest against the salt issued in step 2.
    pub fn handle_key(&mut self, digest: &[u8; 32]) -> Result<(), NakReason> {
        let HandshakeState::AwaitingKey { salt } = self.state else {
            return Err(NakReason::BadPassword);
        };
        if *digest != key_digest(salt, &self.password) {
            return Err(NakReason::BadPassword);
        }
        self.state = HandshakeState::AwaitingConfig;
        Ok(())
    }

    /// Step 5/6: accept `RPTC`'s JSON configuration blob. Any non-empty,
    /// brace-delimited payload is treated as parseable; malformed input
    /// NAKs without advancing state.
    pub fn handle_config(&mut self, config_json: &str) -> Result<(), DvmError> {
        if !matches!(self.state, HandshakeState::AwaitingConfig) {
            return Err(DvmError::AuthRejected { reason: NakReason::MalformedConfig as u8 });
        }
        let trimmed = config_json.trim();
        if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
            return Err(DvmError::ConfigError(format!("malformed RPTC config from peer {}", self.peer_id)));
        }
        self.state = HandshakeState::Running;
        Ok(())
    }
}
