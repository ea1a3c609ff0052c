// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-peer connection lifecycle (spec §5 "Cancellation and timeouts"):
//! tracks liveness via missed-ping counting and transitions a peer to
//! `Disconnected` once it exceeds `peer.ping_timeout_cycles`.

use crate::config::PeerLivenessConfig;
use crate::error::{DvmError, TimeoutKind};
use crate::peer::handshake::{Handshake, HandshakeState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    LoggingIn,
    Running,
    Disconnected,
}

/// One peer's connection: its handshake state plus ping liveness.
pub struct PeerConnection {
    handshake: Handshake,
    liveness: PeerLivenessConfig,
    missed_pings: u32,
}

impl PeerConnection {
    #[must_use]
    pub fn new(peer_id: u32, password: String, liveness: PeerLivenessConfig) -> Self {
        Self { handshake: Handshake::new(peer_id, password), liveness, missed_pings: 0 }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        match self.handshake.state() {
            HandshakeState::Running => ConnectionState::Running,
            HandshakeState::AwaitingLogin
            | HandshakeState::AwaitingKey { .. }
            | HandshakeState::AwaitingConfig => ConnectionState::LoggingIn,
        }
    }

    #[must_use]
    pub fn handshake_mut(&mut self) -> &mut Handshake {
        &mut self.handshake
    }

    /// A keepalive ping arrived; resets the missed-ping counter.
    pub fn record_ping(&mut self) {
        self.missed_pings = 0;
    }

    /// One `ping_interval_ms` tick elapsed with no ping observed. Returns
    /// `Err` once the peer exceeds `ping_timeout_cycles`, at which point
    /// the caller should drop the connection and its jitter buffers.
    pub fn tick_missed_ping(&mut self) -> Result<(), DvmError> {
        if self.state() != ConnectionState::Running {
            return Ok(());
        }
        self.missed_pings += 1;
        if self.missed_pings > self.liveness.ping_timeout_cycles {
            return Err(DvmError::Timeout(TimeoutKind::PeerPing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_connection() -> PeerConnection {
        let mut conn = PeerConnection::new(1, "pw".to_string(), PeerLivenessConfig::default());
        let salt = conn.handshake_mut().handle_login(1, true).unwrap();
        let digest = crate::peer::handshake::key_digest(salt, "pw");
        conn.handshake_mut().handle_key(&digest).unwrap();
        conn.handshake_mut().handle_config("{}").unwrap();
        conn
    }

    #[test]
    fn missed_pings_under_ceiling_stay_connected() {
        let mut conn = running_connection();
        for _ in 0..conn.liveness.ping_timeout_cycles {
            assert!(conn.tick_missed_ping().is_ok());
        }
        assert_eq!(conn.state(), ConnectionState::Running);
    }

    #[test]
    fn missed_pings_past_ceiling_time_out() {
        let mut conn = running_connection();
        for _ in 0..conn.liveness.ping_timeout_cycles {
            conn.tick_missed_ping().unwrap();
        }
        assert!(conn.tick_missed_ping().is_err());
    }

    #[test]
    fn ping_resets_counter() {
        let mut conn = running_connection();
        conn.tick_missed_ping().unwrap();
        conn.record_ping();
        for _ in 0..conn.liveness.ping_timeout_cycles {
            assert!(conn.tick_missed_ping().is_ok());
        }
    }

    #[test]
    fn logging_in_peer_never_times_out_on_missed_ping() {
        let mut conn = PeerConnection::new(1, "pw".to_string(), PeerLivenessConfig::default());
        for _ in 0..100 {
            assert!(conn.tick_missed_ping().is_ok());
        }
        assert_eq!(conn.state(), ConnectionState::LoggingIn);
    }
}
