// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The error taxonomy surfaced across peer connection lifecycle, config
//! loading boundaries, and socket plumbing (spec §7 "Error taxonomy").
//!
//! Codec and framing failures (`FecUncorrectable`, `CrcMismatch`,
//! `MalformedFrame`) are recovered locally by the layer that detects them
//! and counted, never propagated as a `DvmError` — see each module's own
//! decode/assemble return types. `DvmError` is reserved for conditions that
//! do cross a layer boundary to a caller.

use std::fmt;

/// Top-level error type for operations that cross a layer boundary.
#[derive(Debug, Clone)]
pub enum DvmError {
    /// Login/auth step rejected; peer must restart the handshake.
    AuthRejected {
        /// Opcode-specific reason code returned in the `*NAK` response.
        reason: u8,
    },
    /// PDU retransmit ceiling reached; `NACK_UNDELIVERABLE` was produced.
    RetryExhausted {
        /// Number of retries actually attempted.
        attempts: u8,
    },
    /// A liveness deadline elapsed (ping, jitter release, SNDCP timer).
    Timeout(TimeoutKind),
    /// Underlying socket I/O failure.
    SocketError(String),
    /// A peer-list row, KMM frame, or other startup artifact could not be
    /// parsed; the row is skipped and the subsystem continues.
    ConfigError(String),
}

/// Which liveness deadline produced a [`DvmError::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// Peer missed `peer.ping_timeout_cycles` consecutive pings.
    PeerPing,
    /// Jitter buffer `max_wait_µs` elapsed for a buffered frame.
    JitterRelease,
    /// SNDCP `READY` or `STANDBY` timer expired.
    Sndcp,
}

impl fmt::Display for DvmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthRejected { reason } => write!(f, "auth rejected, reason code {reason}"),
            Self::RetryExhausted { attempts } => {
                write!(f, "retry ceiling reached after {attempts} attempts")
            }
            Self::Timeout(kind) => write!(f, "timeout: {kind:?}"),
            Self::SocketError(msg) => write!(f, "socket error: {msg}"),
            Self::ConfigError(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for DvmError {}

impl From<std::io::Error> for DvmError {
    fn from(e: std::io::Error) -> Self {
        Self::SocketError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            DvmError::AuthRejected { reason: 3 }.to_string(),
            "auth rejected, reason code 3"
        );
        assert_eq!(
            DvmError::RetryExhausted { attempts: 2 }.to_string(),
            "retry ceiling reached after 2 attempts"
        );
        assert_eq!(
            DvmError::Timeout(TimeoutKind::JitterRelease).to_string(),
            "timeout: JitterRelease"
        );
    }

    #[test]
    fn io_error_converts_to_socket_error() {
        let io_err = std::io::Error::other("connection reset");
        let err: DvmError = io_err.into();
        assert!(matches!(err, DvmError::SocketError(_)));
    }
}
