// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global read-mostly logging flags (spec §5).
//!
//! These mirror the four process-wide flags the log subsystem exposes:
//! `display_level`, `disable_time_display`, `use_syslog`,
//! `disable_network_log`. They are read far more often than written (every
//! log call site consults them), so each is a bare atomic rather than a
//! mutex-guarded value, matching the "read-mostly" characterization in the
//! concurrency model.
//!
//! `disable_network_log` additionally backs the §7 network-log suppression
//! rule: after [`SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD`](crate::config::SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD)
//! consecutive read errors on a peer connection, further per-failure log
//! lines are suppressed until the next successful read.

use super::output::LogLevel;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

static DISPLAY_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static DISABLE_TIME_DISPLAY: AtomicBool = AtomicBool::new(false);
static USE_SYSLOG: AtomicBool = AtomicBool::new(false);
static DISABLE_NETWORK_LOG: AtomicBool = AtomicBool::new(false);
static CONSECUTIVE_READ_ERRORS: AtomicU32 = AtomicU32::new(0);

/// Current minimum level the console/file outputs should display.
#[must_use]
pub fn display_level() -> LogLevel {
    match DISPLAY_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Debug,
        1 => LogLevel::Info,
        2 => LogLevel::Warning,
        _ => LogLevel::Error,
    }
}

/// Set the minimum display level.
pub fn set_display_level(level: LogLevel) {
    DISPLAY_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Whether timestamps should be omitted from formatted log lines.
#[must_use]
pub fn disable_time_display() -> bool {
    DISABLE_TIME_DISPLAY.load(Ordering::Relaxed)
}

/// Toggle timestamp display.
pub fn set_disable_time_display(disable: bool) {
    DISABLE_TIME_DISPLAY.store(disable, Ordering::Relaxed);
}

/// Whether syslog output is active alongside (or instead of) file output.
#[must_use]
pub fn use_syslog() -> bool {
    USE_SYSLOG.load(Ordering::Relaxed)
}

/// Toggle syslog output.
pub fn set_use_syslog(enabled: bool) {
    USE_SYSLOG.store(enabled, Ordering::Relaxed);
}

/// Whether per-failure network log lines are currently suppressed.
#[must_use]
pub fn disable_network_log() -> bool {
    DISABLE_NETWORK_LOG.load(Ordering::Relaxed)
}

/// Force the network-log suppression gate to a specific state.
pub fn set_disable_network_log(disabled: bool) {
    DISABLE_NETWORK_LOG.store(disabled, Ordering::Relaxed);
    if !disabled {
        CONSECUTIVE_READ_ERRORS.store(0, Ordering::Relaxed);
    }
}

/// Record a socket read error and return whether the caller should still
/// emit a log line for it.
///
/// Implements the spec §7 `SocketError` rule: after `threshold` consecutive
/// errors, suppression engages and this returns `false` until
/// [`record_socket_read_success`] resets the counter.
pub fn record_socket_read_error(threshold: u32) -> bool {
    let count = CONSECUTIVE_READ_ERRORS.fetch_add(1, Ordering::Relaxed) + 1;
    if count >= threshold {
        DISABLE_NETWORK_LOG.store(true, Ordering::Relaxed);
        return count == threshold;
    }
    true
}

/// Record a successful socket read, clearing the suppression gate.
pub fn record_socket_read_success() {
    CONSECUTIVE_READ_ERRORS.store(0, Ordering::Relaxed);
    DISABLE_NETWORK_LOG.store(false, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD;
    use serial_test_shim::serial;

    // Logging flags are process-global; guard tests with a trivial in-crate
    // mutex so they don't race each other under `cargo test`'s thread pool.
    mod serial_test_shim {
        use std::sync::Mutex;
        static LOCK: Mutex<()> = Mutex::new(());

        pub fn serial<F: FnOnce()>(f: F) {
            let _guard = LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            f();
        }
    }

    #[test]
    fn display_level_round_trip() {
        serial(|| {
            set_display_level(LogLevel::Warning);
            assert_eq!(display_level(), LogLevel::Warning);
            set_display_level(LogLevel::Debug);
            assert_eq!(display_level(), LogLevel::Debug);
        });
    }

    #[test]
    fn network_log_suppresses_after_threshold() {
        serial(|| {
            set_disable_network_log(false);
            let mut last_should_log = true;
            for _ in 0..SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD {
                last_should_log = record_socket_read_error(SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD);
            }
            assert!(last_should_log, "the threshold-th error still logs once");
            assert!(disable_network_log());

            // Further errors stay suppressed and report "don't log again".
            assert!(!record_socket_read_error(SOCKET_ERROR_LOG_SUPPRESS_THRESHOLD));

            record_socket_read_success();
            assert!(!disable_network_log());
        });
    }
}
