// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fatal-condition stack-trace dumping (spec §7, §9).
//!
//! Only initialization errors terminate the process, and when they do, a
//! single-line diagnostic plus a backtrace is written to the daily
//! stack-trace file (`{root}-YYYY-MM-DD.stacktrace.log`).
//!
//! Two paths feed the same file:
//! - [`install_panic_hook`] registers a `std::panic::set_hook` that captures
//!   a `std::backtrace::Backtrace` and writes it through the normal
//!   (allocating, buffered) file-output path. This covers ordinary Rust
//!   panics.
//! - [`install_signal_handler`] registers `SIGSEGV`/`SIGABRT` handlers via
//!   raw `libc` that write a fixed, pre-formatted byte buffer with `write(2)`
//!   only — no allocation, no locking — satisfying the async-signal-safety
//!   invariant the redesign note in spec §9 calls for. These handlers cannot
//!   capture a Rust backtrace (that path is not signal-safe); they record
//!   only the signal number and a fixed banner.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::sync::OnceLock;

/// Install a panic hook that appends a formatted panic message and
/// backtrace to `{root}-YYYY-MM-DD.stacktrace.log`, then calls the
/// previously installed hook (if any) so default reporting still happens.
pub fn install_panic_hook(root: impl Into<String>) {
    let root = root.into();
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let path = format!("{root}-{date}.stacktrace.log");
        let backtrace = std::backtrace::Backtrace::force_capture();

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = writeln!(
                file,
                "{} FATAL {}\n{}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                info,
                backtrace
            );
            let _ = file.flush();
        }

        previous(info);
    }));
}

/// Raw fd the async-signal-safe handler writes to, set once by
/// [`install_signal_handler`]. A `libc::write` on an `i32` fd is itself
/// async-signal-safe; opening the file is not, so that happens ahead of
/// time on the installing thread.
static SIGNAL_LOG_FD: OnceLock<i32> = OnceLock::new();

/// Install `SIGSEGV`/`SIGABRT` handlers that append a fixed banner to
/// `{root}-YYYY-MM-DD.stacktrace.log` using only `write(2)`.
///
/// # Safety
/// The handler body touches only a raw fd and a stack buffer; it performs
/// no allocation and takes no locks, so it is safe to run on the signal
/// stack. This function itself is safe to call from ordinary code.
pub fn install_signal_handler(root: impl AsRef<str>) -> std::io::Result<()> {
    let date = Local::now().format("%Y-%m-%d").to_string();
    let path = format!("{}-{}.stacktrace.log", root.as_ref(), date);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o644)
        .open(path)?;
    let fd = file.as_raw_fd();
    // Leak the handle: it must outlive the process, and the signal handler
    // only ever needs the raw fd, not the owning File.
    std::mem::forget(file);
    let _ = SIGNAL_LOG_FD.set(fd);

    unsafe {
        libc::signal(libc::SIGSEGV, handle_fatal_signal as libc::sighandler_t);
        libc::signal(libc::SIGABRT, handle_fatal_signal as libc::sighandler_t);
    }
    Ok(())
}

extern "C" fn handle_fatal_signal(signum: libc::c_int) {
    if let Some(&fd) = SIGNAL_LOG_FD.get() {
        let banner: &[u8] = match signum {
            libc::SIGSEGV => b"FATAL: SIGSEGV received, terminating\n",
            libc::SIGABRT => b"FATAL: SIGABRT received, terminating\n",
            _ => b"FATAL: unexpected signal, terminating\n",
        };
        unsafe {
            libc::write(fd, banner.as_ptr().cast(), banner.len());
        }
    }
    unsafe {
        libc::_exit(134);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn panic_hook_writes_stacktrace_file() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("dvm").to_string_lossy().to_string();
        install_panic_hook(root.clone());

        let result = std::panic::catch_unwind(|| {
            panic!("simulated fatal condition");
        });
        assert!(result.is_err());

        let today = Local::now().format("%Y-%m-%d").to_string();
        let contents =
            std::fs::read_to_string(format!("{root}-{today}.stacktrace.log")).expect("read");
        assert!(contents.contains("simulated fatal condition"));
    }
}
