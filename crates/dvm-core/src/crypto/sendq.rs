// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Batched outbound send queue (spec §4.6 "Batched send"): entries are
//! optionally AES-wrapped, then flushed in one `sendmmsg(2)` call on
//! Linux (a plain per-entry `send_to` loop elsewhere). A send failure
//! that looks like network-unreachable suppresses network-log emission
//! until the next successful send.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::crypto::datagram;

/// One queued outbound datagram.
pub struct SendEntry {
    pub destination: SocketAddr,
    pub bytes: Vec<u8>,
}

/// Outcome of a drain: how many entries were sent and how many failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendOutcome {
    pub sent: usize,
    pub failed: usize,
}

/// A queue of pending sends, drained in a batch by [`SendQueue::flush`].
pub struct SendQueue {
    tx: Sender<SendEntry>,
    rx: Receiver<SendEntry>,
    /// Suppresses network-log emission after an unreachable-network
    /// failure, until a send next succeeds.
    log_suppressed: AtomicBool,
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SendQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx, log_suppressed: AtomicBool::new(false) }
    }

    pub fn push(&self, destination: SocketAddr, bytes: Vec<u8>) {
        let _ = self.tx.send(SendEntry { destination, bytes });
    }

    #[must_use]
    pub fn is_log_suppressed(&self) -> bool {
        self.log_suppressed.load(Ordering::Relaxed)
    }

    /// Drain every queued entry, encrypting under `psk` if set, and send
    /// them via `socket`.
    pub fn flush(&self, socket: &UdpSocket, psk: Option<&[u8; 32]>) -> SendOutcome {
        let mut entries = Vec::new();
        while let Ok(entry) = self.rx.try_recv() {
            entries.push(entry);
        }
        if entries.is_empty() {
            return SendOutcome::default();
        }

        let wire: Vec<(SocketAddr, Vec<u8>)> = entries
            .into_iter()
            .map(|e| {
                let bytes = match psk {
                    Some(key) => datagram::wrap(key, &e.bytes),
                    None => e.bytes,
                };
                (e.destination, bytes)
            })
            .collect();

        let outcome = send_batch(socket, &wire);

        if outcome.sent > 0 {
            self.log_suppressed.store(false, Ordering::Relaxed);
        } else if outcome.failed > 0 {
            self.log_suppressed.store(true, Ordering::Relaxed);
        }

        outcome
    }
}

#[cfg(target_os = "linux")]
fn send_batch(socket: &UdpSocket, wire: &[(SocketAddr, Vec<u8>)]) -> SendOutcome {
    use std::os::unix::io::AsRawFd;

    let fd = socket.as_raw_fd();
    let mut outcome = SendOutcome::default();

    // libc::sendmmsg's sockaddr plumbing needs each datagram's address
    // and iovec to outlive the syscall; build them up front per batch.
    let mut iovecs: Vec<libc::iovec> = Vec::with_capacity(wire.len());
    let mut sockaddrs: Vec<libc::sockaddr_storage> = Vec::with_capacity(wire.len());
    let mut addr_lens: Vec<libc::socklen_t> = Vec::with_capacity(wire.len());

    for (dest, bytes) in wire {
        iovecs.push(libc::iovec { iov_base: bytes.as_ptr() as *mut _, iov_len: bytes.len() });
        let (storage, len) = socket_addr_to_storage(*dest);
        sockaddrs.push(storage);
        addr_lens.push(len);
    }

    let mut msgs: Vec<libc::mmsghdr> = wire
        .iter()
        .enumerate()
        .map(|(i, _)| libc::mmsghdr {
            msg_hdr: libc::msghdr {
                msg_name: std::ptr::addr_of_mut!(sockaddrs[i]).cast(),
                msg_namelen: addr_lens[i],
                msg_iov: std::ptr::addr_of_mut!(iovecs[i]),
                msg_iovlen: 1,
                msg_control: std::ptr::null_mut(),
                msg_controllen: 0,
                msg_flags: 0,
            },
            msg_len: 0,
        })
        .collect();

    let sent = unsafe { libc::sendmmsg(fd, msgs.as_mut_ptr(), msgs.len() as u32, 0) };

    if sent < 0 {
        outcome.failed = wire.len();
    } else {
        outcome.sent = sent as usize;
        outcome.failed = wire.len() - outcome.sent;
    }
    outcome
}

#[cfg(target_os = "linux")]
fn socket_addr_to_storage(addr: SocketAddr) -> (libc::sockaddr_storage, libc::socklen_t) {
    use std::mem::{size_of, zeroed};

    unsafe {
        let mut storage: libc::sockaddr_storage = zeroed();
        match addr {
            SocketAddr::V4(v4) => {
                let sin = libc::sockaddr_in {
                    sin_family: libc::AF_INET as libc::sa_family_t,
                    sin_port: v4.port().to_be(),
                    sin_addr: libc::in_addr { s_addr: u32::from_ne_bytes(v4.ip().octets()) },
                    sin_zero: [0; 8],
                };
                std::ptr::write(std::ptr::addr_of_mut!(storage).cast(), sin);
                (storage, size_of::<libc::sockaddr_in>() as libc::socklen_t)
            }
            SocketAddr::V6(v6) => {
                let sin6 = libc::sockaddr_in6 {
                    sin6_family: libc::AF_INET6 as libc::sa_family_t,
                    sin6_port: v6.port().to_be(),
                    sin6_flowinfo: v6.flowinfo(),
                    sin6_addr: libc::in6_addr { s6_addr: v6.ip().octets() },
                    sin6_scope_id: v6.scope_id(),
                };
                std::ptr::write(std::ptr::addr_of_mut!(storage).cast(), sin6);
                (storage, size_of::<libc::sockaddr_in6>() as libc::socklen_t)
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn send_batch(socket: &UdpSocket, wire: &[(SocketAddr, Vec<u8>)]) -> SendOutcome {
    let mut outcome = SendOutcome::default();
    for (dest, bytes) in wire {
        match socket.send_to(bytes, dest) {
            Ok(_) => outcome.sent += 1,
            Err(_) => outcome.failed += 1,
        }
    }
    outcome
}
