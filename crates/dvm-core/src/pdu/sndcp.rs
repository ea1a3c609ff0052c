// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! SNDCP per-LLID context state machine (spec §3, §4.3): tracks whether a
//! data-capable subscriber's logical link is ready to receive a packet
//! data grant, backing off to standby and then closed as timers expire.
//!
//! States `{CLOSED, IDLE, READY_S, STANDBY, READY}` with a `READY_timer`
//! and a `STANDBY_timer`, grounded on the reference packet-data handler's
//! per-tick state table walk (`Data::clockSNDCPTimers` in the reference
//! implementation): `IDLE` starts the ready timer when a grant is
//! permitted; `READY_S` falls back to `IDLE` and emits a call-termination
//! event when the ready timer expires; `STANDBY` resets to `CLOSED` when
//! the standby timer expires.

use crate::config::SndcpConfig;
use std::collections::HashMap;

/// SNDCP context state for one logical link ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SndcpState {
    Closed,
    Idle,
    ReadyS,
    Standby,
    Ready,
}

/// An event emitted by [`SndcpTable::tick`] when a timer expiration
/// changes an LLID's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SndcpEvent {
    /// The ready timer expired in `READY_S`: the LLID falls back to
    /// `IDLE` and a call-termination frame should be emitted for it.
    CallTerminated { llid: u32 },
    /// The standby timer expired: the LLID's context was reset to
    /// `CLOSED`.
    ContextClosed { llid: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Context {
    state: SndcpState,
    ready_elapsed_s: u32,
    standby_elapsed_s: u32,
}

/// The full per-LLID SNDCP state table for one P25/DMR data session.
pub struct SndcpTable {
    contexts: HashMap<u32, Context>,
    config: SndcpConfig,
}

impl SndcpTable {
    #[must_use]
    pub fn new(config: SndcpConfig) -> Self {
        Self { contexts: HashMap::new(), config }
    }

    #[must_use]
    pub fn is_initialized(&self, llid: u32) -> bool {
        self.contexts.contains_key(&llid)
    }

    /// First-time initialization for an LLID: enters `IDLE`.
    pub fn initialize(&mut self, llid: u32) {
        self.contexts.entry(llid).or_insert(Context {
            state: SndcpState::Idle,
            ready_elapsed_s: 0,
            standby_elapsed_s: 0,
        });
    }

    /// Tear down an LLID's context back to `CLOSED`.
    pub fn reset(&mut self, llid: u32) {
        if let Some(ctx) = self.contexts.get_mut(&llid) {
            ctx.state = SndcpState::Closed;
            ctx.ready_elapsed_s = 0;
            ctx.standby_elapsed_s = 0;
        }
    }

    #[must_use]
    pub fn state(&self, llid: u32) -> Option<SndcpState> {
        self.contexts.get(&llid).map(|c| c.state)
    }

    /// The dest-ID grant was permitted for `llid` while it's `IDLE`:
    /// starts the ready timer and transitions to `READY_S`.
    pub fn grant_permitted(&mut self, llid: u32) {
        if let Some(ctx) = self.contexts.get_mut(&llid) {
            if ctx.state == SndcpState::Idle {
                ctx.state = SndcpState::ReadyS;
                ctx.ready_elapsed_s = 0;
            }
        }
    }

    /// A context-activation accept moves the LLID straight to `STANDBY`,
    /// starting the standby timer.
    pub fn activate(&mut self, llid: u32) {
        let ctx = self.contexts.entry(llid).or_insert(Context {
            state: SndcpState::Idle,
            ready_elapsed_s: 0,
            standby_elapsed_s: 0,
        });
        ctx.state = SndcpState::Standby;
        ctx.standby_elapsed_s = 0;
    }

    /// Traffic on the LLID while `STANDBY` or `READY_S` promotes it to
    /// full `READY`.
    pub fn mark_ready(&mut self, llid: u32) {
        if let Some(ctx) = self.contexts.get_mut(&llid) {
            ctx.state = SndcpState::Ready;
        }
    }

    /// Advance every context's timers by `elapsed_s` seconds, returning
    /// the events produced by any expirations.
    pub fn tick(&mut self, elapsed_s: u32) -> Vec<SndcpEvent> {
        let mut events = Vec::new();
        for (&llid, ctx) in &mut self.contexts {
            match ctx.state {
                SndcpState::Closed | SndcpState::Ready => {}
                SndcpState::Idle => {}
                SndcpState::ReadyS => {
                    ctx.ready_elapsed_s += elapsed_s;
                    if ctx.ready_elapsed_s >= self.config.ready_s {
                        ctx.state = SndcpState::Idle;
                        ctx.ready_elapsed_s = 0;
                        events.push(SndcpEvent::CallTerminated { llid });
                    }
                }
                SndcpState::Standby => {
                    ctx.standby_elapsed_s += elapsed_s;
                    if ctx.standby_elapsed_s >= self.config.standby_s {
                        ctx.state = SndcpState::Closed;
                        ctx.standby_elapsed_s = 0;
                        events.push(SndcpEvent::ContextClosed { llid });
                    }
                }
            }
        }
        events
    }
}
