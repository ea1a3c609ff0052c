// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layer: per-stream adaptive jitter buffering (spec §4.5).

pub mod buffer;

pub use buffer::{AdaptiveJitterBuffer, BufferedFrame, JitterStats};
