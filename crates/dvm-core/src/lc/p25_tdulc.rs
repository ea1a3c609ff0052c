// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! P25 Terminator Data Unit with Link Control: pairs [`P25LinkControl`]
//! with its [`TduLcFrame`] RS(24,12,13) + Golay(24,12,8) framing.

use super::p25_lc::P25LinkControl;
use crate::coding::p25::TduLcFrame;

/// A complete, channel-ready TDULC: parsed link control plus its
/// FEC-coded transmission.
#[derive(Debug, Clone)]
pub struct Tdulc {
    pub link_control: P25LinkControl,
}

impl Tdulc {
    #[must_use]
    pub fn new(link_control: P25LinkControl) -> Self {
        Self { link_control }
    }

    /// Encode to the 36-byte RS(24,12,13)+Golay(24,12,8) FEC field ready
    /// for transmission.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        TduLcFrame::new(self.link_control.to_payload()).encode()
    }

    /// Decode a received 36-byte FEC field.
    #[must_use]
    pub fn decode(coded: &[u8]) -> Self {
        let frame = TduLcFrame::decode(coded);
        Self {
            link_control: P25LinkControl::parse(&frame.payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_clean() {
        let lc = P25LinkControl::GroupVoice {
            mfid: 0x00,
            emergency: false,
            encrypted: false,
            priority: 1,
            group_id: 0x0A0B,
            source_id: 0x00C0FFEE & 0xFFFFFF,
        };
        let tdulc = Tdulc::new(lc.clone());
        let coded = tdulc.encode();
        let decoded = Tdulc::decode(&coded);
        assert_eq!(decoded.link_control, lc);
    }
}
