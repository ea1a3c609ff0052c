// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Talkgroup rules ACL table (spec §4.7): maps a talkgroup ID to its
//! active/invalid state and routing preference.

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TalkgroupRule {
    pub active: bool,
    pub invalid: bool,
    pub non_preferred: bool,
}

/// Talkgroup-rules lookup table with independent ACL-enforcement toggle.
pub struct TalkgroupLookup {
    rules: DashMap<u32, TalkgroupRule>,
    acl_enforced: bool,
}

impl TalkgroupLookup {
    #[must_use]
    pub fn new(acl_enforced: bool) -> Self {
        Self { rules: DashMap::new(), acl_enforced }
    }

    pub fn insert(&self, id: u32, rule: TalkgroupRule) {
        self.rules.insert(id, rule);
    }

    pub fn set_acl_enforced(&mut self, enforced: bool) {
        self.acl_enforced = enforced;
    }

    /// Validate a talkgroup ID (spec §4.7 `validate_tg_id`). TG 0 is
    /// rejected unless `allow_zero`.
    #[must_use]
    pub fn validate_tg_id(&self, id: u32, allow_zero: bool) -> bool {
        if id == 0 && !allow_zero {
            return false;
        }
        if !self.acl_enforced {
            return true;
        }
        match self.rules.get(&id) {
            Some(rule) => !rule.invalid && rule.active,
            None => false,
        }
    }

    /// Whether `id`'s rule demotes routing priority (spec §4.7
    /// `tg_non_preferred`). An unknown talkgroup is never non-preferred.
    #[must_use]
    pub fn tg_non_preferred(&self, id: u32) -> bool {
        self.rules.get(&id).is_some_and(|rule| rule.non_preferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tg_zero_rejected_unless_allowed() {
        let table = TalkgroupLookup::new(false);
        assert!(!table.validate_tg_id(0, false));
        assert!(table.validate_tg_id(0, true));
    }

    #[test]
    fn acl_off_accepts_unconditionally() {
        let table = TalkgroupLookup::new(false);
        assert!(table.validate_tg_id(12345, false));
    }

    #[test]
    fn acl_on_requires_active_non_invalid_rule() {
        let table = TalkgroupLookup::new(true);
        table.insert(1, TalkgroupRule { active: true, invalid: false, non_preferred: false });
        table.insert(2, TalkgroupRule { active: false, invalid: false, non_preferred: false });
        table.insert(3, TalkgroupRule { active: true, invalid: true, non_preferred: false });
        assert!(table.validate_tg_id(1, false));
        assert!(!table.validate_tg_id(2, false));
        assert!(!table.validate_tg_id(3, false));
        assert!(!table.validate_tg_id(999, false));
    }

    #[test]
    fn non_preferred_flag_reads_through() {
        let table = TalkgroupLookup::new(true);
        table.insert(1, TalkgroupRule { active: true, invalid: false, non_preferred: true });
        assert!(table.tg_non_preferred(1));
        assert!(!table.tg_non_preferred(2));
    }
}
