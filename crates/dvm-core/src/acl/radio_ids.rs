// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Radio ID ACL table (spec §4.7): maps a subscriber unit ID to whether
//! it's `enabled` and whether it counts as a `default` grant when ACL
//! enforcement is off.

use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioIdEntry {
    pub enabled: bool,
    pub default: bool,
}

/// Radio-ID lookup table with independent ACL-enforcement toggle.
pub struct RadioIdLookup {
    entries: DashMap<u32, RadioIdEntry>,
    acl_enforced: bool,
}

impl RadioIdLookup {
    #[must_use]
    pub fn new(acl_enforced: bool) -> Self {
        Self { entries: DashMap::new(), acl_enforced }
    }

    pub fn insert(&self, id: u32, entry: RadioIdEntry) {
        self.entries.insert(id, entry);
    }

    pub fn set_acl_enforced(&mut self, enforced: bool) {
        self.acl_enforced = enforced;
    }

    /// Validate a source radio ID (spec §4.7 `validate_src_id`).
    #[must_use]
    pub fn validate_src_id(&self, id: u32) -> bool {
        match self.entries.get(&id) {
            Some(entry) if self.acl_enforced => entry.enabled,
            Some(entry) => entry.default,
            None => !self.acl_enforced,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acl_off_grants_on_default_flag() {
        let table = RadioIdLookup::new(false);
        table.insert(1, RadioIdEntry { enabled: false, default: true });
        table.insert(2, RadioIdEntry { enabled: false, default: false });
        assert!(table.validate_src_id(1));
        assert!(!table.validate_src_id(2));
    }

    #[test]
    fn acl_on_requires_enabled_entry() {
        let table = RadioIdLookup::new(true);
        table.insert(1, RadioIdEntry { enabled: true, default: false });
        table.insert(2, RadioIdEntry { enabled: false, default: true });
        assert!(table.validate_src_id(1));
        assert!(!table.validate_src_id(2));
        assert!(!table.validate_src_id(999));
    }
}
