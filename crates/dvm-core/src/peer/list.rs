// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Peer list: a thread-safe `peer-id → PeerEntry` table with file-backed
//! load/save (spec §4.8), grounded on the reference `PeerListLookup`'s
//! comma-separated record schema and shared `read_many / exclusive_write`
//! locking policy (spec §5).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const DEFAULT_JITTER_MAX_SIZE: u16 = 4;
const DEFAULT_JITTER_MAX_WAIT: u32 = 40_000;

/// One peer-list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerEntry {
    pub id: u32,
    pub password: String,
    pub replica: bool,
    pub alias: String,
    pub can_request_keys: bool,
    pub can_issue_inhibit: bool,
    pub has_call_priority: bool,
    pub jitter_enabled: bool,
    pub jitter_max_size: u16,
    pub jitter_max_wait_us: u32,
}

impl PeerEntry {
    /// The entry [`PeerList::find`] returns for an unknown ID: disabled,
    /// empty alias/password.
    #[must_use]
    pub fn missing(id: u32) -> Self {
        Self {
            id,
            password: String::new(),
            replica: false,
            alias: String::new(),
            can_request_keys: false,
            can_issue_inhibit: false,
            has_call_priority: false,
            jitter_enabled: false,
            jitter_max_size: DEFAULT_JITTER_MAX_SIZE,
            jitter_max_wait_us: DEFAULT_JITTER_MAX_WAIT,
        }
    }

    fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.is_empty() {
            return None;
        }
        let id: u32 = fields[0].trim().parse().ok()?;
        let field = |i: usize| fields.get(i).map(|s| s.trim()).unwrap_or("");
        let flag = |i: usize| field(i) == "1";

        Some(Self {
            id,
            password: field(1).to_string(),
            replica: flag(2),
            alias: field(3).to_string(),
            can_request_keys: flag(4),
            can_issue_inhibit: flag(5),
            has_call_priority: flag(6),
            jitter_enabled: flag(7),
            jitter_max_size: field(8).parse().unwrap_or(DEFAULT_JITTER_MAX_SIZE),
            jitter_max_wait_us: field(9).parse().unwrap_or(DEFAULT_JITTER_MAX_WAIT),
        })
    }

    fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{},{}",
            self.id,
            self.password,
            u8::from(self.replica),
            self.alias,
            u8::from(self.can_request_keys),
            u8::from(self.can_issue_inhibit),
            u8::from(self.has_call_priority),
            u8::from(self.jitter_enabled),
            self.jitter_max_size,
            self.jitter_max_wait_us,
        )
    }
}

/// Thread-safe peer-id lookup table, optionally ACL-enforced.
pub struct PeerList {
    table: RwLock<HashMap<u32, PeerEntry>>,
    acl_enforced: bool,
}

impl PeerList {
    #[must_use]
    pub fn new(acl_enforced: bool) -> Self {
        Self { table: RwLock::new(HashMap::new()), acl_enforced }
    }

    pub fn add_entry(&self, entry: PeerEntry) {
        self.table.write().insert(entry.id, entry);
    }

    pub fn erase_entry(&self, id: u32) {
        self.table.write().remove(&id);
    }

    pub fn clear(&self) {
        self.table.write().clear();
    }

    /// Returns the entry for `id`, or [`PeerEntry::missing`] if absent.
    #[must_use]
    pub fn find(&self, id: u32) -> PeerEntry {
        self.table.read().get(&id).cloned().unwrap_or_else(|| PeerEntry::missing(id))
    }

    #[must_use]
    pub fn is_peer_in_list(&self, id: u32) -> bool {
        self.table.read().contains_key(&id)
    }

    /// Whether `id` may connect: unconditional when ACL is off, else must
    /// be present in the table.
    #[must_use]
    pub fn is_peer_allowed(&self, id: u32) -> bool {
        if !self.acl_enforced {
            return true;
        }
        self.is_peer_in_list(id)
    }

    #[must_use]
    pub fn table_as_list(&self) -> Vec<PeerEntry> {
        self.table.read().values().cloned().collect()
    }

    /// Load records from `path`, replacing the current table. Blank
    /// lines and lines beginning `#` are skipped. Returns `false` (table
    /// left empty) if the file can't be read or yields no entries.
    pub fn load(&self, path: &Path) -> std::io::Result<bool> {
        let contents = fs::read_to_string(path)?;
        self.clear();
        let mut count = 0;
        for line in contents.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(entry) = PeerEntry::parse_line(line) {
                self.add_entry(entry);
                count += 1;
            }
        }
        Ok(count > 0)
    }

    /// Write the current table to `path` in the same record schema.
    pub fn save(&self, path: &Path) -> std::io::Result<usize> {
        let table = self.table.read();
        let mut out = String::new();
        for entry in table.values() {
            out.push_str(&entry.to_line());
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(table.len())
    }
}
