// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Daily-rolled file outputs (spec §6 "Persisted State").
//!
//! Two outputs share the same rolling discipline but write to distinct
//! files: [`DailyRollingFileOutput`] is the general diagnostic log
//! (`{root}-YYYY-MM-DD.log`), and [`ActivityLogOutput`] is the short,
//! printf-style steady-state activity line (`{root}-YYYY-MM-DD.activity.log`)
//! described in spec §7's "peer-id + identity qualifier" convention.

use super::output::{LogLevel, Output};
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;

fn open_for_date(root: &str, suffix: &str, date: &str) -> io::Result<File> {
    let path = format!("{root}-{date}{suffix}");
    OpenOptions::new().create(true).append(true).open(path)
}

struct RollState {
    file: File,
    date: String,
}

/// Daily-rolled diagnostic log output.
///
/// Rolls to a new file at the local-midnight boundary: the first write
/// after the date changes opens `{root}-YYYY-MM-DD.log` for the new day and
/// all subsequent writes go there.
pub struct DailyRollingFileOutput {
    root: String,
    suffix: &'static str,
    level_filter: LogLevel,
    state: Mutex<RollState>,
}

impl DailyRollingFileOutput {
    /// Open (or create) today's diagnostic log file under `root`.
    pub fn new(root: impl Into<String>, level_filter: LogLevel) -> io::Result<Self> {
        Self::with_suffix(root, ".log", level_filter)
    }

    fn with_suffix(
        root: impl Into<String>,
        suffix: &'static str,
        level_filter: LogLevel,
    ) -> io::Result<Self> {
        let root = root.into();
        let date = Local::now().format("%Y-%m-%d").to_string();
        let file = open_for_date(&root, suffix, &date)?;
        Ok(Self {
            root,
            suffix,
            level_filter,
            state: Mutex::new(RollState { file, date }),
        })
    }

    fn with_current_file<R>(&self, f: impl FnOnce(&mut File) -> io::Result<R>) -> io::Result<R> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("daily rolling output mutex poisoned"))?;

        let today = Local::now().format("%Y-%m-%d").to_string();
        if today != state.date {
            state.file = open_for_date(&self.root, self.suffix, &today)?;
            state.date = today;
        }

        f(&mut state.file)
    }
}

impl Output for DailyRollingFileOutput {
    fn write(&self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.level_filter {
            return Ok(());
        }
        let line = if super::flags::disable_time_display() {
            format!("[{}] {}\n", level.as_str(), message)
        } else {
            format!(
                "{} [{}] {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level.as_str(),
                message
            )
        };
        self.with_current_file(|file| file.write_all(line.as_bytes()))
    }

    fn flush(&self) -> io::Result<()> {
        self.with_current_file(Write::flush)
    }
}

/// Daily-rolled activity log output.
///
/// Activity lines are terse and peer-qualified (spec §7): the caller is
/// expected to have already prefixed `message` with the peer-id and
/// identity qualifier (`@name` sysview, `%name` replica, `+name` neighbor,
/// else a blank qualifier). This output just handles the file rotation and
/// leaves formatting to the caller, matching the distinction the original
/// `ActivityLog` makes from the general diagnostic logger.
pub struct ActivityLogOutput {
    inner: DailyRollingFileOutput,
}

impl ActivityLogOutput {
    /// Open (or create) today's activity log file under `root`.
    pub fn new(root: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            inner: DailyRollingFileOutput::with_suffix(root, ".activity.log", LogLevel::Debug)?,
        })
    }

    /// Append one pre-formatted activity line.
    pub fn record(&self, line: &str) -> io::Result<()> {
        self.inner.with_current_file(|file| {
            let stamped = format!(
                "{} {}\n",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                line
            );
            file.write_all(stamped.as_bytes())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn daily_rolling_output_writes_today_file() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("dvm").to_string_lossy().to_string();

        let output = DailyRollingFileOutput::new(&root, LogLevel::Debug).expect("open");
        output.write(LogLevel::Info, "peer 12 connected").expect("write");
        output.flush().expect("flush");

        let today = Local::now().format("%Y-%m-%d").to_string();
        let contents = std::fs::read_to_string(format!("{root}-{today}.log")).expect("read");
        assert!(contents.contains("peer 12 connected"));
        assert!(contents.contains("[INFO"));
    }

    #[test]
    fn activity_log_records_preformatted_lines() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("dvm").to_string_lossy().to_string();

        let activity = ActivityLogOutput::new(&root).expect("open");
        activity.record("@master-1 9001 login accepted").expect("record");

        let today = Local::now().format("%Y-%m-%d").to_string();
        let contents =
            std::fs::read_to_string(format!("{root}-{today}.activity.log")).expect("read");
        assert!(contents.contains("@master-1 9001 login accepted"));
    }

    #[test]
    fn below_filter_level_is_not_written() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("dvm").to_string_lossy().to_string();

        let output = DailyRollingFileOutput::new(&root, LogLevel::Warning).expect("open");
        output.write(LogLevel::Debug, "should be filtered").expect("write");
        output.flush().expect("flush");

        let today = Local::now().format("%Y-%m-%d").to_string();
        let contents = std::fs::read_to_string(format!("{root}-{today}.log")).expect("read");
        assert!(!contents.contains("should be filtered"));
    }
}
