// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Page snapshots and change measurement.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Normalized text of a watched page at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Hex SHA-256 of `text`.
    pub hash: String,
    /// Length of `text` in characters.
    pub length: usize,
    pub text: String,
    pub taken_at: DateTime<Utc>,
}

impl PageSnapshot {
    pub fn capture(text: String) -> Self {
        Self {
            hash: content_hash(&text),
            length: text.chars().count(),
            text,
            taken_at: Utc::now(),
        }
    }
}

pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Relative length change in percent. Growth from empty counts as 100%.
pub fn change_percentage(old_len: usize, new_len: usize) -> f64 {
    if old_len == 0 {
        return if new_len == 0 { 0.0 } else { 100.0 };
    }
    old_len.abs_diff(new_len) as f64 * 100.0 / old_len as f64
}

/// Line-level summary of what changed, at most `max_lines` lines.
///
/// Removed lines come first (`- `), then added lines (`+ `), each in page
/// order. Truncation is noted on a final line.
pub fn diff_summary(old: &str, new: &str, max_lines: usize) -> String {
    let old_lines: HashSet<&str> = old.lines().collect();
    let new_lines: HashSet<&str> = new.lines().collect();

    let removed = old
        .lines()
        .filter(|line| !new_lines.contains(line))
        .map(|line| format!("- {line}"));
    let added = new
        .lines()
        .filter(|line| !old_lines.contains(line))
        .map(|line| format!("+ {line}"));

    let changes: Vec<String> = removed.chain(added).collect();
    if changes.len() <= max_lines {
        return changes.join("\n");
    }

    let hidden = changes.len() - max_lines;
    let mut summary = changes[..max_lines].join("\n");
    if !summary.is_empty() {
        summary.push('\n');
    }
    summary.push_str(&format!("... {hidden} more changed lines"));
    summary
}
