//! The commit record and its identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RefError;
use crate::codec::Patch;

// ── CommitId ──────────────────────────────────────────────────────────────

/// Store-assigned commit identifier. Strictly increasing in append order.
///
/// Written as exactly 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(pub u64);

impl CommitId {
    pub const HEX_LEN: usize = 16;

    /// Parse an id literal: exactly [`Self::HEX_LEN`] hex digits.
    pub fn parse_literal(raw: &str) -> Option<Self> {
        if raw.len() != Self::HEX_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(raw, 16).ok().map(CommitId)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for CommitId {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_literal(s).ok_or_else(|| RefError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for CommitId {
    type Error = RefError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.to_string()
    }
}

// ── RefId ─────────────────────────────────────────────────────────────────

/// Opaque key grouping one tracked object's history.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(String);

impl RefId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RefId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RefId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// ── Commit ────────────────────────────────────────────────────────────────

/// One immutable history entry.
///
/// `snapshot`, when present, is the full tree *after* `patch` was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "_id")]
    pub id: CommitId,
    #[serde(rename = "refId")]
    pub ref_id: RefId,
    pub date: DateTime<Utc>,
    pub patch: Patch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

impl Commit {
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }
}

/// A commit as shown by `log`: grouping key and snapshot are stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "_id")]
    pub id: CommitId,
    pub date: DateTime<Utc>,
    pub patch: Patch,
}

impl From<Commit> for LogEntry {
    fn from(commit: Commit) -> Self {
        Self {
            id: commit.id,
            date: commit.date,
            patch: commit.patch,
        }
    }
}

// ── Queries ───────────────────────────────────────────────────────────────

/// Page and date window for `log`. Results are newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub skip: usize,
    /// `None` falls back to the configured page size.
    pub limit: Option<usize>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl LogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn since(mut self, date: DateTime<Utc>) -> Self {
        self.since = Some(date);
        self
    }

    pub fn until(mut self, date: DateTime<Utc>) -> Self {
        self.until = Some(date);
        self
    }

    /// True when `date` falls inside the window (both bounds inclusive).
    pub fn admits(&self, date: DateTime<Utc>) -> bool {
        self.since.map_or(true, |s| date >= s) && self.until.map_or(true, |u| date <= u)
    }
}

/// Id range `(after, up_to]`; `after = None` starts at the first commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRange {
    pub after: Option<CommitId>,
    pub up_to: CommitId,
}

impl CommitRange {
    pub fn up_to(up_to: CommitId) -> Self {
        Self { after: None, up_to }
    }

    pub fn after(mut self, id: CommitId) -> Self {
        self.after = Some(id);
        self
    }

    pub fn contains(&self, id: CommitId) -> bool {
        id <= self.up_to && self.after.map_or(true, |a| id > a)
    }
}
