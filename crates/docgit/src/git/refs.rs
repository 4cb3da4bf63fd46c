//! Commit reference parsing and resolution.
//!
//! String grammar, tried in order:
//!
//! 1. `HEAD` or `@`, optionally followed by `^` or `~` and optional digits:
//!    `HEAD` = 0, `HEAD^` = 1, `@~3` = 3. Anything else starting with
//!    `HEAD`/`@` is invalid.
//! 2. A commit id literal (16 hex digits).
//! 3. A timestamp: RFC 3339, `YYYY-MM-DDTHH:MM:SS[.f]` (UTC), or
//!    `YYYY-MM-DD` (midnight UTC).

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use tracing::trace;

use super::commit::{Commit, CommitId, RefId};
use super::error::{GitError, RefError};
use super::store::CommitStore;

pub const HEAD: &str = "HEAD";

// ── Input and parsed forms ────────────────────────────────────────────────

/// A user-supplied commit reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitRef {
    /// Positions back from the newest commit. Negative values count as
    /// their absolute value.
    Offset(i64),
    Date(DateTime<Utc>),
    Id(CommitId),
    /// Unparsed string form.
    Expr(String),
}

impl CommitRef {
    pub fn head() -> Self {
        CommitRef::Offset(0)
    }
}

impl From<i64> for CommitRef {
    fn from(n: i64) -> Self {
        CommitRef::Offset(n)
    }
}

impl From<i32> for CommitRef {
    fn from(n: i32) -> Self {
        CommitRef::Offset(i64::from(n))
    }
}

impl From<DateTime<Utc>> for CommitRef {
    fn from(date: DateTime<Utc>) -> Self {
        CommitRef::Date(date)
    }
}

impl From<CommitId> for CommitRef {
    fn from(id: CommitId) -> Self {
        CommitRef::Id(id)
    }
}

impl From<&str> for CommitRef {
    fn from(expr: &str) -> Self {
        CommitRef::Expr(expr.to_string())
    }
}

impl From<String> for CommitRef {
    fn from(expr: String) -> Self {
        CommitRef::Expr(expr)
    }
}

/// A reference reduced to one of the three lookup kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedRef {
    Offset(u64),
    Date(DateTime<Utc>),
    Id(CommitId),
}

// ── Parsing ───────────────────────────────────────────────────────────────

fn head_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(HEAD|@)([\^~](\d*))?$").expect("head ref pattern is valid"))
}

fn parse_head(expr: &str) -> Result<u64, RefError> {
    let caps = head_regex()
        .captures(expr)
        .ok_or_else(|| RefError::Invalid(expr.to_string()))?;
    if caps.get(2).is_none() {
        return Ok(0);
    }
    match caps.get(3).map(|m| m.as_str()).filter(|d| !d.is_empty()) {
        Some(digits) => digits
            .parse()
            .map_err(|_| RefError::Invalid(expr.to_string())),
        None => Ok(1),
    }
}

fn parse_date(expr: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(expr) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(expr, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(expr, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Reduce a reference to its lookup kind.
///
/// # Example
///
/// ```
/// use docgit::git::{parse_ref, CommitRef, ResolvedRef};
///
/// assert_eq!(parse_ref(&CommitRef::from("HEAD")).unwrap(), ResolvedRef::Offset(0));
/// assert_eq!(parse_ref(&CommitRef::from("@^")).unwrap(), ResolvedRef::Offset(1));
/// assert_eq!(parse_ref(&CommitRef::from("HEAD~4")).unwrap(), ResolvedRef::Offset(4));
/// assert_eq!(parse_ref(&CommitRef::from(-2)).unwrap(), ResolvedRef::Offset(2));
/// assert!(parse_ref(&CommitRef::from("HEAD^^")).is_err());
/// ```
pub fn parse_ref(reference: &CommitRef) -> Result<ResolvedRef, RefError> {
    let resolved = match reference {
        CommitRef::Offset(n) => ResolvedRef::Offset(n.unsigned_abs()),
        CommitRef::Date(date) => ResolvedRef::Date(*date),
        CommitRef::Id(id) => ResolvedRef::Id(*id),
        CommitRef::Expr(expr) if expr.starts_with(HEAD) || expr.starts_with('@') => {
            ResolvedRef::Offset(parse_head(expr)?)
        }
        CommitRef::Expr(expr) => {
            if let Some(id) = CommitId::parse_literal(expr) {
                ResolvedRef::Id(id)
            } else if let Some(date) = parse_date(expr) {
                ResolvedRef::Date(date)
            } else {
                return Err(RefError::Invalid(expr.clone()));
            }
        }
    };
    trace!(?reference, ?resolved, "parsed commit ref");
    Ok(resolved)
}

// ── Resolution ────────────────────────────────────────────────────────────

/// Locate the commit `reference` names in `ref_id`'s history.
pub fn resolve_ref(
    store: &dyn CommitStore,
    ref_id: &RefId,
    reference: &CommitRef,
) -> Result<Commit, GitError> {
    let found = match parse_ref(reference)? {
        ResolvedRef::Offset(n) => store
            .find_by_offset(ref_id, n)?
            .ok_or(RefError::OffsetOutOfRange(n))?,
        ResolvedRef::Date(date) => store
            .find_latest_at(ref_id, date)?
            .ok_or(RefError::BeforeFirstCommit(date))?,
        ResolvedRef::Id(id) => store
            .find_commit(ref_id, id)?
            .ok_or(RefError::UnknownId(id))?,
    };
    Ok(found)
}
