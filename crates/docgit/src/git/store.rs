//! The commit store boundary.
//!
//! Persistence belongs to the host. The versioning core only needs an
//! append-only log per [`RefId`] with a handful of ordered range queries,
//! expressed by [`CommitStore`].

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::commit::{Commit, CommitId, CommitRange, LogQuery, RefId};
use crate::codec::Patch;

/// Errors reported by a commit store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The write failed validation (empty patch, malformed record, ...).
    #[error("commit rejected: {0}")]
    Rejected(String),
    /// A concurrent write won.
    #[error("write conflict: {0}")]
    Conflict(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Commits in ascending id order, produced lazily.
pub type CommitStream<'a> = Box<dyn Iterator<Item = Result<Commit, StoreError>> + Send + 'a>;

/// Append-only commit log, one linear history per [`RefId`].
///
/// Implementations assign ids and dates on append. Ids must be strictly
/// increasing per `RefId`.
pub trait CommitStore: Send + Sync {
    /// Persist a new commit. Must reject a patch with no operations.
    fn append_commit(
        &self,
        ref_id: &RefId,
        patch: Patch,
        snapshot: Option<Value>,
    ) -> Result<Commit, StoreError>;

    fn count_commits(&self, ref_id: &RefId) -> Result<u64, StoreError>;

    fn find_commit(&self, ref_id: &RefId, id: CommitId) -> Result<Option<Commit>, StoreError>;

    /// The commit `skip` positions back from the newest (0 = newest).
    fn find_by_offset(&self, ref_id: &RefId, skip: u64) -> Result<Option<Commit>, StoreError>;

    /// The greatest-id commit whose date is at or before `date`.
    fn find_latest_at(
        &self,
        ref_id: &RefId,
        date: DateTime<Utc>,
    ) -> Result<Option<Commit>, StoreError>;

    /// The greatest-id commit with id `<= max_id` that carries a snapshot.
    fn find_nearest_snapshot(
        &self,
        ref_id: &RefId,
        max_id: CommitId,
    ) -> Result<Option<Commit>, StoreError>;

    /// Commits with ids inside `range`, ascending.
    fn stream_commits<'a>(
        &'a self,
        ref_id: &RefId,
        range: CommitRange,
    ) -> Result<CommitStream<'a>, StoreError>;

    /// Commits newest first, windowed by `query`. A `None` limit returns
    /// everything after `skip`.
    fn log(&self, ref_id: &RefId, query: &LogQuery) -> Result<Vec<Commit>, StoreError>;
}
