//! Error types for the versioning layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::commit::CommitId;
use super::store::StoreError;
use crate::json_patch::types::PatchError;

/// Missing or unusable settings. Fatal; never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no commit store registered for namespace '{0}'")]
    MissingStore(String),
    #[error("missing store namespace: set `collection_name` or provide a host collection")]
    MissingNamespace,
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A commit reference that is malformed or points at nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    #[error("invalid commit identifier '{0}'")]
    Invalid(String),
    #[error("no commit found with offset {0}")]
    OffsetOutOfRange(u64),
    #[error("no commit found at or before {0}")]
    BeforeFirstCommit(DateTime<Utc>),
    #[error("no commit found with id '{0}'")]
    UnknownId(CommitId),
}

#[derive(Debug, Error)]
pub enum GitError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ref(#[from] RefError),
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The context variant cannot perform this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
    /// A before-commit callback refused the commit.
    #[error("commit vetoed: {0}")]
    Vetoed(String),
}
