//! Callback registration points for the host integration layer.
//!
//! The core never watches the host's documents itself. The host calls into
//! [`Git`](super::Git) at load and save time, and these callbacks run at
//! those moments.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::commit::{Commit, RefId};
use super::error::GitError;

/// The transition about to be committed.
#[derive(Debug, Clone, Copy)]
pub struct CommitEvent<'a> {
    pub ref_id: &'a RefId,
    pub previous: &'a Value,
    pub current: &'a Value,
}

type LoadFn = Arc<dyn Fn(&RefId, &Value) + Send + Sync>;
type BeforeCommitFn = Arc<dyn Fn(&CommitEvent<'_>) -> Result<(), String> + Send + Sync>;
type AfterCommitFn = Arc<dyn Fn(&RefId, Option<&Commit>) + Send + Sync>;

/// Registered lifecycle callbacks, run in registration order.
#[derive(Clone, Default)]
pub struct LifecycleHooks {
    load: Vec<LoadFn>,
    before_commit: Vec<BeforeCommitFn>,
    after_commit: Vec<AfterCommitFn>,
}

impl LifecycleHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs when a document context is opened over loaded state.
    pub fn on_load(mut self, f: impl Fn(&RefId, &Value) + Send + Sync + 'static) -> Self {
        self.load.push(Arc::new(f));
        self
    }

    /// Runs before a commit is written. An `Err` vetoes the commit.
    pub fn on_before_commit(
        mut self,
        f: impl Fn(&CommitEvent<'_>) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.before_commit.push(Arc::new(f));
        self
    }

    /// Runs after a commit attempt that did not fail. The commit is `None`
    /// when there was nothing to record.
    pub fn on_after_commit(
        mut self,
        f: impl Fn(&RefId, Option<&Commit>) + Send + Sync + 'static,
    ) -> Self {
        self.after_commit.push(Arc::new(f));
        self
    }

    pub(crate) fn run_load(&self, ref_id: &RefId, state: &Value) {
        for f in &self.load {
            f(ref_id, state);
        }
    }

    pub(crate) fn run_before_commit(&self, event: &CommitEvent<'_>) -> Result<(), GitError> {
        for f in &self.before_commit {
            f(event).map_err(GitError::Vetoed)?;
        }
        Ok(())
    }

    pub(crate) fn run_after_commit(&self, ref_id: &RefId, commit: Option<&Commit>) {
        for f in &self.after_commit {
            f(ref_id, commit);
        }
    }
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("load", &self.load.len())
            .field("before_commit", &self.before_commit.len())
            .field("after_commit", &self.after_commit.len())
            .finish()
    }
}
