//! Version contexts: the user-facing history API.
//!
//! [`Git`] is the detached handle for one tracked collection. It opens
//! contexts over a single tracked object:
//!
//! - [`DocumentGit`] is bound to a live object held by the host; its active
//!   state is that object and it can commit.
//! - [`RefIdGit`] is bound to a refId only; its active state is the HEAD
//!   reconstruction and it cannot commit.
//!
//! Both implement [`VersionContext`].

use std::sync::Arc;

use serde_json::Value;

use super::commit::{Commit, LogEntry, LogQuery, RefId};
use super::config::GitConfig;
use super::error::GitError;
use super::lifecycle::{CommitEvent, LifecycleHooks};
use super::rebuild::{rebuild, rebuild_at};
use super::refs::{resolve_ref, CommitRef};
use super::registry::StoreRegistry;
use super::store::CommitStore;
use super::writer::write_commit;
use crate::codec::Patch;
use crate::json_patch::hooks::{AtomicLeaves, ValueHooks};

fn present(tree: Value) -> Option<Value> {
    match tree {
        Value::Null => None,
        tree => Some(tree),
    }
}

fn or_absent(tree: Option<&Value>) -> &Value {
    tree.unwrap_or(&Value::Null)
}

// ── Git (detached handle) ─────────────────────────────────────────────────

/// Versioning handle for one tracked collection.
#[derive(Clone)]
pub struct Git {
    store: Arc<dyn CommitStore>,
    namespace: String,
    config: GitConfig,
    hooks: Arc<dyn ValueHooks>,
    lifecycle: LifecycleHooks,
}

impl Git {
    /// Look up the commit store for `host_collection` in `registry`.
    ///
    /// The namespace is `config.collection_name` if set, otherwise the host
    /// collection name plus `config.collection_suffix`.
    pub fn new(
        registry: &StoreRegistry,
        host_collection: Option<&str>,
        config: GitConfig,
    ) -> Result<Self, GitError> {
        config.validate()?;
        let namespace = config.namespace(host_collection)?;
        let store = registry.get(&namespace)?;
        Ok(Self {
            store,
            namespace,
            config,
            hooks: Arc::new(AtomicLeaves),
            lifecycle: LifecycleHooks::default(),
        })
    }

    pub fn with_value_hooks(mut self, hooks: Arc<dyn ValueHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleHooks) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn config(&self) -> &GitConfig {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn store(&self) -> &dyn CommitStore {
        self.store.as_ref()
    }

    pub fn value_hooks(&self) -> &dyn ValueHooks {
        self.hooks.as_ref()
    }

    /// A read-only context over `ref_id`'s stored history.
    pub fn with_ref_id(&self, ref_id: impl Into<RefId>) -> RefIdGit {
        RefIdGit {
            git: self.clone(),
            ref_id: ref_id.into(),
        }
    }

    /// A context over an object the host just loaded. Its loaded state is
    /// taken as the committed head.
    pub fn with_document(&self, ref_id: impl Into<RefId>, loaded: Value) -> DocumentGit {
        let ref_id = ref_id.into();
        self.lifecycle.run_load(&ref_id, &loaded);
        DocumentGit {
            git: self.clone(),
            ref_id,
            head: present(loaded.clone()),
            current: loaded,
        }
    }

    /// A context over an object that has never been committed.
    pub fn new_document(&self, ref_id: impl Into<RefId>, state: Value) -> DocumentGit {
        DocumentGit {
            git: self.clone(),
            ref_id: ref_id.into(),
            head: None,
            current: state,
        }
    }

    /// The latest stored state of `ref_id`, `None` if it has no history or
    /// was deleted.
    pub fn head_of(&self, ref_id: &RefId) -> Result<Option<Value>, GitError> {
        match self.store.find_by_offset(ref_id, 0)? {
            Some(head) => rebuild_at(self.store(), ref_id, &head, self.value_hooks()),
            None => Ok(None),
        }
    }

    /// Commit `current` as the new state of `ref_id`, diffing against the
    /// stored HEAD. Pass `Value::Null` to record a deletion.
    ///
    /// The previous state always comes from the store, so repeating a call
    /// that already succeeded records nothing.
    pub fn commit_ref_id(
        &self,
        ref_id: &RefId,
        current: &Value,
    ) -> Result<Option<Commit>, GitError> {
        let previous = self.head_of(ref_id)?;
        self.commit_transition(ref_id, or_absent(previous.as_ref()), current)
    }

    /// Commit a batch of changes from a host bulk update or delete.
    ///
    /// Each refId is committed independently, in order, stopping at the
    /// first failure. Retrying the whole batch after a partial failure is
    /// safe: refIds that were already committed diff as unchanged.
    pub fn commit_bulk<I>(&self, changes: I) -> Result<Vec<Option<Commit>>, GitError>
    where
        I: IntoIterator<Item = (RefId, Value)>,
    {
        changes
            .into_iter()
            .map(|(ref_id, current)| self.commit_ref_id(&ref_id, &current))
            .collect()
    }

    fn commit_transition(
        &self,
        ref_id: &RefId,
        previous: &Value,
        current: &Value,
    ) -> Result<Option<Commit>, GitError> {
        self.lifecycle.run_before_commit(&CommitEvent {
            ref_id,
            previous,
            current,
        })?;
        let commit = write_commit(
            self.store(),
            ref_id,
            previous,
            current,
            &self.config,
            self.value_hooks(),
        )?;
        self.lifecycle.run_after_commit(ref_id, commit.as_ref());
        Ok(commit)
    }

    fn patch_between(&self, a: Option<&Value>, b: Option<&Value>) -> Result<Patch, GitError> {
        Ok(Patch::between(
            self.config.patcher,
            or_absent(a),
            or_absent(b),
            self.value_hooks(),
        )?)
    }
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("namespace", &self.namespace)
            .field("config", &self.config)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

// ── VersionContext ────────────────────────────────────────────────────────

/// History operations over one tracked object.
pub trait VersionContext {
    fn git(&self) -> &Git;

    fn ref_id(&self) -> &RefId;

    /// The state `status` compares against the head.
    fn active_state(&self) -> Result<Option<Value>, GitError>;

    /// The last committed state.
    fn head_state(&self) -> Result<Option<Value>, GitError>;

    /// Record the active state.
    fn commit(&mut self) -> Result<Option<Commit>, GitError>;

    fn resolve(&self, reference: &CommitRef) -> Result<Commit, GitError> {
        resolve_ref(self.git().store(), self.ref_id(), reference)
    }

    /// The tree as of `reference`; `None` if the object did not exist then.
    fn checkout(&self, reference: &CommitRef) -> Result<Option<Value>, GitError> {
        rebuild(
            self.git().store(),
            self.ref_id(),
            reference,
            self.git().value_hooks(),
        )
    }

    /// - no refs: same as [`status`](Self::status);
    /// - one ref: from that commit to the active state;
    /// - two refs: from the first commit to the second.
    fn diff(&self, a: Option<&CommitRef>, b: Option<&CommitRef>) -> Result<Patch, GitError> {
        match (a, b) {
            (None, None) => self.status(),
            (Some(only), None) | (None, Some(only)) => {
                let from = self.checkout(only)?;
                let to = self.active_state()?;
                self.git().patch_between(from.as_ref(), to.as_ref())
            }
            (Some(a), Some(b)) => {
                let from = self.checkout(a)?;
                let to = self.checkout(b)?;
                self.git().patch_between(from.as_ref(), to.as_ref())
            }
        }
    }

    /// Uncommitted changes: head → active state.
    fn status(&self) -> Result<Patch, GitError> {
        let head = self.head_state()?;
        let active = self.active_state()?;
        self.git().patch_between(head.as_ref(), active.as_ref())
    }

    /// Commits newest first, without their refId or snapshot.
    fn log(&self, query: &LogQuery) -> Result<Vec<LogEntry>, GitError> {
        let query = LogQuery {
            limit: Some(query.limit.unwrap_or(self.git().config().log_limit)),
            ..query.clone()
        };
        let commits = self.git().store().log(self.ref_id(), &query)?;
        Ok(commits.into_iter().map(LogEntry::from).collect())
    }
}

// ── DocumentGit ───────────────────────────────────────────────────────────

/// Context bound to a live object.
///
/// `head` is the last committed state and only moves when a commit
/// succeeds or finds nothing to record. A store rejection leaves it where
/// it was, so a retry recomputes the same diff.
#[derive(Debug, Clone)]
pub struct DocumentGit {
    git: Git,
    ref_id: RefId,
    head: Option<Value>,
    current: Value,
}

impl DocumentGit {
    pub fn current(&self) -> &Value {
        &self.current
    }

    pub fn head(&self) -> Option<&Value> {
        self.head.as_ref()
    }

    /// Replace the working state, as the host does when the object changes.
    pub fn set_current(&mut self, state: Value) {
        self.current = state;
    }

    /// Mutable access to the working state.
    pub fn current_mut(&mut self) -> &mut Value {
        &mut self.current
    }
}

impl VersionContext for DocumentGit {
    fn git(&self) -> &Git {
        &self.git
    }

    fn ref_id(&self) -> &RefId {
        &self.ref_id
    }

    fn active_state(&self) -> Result<Option<Value>, GitError> {
        Ok(present(self.current.clone()))
    }

    fn head_state(&self) -> Result<Option<Value>, GitError> {
        Ok(self.head.clone())
    }

    fn commit(&mut self) -> Result<Option<Commit>, GitError> {
        let commit =
            self.git
                .commit_transition(&self.ref_id, or_absent(self.head.as_ref()), &self.current)?;
        self.head = present(self.current.clone());
        Ok(commit)
    }
}

// ── RefIdGit ──────────────────────────────────────────────────────────────

/// Context bound to a refId only. The active state is the HEAD
/// reconstruction, so `status` is always empty.
#[derive(Debug, Clone)]
pub struct RefIdGit {
    git: Git,
    ref_id: RefId,
}

impl VersionContext for RefIdGit {
    fn git(&self) -> &Git {
        &self.git
    }

    fn ref_id(&self) -> &RefId {
        &self.ref_id
    }

    fn active_state(&self) -> Result<Option<Value>, GitError> {
        self.head_state()
    }

    fn head_state(&self) -> Result<Option<Value>, GitError> {
        self.git.head_of(&self.ref_id)
    }

    fn commit(&mut self) -> Result<Option<Commit>, GitError> {
        Err(GitError::Unsupported(
            "commit needs a live document; without one there are no changes to detect",
        ))
    }
}
