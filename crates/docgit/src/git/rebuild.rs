//! Tree reconstruction: nearest snapshot plus replay.

use serde_json::Value;
use tracing::debug;

use super::commit::{Commit, CommitRange, RefId};
use super::error::GitError;
use super::refs::{resolve_ref, CommitRef};
use super::store::CommitStore;
use crate::json_patch::hooks::ValueHooks;

/// Rebuild `ref_id`'s tree as of `target`.
///
/// Seeds from the newest snapshot at or before `target` and replays the
/// commits after it in id order, one at a time from the store stream.
/// `None` means the object did not exist at that point.
pub fn rebuild_at(
    store: &dyn CommitStore,
    ref_id: &RefId,
    target: &Commit,
    hooks: &dyn ValueHooks,
) -> Result<Option<Value>, GitError> {
    let seed = store.find_nearest_snapshot(ref_id, target.id)?;
    let mut range = CommitRange::up_to(target.id);
    let mut tree = match seed {
        Some(Commit {
            id,
            snapshot: Some(snapshot),
            ..
        }) => {
            range = range.after(id);
            snapshot
        }
        _ => Value::Null,
    };

    let mut replayed = 0usize;
    for commit in store.stream_commits(ref_id, range)? {
        let commit = commit?;
        tree = commit.patch.apply(tree, hooks)?;
        replayed += 1;
    }
    debug!(
        %ref_id,
        target = %target.id,
        seed = ?range.after.map(|id| id.to_string()),
        replayed,
        "rebuilt tree"
    );

    Ok(match tree {
        Value::Null => None,
        tree => Some(tree),
    })
}

/// Resolve `reference` and rebuild the tree at that commit.
pub fn rebuild(
    store: &dyn CommitStore,
    ref_id: &RefId,
    reference: &CommitRef,
    hooks: &dyn ValueHooks,
) -> Result<Option<Value>, GitError> {
    let target = resolve_ref(store, ref_id, reference)?;
    rebuild_at(store, ref_id, &target, hooks)
}
