//! The commit writer.

use serde_json::Value;
use tracing::{debug, warn};

use super::commit::{Commit, RefId};
use super::config::GitConfig;
use super::error::GitError;
use super::store::CommitStore;
use crate::codec::Patch;
use crate::json_patch::hooks::ValueHooks;

/// True when the commit about to be written at position `count` (0-based)
/// should carry a snapshot.
pub fn snapshot_due(snapshot_window: u32, count: u64) -> bool {
    snapshot_window > 0 && count % u64::from(snapshot_window) == 0
}

/// Record the transition `previous → current` for `ref_id`.
///
/// Returns `Ok(None)` when nothing changed; no commit is written. The
/// patch is replayed onto `previous` before it is appended, so a patch the
/// applicator refuses (a `__proto__` key, for one) fails with
/// [`GitError::Patch`] and never reaches the store. The
/// snapshot check and the append are two separate store calls, so two
/// writers racing on the same `ref_id` can miss or double a snapshot
/// boundary. Replay stays correct either way.
pub fn write_commit(
    store: &dyn CommitStore,
    ref_id: &RefId,
    previous: &Value,
    current: &Value,
    config: &GitConfig,
    hooks: &dyn ValueHooks,
) -> Result<Option<Commit>, GitError> {
    let Some(patch) = Patch::create(config.patcher, previous, current, hooks)? else {
        debug!(%ref_id, "no changes, commit skipped");
        return Ok(None);
    };

    if let Err(err) = patch.apply(previous.clone(), hooks) {
        warn!(%ref_id, error = %err, "patch does not replay, commit refused");
        return Err(err.into());
    }

    let count = store.count_commits(ref_id)?;
    let snapshot = snapshot_due(config.snapshot_window, count).then(|| current.clone());
    let with_snapshot = snapshot.is_some();

    let ops = patch.len();
    match store.append_commit(ref_id, patch, snapshot) {
        Ok(commit) => {
            debug!(%ref_id, id = %commit.id, ops, snapshot = with_snapshot, "commit written");
            Ok(Some(commit))
        }
        Err(err) => {
            warn!(%ref_id, error = %err, "commit rejected by store");
            Err(err.into())
        }
    }
}
