//! In-process [`CommitStore`].

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use super::commit::{Commit, CommitId, CommitRange, LogQuery, RefId};
use super::store::{CommitStore, CommitStream, StoreError};
use crate::codec::Patch;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Default)]
struct Inner {
    last_id: u64,
    histories: IndexMap<RefId, Vec<Commit>>,
}

impl Inner {
    fn history(&self, ref_id: &RefId) -> &[Commit] {
        self.histories.get(ref_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Commit store held in memory.
///
/// Ids come from one counter shared by every history, so they also order
/// commits across refIds. Dates come from the system clock unless a clock
/// is injected with [`MemoryStore::with_clock`].
pub struct MemoryStore {
    inner: RwLock<Inner>,
    clock: Clock,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock: Box::new(Utc::now),
        }
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            clock: Box::new(clock),
        }
    }

    /// Every refId with at least one commit, in first-commit order.
    pub fn ref_ids(&self) -> Vec<RefId> {
        self.inner.read().histories.keys().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MemoryStore")
            .field("last_id", &inner.last_id)
            .field("histories", &inner.histories.len())
            .finish()
    }
}

impl CommitStore for MemoryStore {
    fn append_commit(
        &self,
        ref_id: &RefId,
        patch: Patch,
        snapshot: Option<Value>,
    ) -> Result<Commit, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::Rejected("patch has no operations".into()));
        }
        let date = (self.clock)();
        let mut inner = self.inner.write();
        inner.last_id += 1;
        let commit = Commit {
            id: CommitId(inner.last_id),
            ref_id: ref_id.clone(),
            date,
            patch,
            snapshot,
        };
        inner
            .histories
            .entry(ref_id.clone())
            .or_default()
            .push(commit.clone());
        Ok(commit)
    }

    fn count_commits(&self, ref_id: &RefId) -> Result<u64, StoreError> {
        Ok(self.inner.read().history(ref_id).len() as u64)
    }

    fn find_commit(&self, ref_id: &RefId, id: CommitId) -> Result<Option<Commit>, StoreError> {
        let inner = self.inner.read();
        let history = inner.history(ref_id);
        Ok(history
            .binary_search_by_key(&id, |c| c.id)
            .ok()
            .map(|idx| history[idx].clone()))
    }

    fn find_by_offset(&self, ref_id: &RefId, skip: u64) -> Result<Option<Commit>, StoreError> {
        let inner = self.inner.read();
        let Ok(skip) = usize::try_from(skip) else {
            return Ok(None);
        };
        Ok(inner.history(ref_id).iter().rev().nth(skip).cloned())
    }

    fn find_latest_at(
        &self,
        ref_id: &RefId,
        date: DateTime<Utc>,
    ) -> Result<Option<Commit>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .history(ref_id)
            .iter()
            .rev()
            .find(|c| c.date <= date)
            .cloned())
    }

    fn find_nearest_snapshot(
        &self,
        ref_id: &RefId,
        max_id: CommitId,
    ) -> Result<Option<Commit>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .history(ref_id)
            .iter()
            .rev()
            .find(|c| c.id <= max_id && c.has_snapshot())
            .cloned())
    }

    fn stream_commits<'a>(
        &'a self,
        ref_id: &RefId,
        range: CommitRange,
    ) -> Result<CommitStream<'a>, StoreError> {
        let start = {
            let inner = self.inner.read();
            let history = inner.history(ref_id);
            match range.after {
                Some(after) => history.partition_point(|c| c.id <= after),
                None => 0,
            }
        };
        Ok(Box::new(MemoryStream {
            store: self,
            ref_id: ref_id.clone(),
            range,
            pos: start,
        }))
    }

    fn log(&self, ref_id: &RefId, query: &LogQuery) -> Result<Vec<Commit>, StoreError> {
        let inner = self.inner.read();
        let matching = inner
            .history(ref_id)
            .iter()
            .rev()
            .filter(|c| query.admits(c.date))
            .skip(query.skip);
        Ok(match query.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }
}

/// Walks one history by position, taking the read lock per item.
struct MemoryStream<'a> {
    store: &'a MemoryStore,
    ref_id: RefId,
    range: CommitRange,
    pos: usize,
}

impl Iterator for MemoryStream<'_> {
    type Item = Result<Commit, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.store.inner.read();
        let commit = inner.history(&self.ref_id).get(self.pos)?;
        if !self.range.contains(commit.id) {
            return None;
        }
        self.pos += 1;
        Some(Ok(commit.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PatcherKind;
    use chrono::Duration;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn patch(n: i64) -> Patch {
        Patch {
            patcher: PatcherKind::MiniJsonPatch,
            ops: vec![json!(["~", "/n", n])],
        }
    }

    fn ticking_store() -> MemoryStore {
        let epoch = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let ticks = Arc::new(Mutex::new(0i64));
        MemoryStore::with_clock(move || {
            let mut t = ticks.lock();
            *t += 1;
            epoch + Duration::minutes(*t)
        })
    }

    #[test]
    fn rejects_empty_patch() {
        let store = MemoryStore::new();
        let empty = Patch { patcher: PatcherKind::JsonPatch, ops: vec![] };
        let err = store.append_commit(&"a".into(), empty, None).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));
        assert_eq!(store.count_commits(&"a".into()).unwrap(), 0);
    }

    #[test]
    fn ids_increase_across_refs() {
        let store = MemoryStore::new();
        let a1 = store.append_commit(&"a".into(), patch(1), None).unwrap();
        let b1 = store.append_commit(&"b".into(), patch(1), None).unwrap();
        let a2 = store.append_commit(&"a".into(), patch(2), None).unwrap();
        assert!(a1.id < b1.id && b1.id < a2.id);
        assert_eq!(store.count_commits(&"a".into()).unwrap(), 2);
        assert_eq!(store.find_commit(&"a".into(), b1.id).unwrap(), None);
        assert_eq!(store.find_commit(&"a".into(), a2.id).unwrap(), Some(a2));
        assert_eq!(store.ref_ids(), vec![RefId::from("a"), RefId::from("b")]);
    }

    #[test]
    fn offset_and_date_lookup() {
        let store = ticking_store();
        let r: RefId = "r".into();
        let c: Vec<_> = (0..3)
            .map(|n| store.append_commit(&r, patch(n), None).unwrap())
            .collect();
        assert_eq!(store.find_by_offset(&r, 0).unwrap().unwrap().id, c[2].id);
        assert_eq!(store.find_by_offset(&r, 2).unwrap().unwrap().id, c[0].id);
        assert_eq!(store.find_by_offset(&r, 3).unwrap(), None);

        let at = store.find_latest_at(&r, c[1].date + Duration::seconds(30)).unwrap();
        assert_eq!(at.unwrap().id, c[1].id);
        assert_eq!(store.find_latest_at(&r, c[0].date - Duration::seconds(1)).unwrap(), None);
    }

    #[test]
    fn nearest_snapshot_and_stream() {
        let store = MemoryStore::new();
        let r: RefId = "r".into();
        let s1 = store.append_commit(&r, patch(0), Some(json!({"n": 0}))).unwrap();
        let c2 = store.append_commit(&r, patch(1), None).unwrap();
        let c3 = store.append_commit(&r, patch(2), None).unwrap();

        let snap = store.find_nearest_snapshot(&r, c3.id).unwrap().unwrap();
        assert_eq!(snap.id, s1.id);

        let ids: Vec<_> = store
            .stream_commits(&r, CommitRange::up_to(c3.id).after(s1.id))
            .unwrap()
            .map(|c| c.unwrap().id)
            .collect();
        assert_eq!(ids, vec![c2.id, c3.id]);

        let ids: Vec<_> = store
            .stream_commits(&r, CommitRange::up_to(c2.id))
            .unwrap()
            .map(|c| c.unwrap().id)
            .collect();
        assert_eq!(ids, vec![s1.id, c2.id]);
    }

    #[test]
    fn stream_does_not_hold_the_lock() {
        let store = MemoryStore::new();
        let r: RefId = "r".into();
        let first = store.append_commit(&r, patch(0), None).unwrap();
        let mut stream = store.stream_commits(&r, CommitRange::up_to(CommitId(u64::MAX))).unwrap();
        assert_eq!(stream.next().unwrap().unwrap().id, first.id);
        let second = store.append_commit(&r, patch(1), None).unwrap();
        assert_eq!(stream.next().unwrap().unwrap().id, second.id);
        assert!(stream.next().is_none());
    }

    #[test]
    fn log_is_newest_first_and_windowed() {
        let store = ticking_store();
        let r: RefId = "r".into();
        let c: Vec<_> = (0..5)
            .map(|n| store.append_commit(&r, patch(n), None).unwrap())
            .collect();
        let ids = |q: LogQuery| -> Vec<CommitId> {
            store.log(&r, &q).unwrap().into_iter().map(|c| c.id).collect()
        };
        assert_eq!(ids(LogQuery::new().limit(2)), vec![c[4].id, c[3].id]);
        assert_eq!(ids(LogQuery::new().skip(3)), vec![c[1].id, c[0].id]);
        assert_eq!(
            ids(LogQuery::new().since(c[1].date).until(c[2].date)),
            vec![c[2].id, c[1].id]
        );
    }
}
