//! Commit history for tracked JSON objects.
//!
//! Every change to a tracked object is stored as a [`Commit`] holding the
//! patch from the previous state, and every `snapshot_window`-th commit also
//! holds the full tree. Any past state is rebuilt from the nearest snapshot
//! plus a bounded replay.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use docgit::git::{CommitRef, Git, GitConfig, MemoryStore, StoreRegistry, VersionContext};
//! use serde_json::json;
//!
//! let registry = StoreRegistry::new();
//! registry.register("posts.git", Arc::new(MemoryStore::new()));
//! let git = Git::new(&registry, Some("posts"), GitConfig::default()).unwrap();
//!
//! let mut post = git.new_document("post-1", json!({"title": "Draft"}));
//! post.commit().unwrap();
//! post.set_current(json!({"title": "Final"}));
//! post.commit().unwrap();
//!
//! let first = post.checkout(&CommitRef::from("HEAD^")).unwrap();
//! assert_eq!(first, Some(json!({"title": "Draft"})));
//! ```

pub mod commit;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod rebuild;
pub mod refs;
pub mod registry;
pub mod store;
pub mod writer;

pub use commit::{Commit, CommitId, CommitRange, LogEntry, LogQuery, RefId};
pub use config::{GitConfig, GitOverrides};
pub use context::{DocumentGit, Git, RefIdGit, VersionContext};
pub use error::{ConfigError, GitError, RefError};
pub use lifecycle::{CommitEvent, LifecycleHooks};
pub use memory::MemoryStore;
pub use rebuild::{rebuild, rebuild_at};
pub use refs::{parse_ref, resolve_ref, CommitRef, ResolvedRef, HEAD};
pub use registry::StoreRegistry;
pub use store::{CommitStore, CommitStream, StoreError};
pub use writer::{snapshot_due, write_commit};
