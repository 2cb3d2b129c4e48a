//! Conflict provenance
//!
//! The engine answering "which commits made this file conflict?":
//!
//! - `graph`: three-color ancestry classification (LEFT / RIGHT / BASE) over
//!   the commit DAG, driven to saturation by a frontier walk
//! - `attribution`: per-path traversal of each side's exclusive history with
//!   a path-change test per commit
//!
//! Everything here talks to the repository through [`RepositoryBackend`], so
//! the core is oblivious to how commits are stored.

pub mod attribution;
pub mod graph;
#[cfg(test)]
pub(crate) mod test_backend;

use crate::artifacts::diff::tree_diff::ChangeKind;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;
use std::path::{Path, PathBuf};

/// Failures with a meaning of their own, distinguishable by callers.
///
/// Everything else surfaces as a contextual [`anyhow::Error`]. None of these
/// are retried: local repository state is assumed consistent, so a failed
/// invocation is simply rerun by the user.
#[derive(Debug, thiserror::Error)]
pub enum ProvenanceError {
    /// The merge-head precondition does not hold; checked before any
    /// classification work happens.
    #[error("expected exactly one merge head, found {found} (is a two-parent merge in progress?)")]
    MergeHeadCount { found: usize },

    /// A commit or tree could not be resolved in the object database.
    #[error("object {oid} not found in object database")]
    ObjectNotFound { oid: String },

    /// The ancestry walk touched more commits than the caller allowed.
    #[error("ancestry walk exceeded the budget of {limit} commits")]
    BudgetExceeded { limit: usize },
}

/// One entry of a path-scoped diff between two tree snapshots.
#[derive(Debug, Clone, PartialEq, new)]
pub struct PathChange {
    pub old_path: Option<PathBuf>,
    pub new_path: Option<PathBuf>,
    pub kind: ChangeKind,
}

impl PathChange {
    /// Does this change touch the given path, on either side of the diff?
    pub fn touches(&self, path: &Path) -> bool {
        self.old_path.as_deref() == Some(path) || self.new_path.as_deref() == Some(path)
    }
}

/// The repository operations the provenance core consumes.
///
/// All calls are blocking and may perform disk I/O; failures propagate
/// unmodified to the invocation boundary.
pub trait RepositoryBackend {
    /// Resolve a commit to its slim view; fails with
    /// [`ProvenanceError::ObjectNotFound`] when the id is unresolvable.
    fn resolve_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit>;

    /// Changes between two commits' trees, scoped to `path`. `None` for
    /// `old` means the empty tree (how root commits are diffed).
    fn diff_paths(
        &self,
        old: Option<&ObjectId>,
        new: &ObjectId,
        path: &Path,
    ) -> anyhow::Result<Vec<PathChange>>;

    /// Ordered paths currently in conflict; may be empty.
    fn conflicting_paths(&self) -> anyhow::Result<Vec<PathBuf>>;

    /// The merged-in head commits ("theirs"); the core requires exactly one.
    fn merge_heads(&self) -> anyhow::Result<Vec<ObjectId>>;

    /// The tip of the branch the merge was started from ("ours").
    fn orig_head(&self) -> anyhow::Result<ObjectId>;
}
