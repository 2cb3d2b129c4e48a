//! Per-path conflict attribution
//!
//! Given a saturated [`GraphSession`], walks each head's exclusive history
//! (stopping at shared BASE commits) and keeps the commits whose tree diff
//! against any parent touches the conflicting path. The result is the list
//! of commits that plausibly contributed to the conflict, per side.
//!
//! A merge commit counts as touching the path when its diff against ANY
//! parent does: a merge that resolved the file differently from one of its
//! parents is itself part of the story, even if it matches the other parent
//! exactly.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::provenance::graph::{GraphSession, SideTag};
use crate::artifacts::provenance::RepositoryBackend;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Which merge head a commit was attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Exclusive history of ORIG_HEAD
    Ours,
    /// Exclusive history of MERGE_HEAD
    Theirs,
}

impl Side {
    fn tag(self) -> SideTag {
        match self {
            Side::Ours => SideTag::Left,
            Side::Theirs => SideTag::Right,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Ours => write!(f, "ours"),
            Side::Theirs => write!(f, "theirs"),
        }
    }
}

/// One commit found to affect a conflicting path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedCommit {
    pub side: Side,
    pub oid: ObjectId,
    pub is_merge: bool,
    pub summary: String,
}

/// Attribution result for a single conflicting path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathReport {
    pub path: PathBuf,
    pub ours: Vec<AttributedCommit>,
    pub theirs: Vec<AttributedCommit>,
}

impl PathReport {
    pub fn is_empty(&self) -> bool {
        self.ours.is_empty() && self.theirs.is_empty()
    }
}

/// Walks a saturated classification session per conflicting path
pub struct ConflictAttributor<'b, 's, B: RepositoryBackend> {
    backend: &'b B,
    session: &'s GraphSession<'b, B>,
}

impl<'b, 's, B: RepositoryBackend> ConflictAttributor<'b, 's, B> {
    pub fn new(backend: &'b B, session: &'s GraphSession<'b, B>) -> Self {
        ConflictAttributor { backend, session }
    }

    /// Attribute one conflicting path to both sides' exclusive histories.
    ///
    /// The session must already be saturated from `left` and `right`; every
    /// commit the walk can reach before hitting BASE is materialized then.
    pub fn attribute_path(
        &self,
        left: &ObjectId,
        right: &ObjectId,
        path: &Path,
    ) -> anyhow::Result<PathReport> {
        Ok(PathReport {
            path: path.to_path_buf(),
            ours: self.walk_side(left, Side::Ours, path)?,
            theirs: self.walk_side(right, Side::Theirs, path)?,
        })
    }

    /// Depth-first pre-order walk of one side's exclusive history.
    ///
    /// Commits tagged BASE are a hard cutoff: they are neither reported nor
    /// expanded, including the head itself. First-parent history comes first
    /// within the ordering, and a commit reachable along several paths is
    /// reported once.
    fn walk_side(
        &self,
        head: &ObjectId,
        side: Side,
        path: &Path,
    ) -> anyhow::Result<Vec<AttributedCommit>> {
        let mut affecting = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![head.clone()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }

            let node = self.session.node(&current).ok_or_else(|| {
                anyhow::anyhow!("Commit {current} was not classified before attribution")
            })?;

            debug_assert!(node.tag() == SideTag::Base || node.tag() == side.tag());
            if node.tag() == SideTag::Base {
                continue;
            }

            let commit = node.commit();
            if self.affects(&current, path)? {
                affecting.push(AttributedCommit {
                    side,
                    oid: current.clone(),
                    is_merge: commit.is_merge(),
                    summary: commit.summary.clone(),
                });
            }

            // reversed so the first parent is popped (and reported) first
            for parent in commit.parents.iter().rev() {
                stack.push(parent.clone());
            }
        }

        Ok(affecting)
    }

    /// Does this commit change `path` relative to any of its parents?
    ///
    /// Root commits are diffed against the empty tree, so an initial commit
    /// introducing the file counts.
    fn affects(&self, commit_oid: &ObjectId, path: &Path) -> anyhow::Result<bool> {
        let node = self
            .session
            .node(commit_oid)
            .ok_or_else(|| anyhow::anyhow!("Commit {commit_oid} was not classified"))?;
        let parents = &node.commit().parents;

        if parents.is_empty() {
            let changes = self.backend.diff_paths(None, commit_oid, path)?;
            return Ok(changes.iter().any(|change| change.touches(path)));
        }

        for parent in parents {
            let changes = self.backend.diff_paths(Some(parent), commit_oid, path)?;
            if changes.iter().any(|change| change.touches(path)) {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
