//! In-memory [`RepositoryBackend`] for unit tests
//!
//! Commits are named with short human-readable labels ("a", "n3") that
//! [`oid`] expands into well-formed object IDs, so test DAGs read like the
//! diagrams in the doc comments.

use crate::artifacts::diff::tree_diff::ChangeKind;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::provenance::{PathChange, ProvenanceError, RepositoryBackend};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Expand a short label into a valid 40-character object ID by hex-encoding
/// its bytes and right-padding with zeros.
pub(crate) fn oid(name: &str) -> ObjectId {
    let mut hex: String = name.bytes().map(|byte| format!("{byte:02x}")).collect();
    while hex.len() < 40 {
        hex.push('0');
    }

    ObjectId::try_parse(hex).unwrap()
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryBackend {
    commits: HashMap<ObjectId, SlimCommit>,
    /// Paths changed between a parent snapshot (`None` = empty tree) and a
    /// commit, mirroring what a real tree diff would report
    diffs: HashMap<(Option<ObjectId>, ObjectId), Vec<PathBuf>>,
    conflicts: Vec<PathBuf>,
    merge_heads: Vec<ObjectId>,
    orig_head: Option<ObjectId>,
}

impl InMemoryBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_commit(&mut self, name: &str, parents: &[&str]) {
        let commit_oid = oid(name);
        let commit = SlimCommit {
            oid: commit_oid.clone(),
            parents: parents.iter().map(|parent| oid(parent)).collect(),
            summary: format!("commit {name}"),
        };
        self.commits.insert(commit_oid, commit);
    }

    /// Mark `name` as changing `path` relative to every parent (or relative
    /// to the empty tree for a root commit).
    pub(crate) fn touch(&mut self, name: &str, path: &str) {
        let commit_oid = oid(name);
        let parents: Vec<Option<ObjectId>> = match self.commits.get(&commit_oid) {
            Some(commit) if !commit.parents.is_empty() => {
                commit.parents.iter().cloned().map(Some).collect()
            }
            _ => vec![None],
        };

        for parent in parents {
            self.diffs
                .entry((parent, commit_oid.clone()))
                .or_default()
                .push(PathBuf::from(path));
        }
    }

    /// Mark `name` as changing `path` relative to one specific parent only.
    pub(crate) fn touch_vs(&mut self, name: &str, parent: Option<&str>, path: &str) {
        self.diffs
            .entry((parent.map(oid), oid(name)))
            .or_default()
            .push(PathBuf::from(path));
    }

    pub(crate) fn add_conflict(&mut self, path: &str) {
        self.conflicts.push(PathBuf::from(path));
    }

    pub(crate) fn set_merge_state(&mut self, orig_head: &str, merge_heads: &[&str]) {
        self.orig_head = Some(oid(orig_head));
        self.merge_heads = merge_heads.iter().map(|head| oid(head)).collect();
    }

    /// Raw parent links, for reachability checks that bypass the session.
    pub(crate) fn parents(&self, commit_oid: &ObjectId) -> Vec<ObjectId> {
        self.commits
            .get(commit_oid)
            .map(|commit| commit.parents.clone())
            .unwrap_or_default()
    }
}

impl RepositoryBackend for InMemoryBackend {
    fn resolve_commit(&self, commit_oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        self.commits.get(commit_oid).cloned().ok_or_else(|| {
            ProvenanceError::ObjectNotFound {
                oid: commit_oid.to_string(),
            }
            .into()
        })
    }

    fn diff_paths(
        &self,
        old: Option<&ObjectId>,
        new: &ObjectId,
        path: &Path,
    ) -> anyhow::Result<Vec<PathChange>> {
        let key = (old.cloned(), new.clone());
        let changes = self
            .diffs
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|changed| changed.as_path() == path)
            .map(|changed| match old {
                Some(_) => PathChange::new(
                    Some(changed.clone()),
                    Some(changed.clone()),
                    ChangeKind::Modified,
                ),
                None => PathChange::new(None, Some(changed.clone()), ChangeKind::Added),
            })
            .collect();

        Ok(changes)
    }

    fn conflicting_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        Ok(self.conflicts.clone())
    }

    fn merge_heads(&self) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self.merge_heads.clone())
    }

    fn orig_head(&self) -> anyhow::Result<ObjectId> {
        self.orig_head
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No ORIG_HEAD recorded"))
    }
}
