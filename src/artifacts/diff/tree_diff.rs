use crate::areas::database::Database;
use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::TreeEntry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

/// A single file-level change between two tree snapshots
///
/// At least one of `old` and `new` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub old: Option<TreeEntry>,
    pub new: Option<TreeEntry>,
}

impl Change {
    fn from_entries(old: Option<TreeEntry>, new: Option<TreeEntry>) -> Option<Self> {
        match (old, new) {
            (None, None) => None,
            (Some(old), Some(new)) if old == new => None,
            (old, new) => Some(Change { old, new }),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match (&self.old, &self.new) {
            (None, Some(_)) => ChangeKind::Added,
            (Some(_), None) => ChangeKind::Deleted,
            _ => ChangeKind::Modified,
        }
    }
}

pub type ChangeSet = BTreeMap<PathBuf, Change>;

/// Recursive diff between two tree (or commit) objects
///
/// Walks both trees in lockstep, descending only into subtrees the path
/// filter admits, and records blob-level additions, deletions, and
/// modifications keyed by repository-relative path.
#[derive(Debug)]
pub struct TreeDiff<'r> {
    database: &'r Database,
    change_set: ChangeSet,
}

type TreeEntryMap = BTreeMap<String, TreeEntry>;

impl<'r> TreeDiff<'r> {
    pub fn new(database: &'r Database) -> Self {
        TreeDiff {
            database,
            change_set: BTreeMap::new(),
        }
    }

    pub fn changes(&self) -> &ChangeSet {
        &self.change_set
    }

    pub fn into_changes(self) -> ChangeSet {
        self.change_set
    }

    /// Compare two commits or trees; `None` stands for the empty tree, which
    /// is how a root commit is diffed.
    pub fn compare_oids(
        &mut self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
        filter: &PathFilter,
    ) -> anyhow::Result<()> {
        self.compare_at(old, new, filter, Path::new(""))
    }

    fn compare_at(
        &mut self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
        filter: &PathFilter,
        prefix: &Path,
    ) -> anyhow::Result<()> {
        if old == new {
            return Ok(());
        }

        let old_entries = self.inflate_tree_entries(old)?;
        let new_entries = self.inflate_tree_entries(new)?;

        self.detect_deletions(&old_entries, &new_entries, filter, prefix)?;
        self.detect_additions(&old_entries, &new_entries, filter, prefix)?;

        Ok(())
    }

    fn inflate_tree_entries(&self, oid: Option<&ObjectId>) -> anyhow::Result<TreeEntryMap> {
        match oid {
            None => Ok(BTreeMap::new()),
            Some(oid) => Ok(self
                .database
                .parse_tree_or_commit_tree(oid)?
                .into_entries()
                .collect()),
        }
    }

    /// Entries present in `old`: deleted or modified in `new`
    fn detect_deletions(
        &mut self,
        old: &TreeEntryMap,
        new: &TreeEntryMap,
        filter: &PathFilter,
        prefix: &Path,
    ) -> anyhow::Result<()> {
        for (name, entry) in old {
            if !filter.admits(name) {
                continue;
            }

            let path = prefix.join(name);
            let other = new.get(name);

            if other == Some(entry) {
                continue;
            }

            let old_subtree = entry.is_tree().then_some(&entry.oid);
            let new_subtree = other.filter(|o| o.is_tree()).map(|o| &o.oid);
            if old_subtree.is_some() || new_subtree.is_some() {
                self.compare_at(old_subtree, new_subtree, &filter.descend(name), &path)?;
            }

            let old_blob = (!entry.is_tree()).then(|| entry.clone());
            let new_blob = other.filter(|o| !o.is_tree()).cloned();
            if let Some(change) = Change::from_entries(old_blob, new_blob) {
                self.change_set.insert(path, change);
            }
        }

        Ok(())
    }

    /// Entries only present in `new`: additions
    fn detect_additions(
        &mut self,
        old: &TreeEntryMap,
        new: &TreeEntryMap,
        filter: &PathFilter,
        prefix: &Path,
    ) -> anyhow::Result<()> {
        for (name, entry) in new {
            if !filter.admits(name) || old.contains_key(name) {
                continue;
            }

            let path = prefix.join(name);

            if entry.is_tree() {
                self.compare_at(None, Some(&entry.oid), &filter.descend(name), &path)?;
            } else {
                self.change_set.insert(
                    path,
                    Change {
                        old: None,
                        new: Some(entry.clone()),
                    },
                );
            }
        }

        Ok(())
    }
}
