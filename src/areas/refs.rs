//! Merge-state references
//!
//! During a merge Git records the participating tips as plain files in the
//! `.git` directory:
//!
//! - `MERGE_HEAD`: the commit(s) being merged in, one 40-char SHA-1 per line
//!   (several lines for an octopus merge, which mergetrace rejects upstream)
//! - `ORIG_HEAD`: the tip of the branch the merge was started from

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::path::Path;

/// Name of the merged-in heads file
pub const MERGE_HEAD_NAME: &str = "MERGE_HEAD";
/// Name of the pre-merge branch tip file
pub const ORIG_HEAD_NAME: &str = "ORIG_HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the `.git` directory
    path: Box<Path>,
}

impl Refs {
    /// All merged-in heads; empty when no merge is in progress.
    pub fn read_merge_heads(&self) -> anyhow::Result<Vec<ObjectId>> {
        let path = self.path.join(MERGE_HEAD_NAME);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read {}", path.display()))?;

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                ObjectId::try_parse(line.to_string())
                    .with_context(|| format!("Malformed {MERGE_HEAD_NAME} entry {line:?}"))
            })
            .collect()
    }

    /// The tip of the branch the merge was started from ("ours").
    pub fn read_orig_head(&self) -> anyhow::Result<ObjectId> {
        let path = self.path.join(ORIG_HEAD_NAME);

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Unable to read {} (is a merge in progress?)", path.display()))?;

        ObjectId::try_parse(content.trim().to_string())
            .with_context(|| format!("Malformed {ORIG_HEAD_NAME}"))
    }
}
