//! Git tree object (read side)
//!
//! Trees represent directory snapshots. Each entry on disk is
//! `<octal-mode> <name>\0<20-byte-sha1>`; subdirectories carry the tree mode
//! `40000` and point at nested tree objects.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::BufRead;

/// Mode bits marking a tree (directory) entry
const TREE_MODE: u32 = 0o040000;
/// Mask selecting the object-kind bits of an entry mode
const MODE_KIND_MASK: u32 = 0o170000;

/// A single named entry inside a tree object
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub oid: ObjectId,
    /// Raw mode bits as stored (e.g. 0o100644 for a regular file)
    pub mode: u32,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.mode & MODE_KIND_MASK == TREE_MODE
    }
}

/// Git tree object as a name-ordered entry map
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = (String, TreeEntry)> {
        self.entries.into_iter()
    }

    pub fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();
        let mut reader = reader;

        // Reuse scratch buffers to reduce allocs
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.last() != Some(&b' ') {
                return Err(anyhow::anyhow!("unexpected EOF in tree entry mode"));
            }
            mode_bytes.pop();

            let mode_str = std::str::from_utf8(&mode_bytes)?;
            let mode = u32::from_str_radix(mode_str, 8)
                .with_context(|| format!("invalid tree entry mode {mode_str:?}"))?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.last() != Some(&b'\0') {
                return Err(anyhow::anyhow!("unexpected EOF in tree entry name"));
            }
            name_bytes.pop();
            let name = std::str::from_utf8(&name_bytes)?.to_owned();

            let oid = ObjectId::read_h40_from(&mut reader)
                .context("unexpected EOF in tree entry object id")?;

            entries.insert(name, TreeEntry::new(oid, mode));
        }

        Ok(Tree { entries })
    }
}
