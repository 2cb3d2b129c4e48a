//! Git index (staging area), read side
//!
//! mergetrace only needs one fact from the index: which paths carry
//! conflict-stage entries. During a conflicted merge Git stores up to three
//! entries per unresolved path (stage 1 = base, 2 = ours, 3 = theirs); the
//! stage lives in bits 12–13 of the entry flags word.
//!
//! ## File format (version 2/3)
//!
//! - Header: `DIRC` signature, version, entry count (network byte order)
//! - Entries: 62 fixed bytes, NUL-terminated path, NUL padding to an
//!   8-byte boundary
//! - Trailer: SHA-1 over everything before it

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use byteorder::ByteOrder;
use sha1::{Digest, Sha1};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Index file magic
const SIGNATURE: &[u8; 4] = b"DIRC";
/// Header length in bytes
const HEADER_SIZE: usize = 12;
/// Fixed-width portion of an entry, up to and including the flags word
const ENTRY_FIXED_SIZE: usize = 62;
/// Entries are NUL-padded to this alignment, measured from entry start
const ENTRY_BLOCK: usize = 8;
/// SHA-1 trailer length
const CHECKSUM_SIZE: usize = 20;

/// Mask of the stage bits within the flags word
const STAGE_MASK: u16 = 0x3000;
/// Shift of the stage bits within the flags word
const STAGE_SHIFT: u16 = 12;
/// Extended flag bit (version 3 entries carry two extra bytes)
const EXTENDED_FLAG: u16 = 0x4000;
/// Path length saturates at this value in the flags word
const NAME_LENGTH_MASK: u16 = 0x0fff;

/// Read-only view of the staging area
#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index { path }
    }

    /// Ordered set of paths with at least one conflict-stage entry.
    ///
    /// A missing index file means an empty staging area, hence no conflicts.
    pub fn conflicting_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Unable to read index {}", self.path.display()));
            }
        };

        let (version, entry_count) = Self::parse_header(&bytes)?;
        Self::verify_checksum(&bytes)?;

        let mut conflicting = BTreeSet::new();
        let mut offset = HEADER_SIZE;

        for ordinal in 0..entry_count {
            let entry_bytes = bytes
                .get(offset..)
                .ok_or_else(|| anyhow::anyhow!("Entry {ordinal} extends past end of index"))?;
            let (name, stage, entry_len) = Self::parse_entry(entry_bytes, version)
                .with_context(|| format!("Malformed index entry {ordinal}"))?;

            if stage != 0 {
                conflicting.insert(PathBuf::from(name));
            }
            offset += entry_len;
        }

        Ok(conflicting.into_iter().collect())
    }

    fn parse_header(bytes: &[u8]) -> anyhow::Result<(u32, u32)> {
        if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
            return Err(anyhow::anyhow!("Index file is truncated"));
        }
        if &bytes[0..4] != SIGNATURE {
            return Err(anyhow::anyhow!("Invalid index signature"));
        }

        let version = byteorder::NetworkEndian::read_u32(&bytes[4..8]);
        if version != 2 && version != 3 {
            return Err(anyhow::anyhow!("Unsupported index version {version}"));
        }

        let entry_count = byteorder::NetworkEndian::read_u32(&bytes[8..12]);
        Ok((version, entry_count))
    }

    fn verify_checksum(bytes: &[u8]) -> anyhow::Result<()> {
        let (content, trailer) = bytes.split_at(bytes.len() - CHECKSUM_SIZE);

        let mut hasher = Sha1::new();
        hasher.update(content);
        let digest = hasher.finalize();

        if digest.as_slice() != trailer {
            return Err(anyhow::anyhow!("Index checksum mismatch"));
        }

        Ok(())
    }

    /// Parse one entry, returning its path, stage, and total padded length.
    fn parse_entry(bytes: &[u8], version: u32) -> anyhow::Result<(String, u16, usize)> {
        if bytes.len() < ENTRY_FIXED_SIZE + CHECKSUM_SIZE {
            return Err(anyhow::anyhow!("Entry extends past end of index"));
        }

        // Bytes 0..40 hold stat metadata; only the OID and flags matter here.
        let mut oid_reader = std::io::Cursor::new(&bytes[40..60]);
        ObjectId::read_h40_from(&mut oid_reader).context("Invalid entry object id")?;

        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);
        let stage = (flags & STAGE_MASK) >> STAGE_SHIFT;

        let mut name_offset = ENTRY_FIXED_SIZE;
        if version >= 3 && flags & EXTENDED_FLAG != 0 {
            name_offset += 2;
        }

        let name_len = (flags & NAME_LENGTH_MASK) as usize;
        let name_bytes = if name_len < NAME_LENGTH_MASK as usize {
            bytes
                .get(name_offset..name_offset + name_len)
                .ok_or_else(|| anyhow::anyhow!("Entry path extends past end of index"))?
        } else {
            // Saturated length field: scan for the NUL terminator instead
            let rest = &bytes[name_offset..];
            let end = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| anyhow::anyhow!("Missing NUL terminator in entry path"))?;
            &rest[..end]
        };

        let name = std::str::from_utf8(name_bytes)
            .context("Invalid UTF-8 in entry path")?
            .to_string();

        let mut entry_len = name_offset + name_bytes.len() + 1; // at least one NUL
        entry_len = entry_len.next_multiple_of(ENTRY_BLOCK);

        Ok((name, stage, entry_len))
    }
}
