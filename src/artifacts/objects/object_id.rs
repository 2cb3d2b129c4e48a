//! Git object identifier (SHA-1 hash)
//!
//! A 40-character hexadecimal string uniquely identifying an object.
//! Equality and hashing are by identifier value only, which is what lets the
//! classification session deduplicate diamond-shaped ancestry by ID.

use crate::artifacts::objects::OBJECT_ID_LENGTH;
use std::io;
use std::path::PathBuf;

/// Number of characters in an abbreviated object ID
const SHORT_OID_LENGTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(anyhow::anyhow!("Invalid object ID length: {}", id.len()));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(anyhow::anyhow!("Invalid object ID characters: {}", id));
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Read an object ID from binary format (20 bytes)
    ///
    /// Used when deserializing tree entries and index entries.
    pub fn read_h40_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        let mut hex40 = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex40.push_str(&format!("{:02x}", byte));
        }

        Self::try_parse(hex40)
    }

    /// Convert to the loose-object path `XX/YYYY…` under `.git/objects`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// Abbreviated form used in report lines
    pub fn to_short_oid(&self) -> String {
        self.0.split_at(SHORT_OID_LENGTH).0.to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
