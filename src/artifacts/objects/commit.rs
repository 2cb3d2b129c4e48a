//! Git commit object (read side)
//!
//! On disk:
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! Zero parent lines mark a root commit, two or more a merge commit.

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::BufRead;

/// Author or committer identity line
///
/// Parsed to validate the commit object; conflict reports never show
/// authorship, so the parsed value is discarded after the check.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Format: "name <email> timestamp timezone"; split from the right so
        // names containing spaces survive.
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(anyhow::anyhow!("Invalid author format"));
        }

        let timezone = parts[0];
        let seconds = parts[1];
        let name_email_part = parts[2];

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '<'"))?;
        let email_end = name_email_part
            .find('>')
            .ok_or_else(|| anyhow::anyhow!("Invalid author format: missing '>'"))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        // "%s %z" accepts Git's "<epoch-seconds> <+hhmm>" encoding
        let timestamp = chrono::DateTime::parse_from_str(&format!("{seconds} {timezone}"), "%s %z")
            .map_err(|_| anyhow::anyhow!("Invalid author timestamp {seconds:?} {timezone:?}"))?;

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Slim representation of a commit
///
/// The view the provenance core consumes: identity, parent links, and a
/// one-line summary for report output. Resolved at most once per commit per
/// classification session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    /// Ordered parent object IDs (empty for a root commit)
    pub parents: Vec<ObjectId>,
    /// First line of the commit message
    pub summary: String,
}

impl SlimCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Git commit object as parsed from the database
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    message: String,
}

impl Commit {
    /// First line of the commit message
    pub fn summary(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// Collapse to the slim view under the given identity
    pub fn to_slim(&self, oid: &ObjectId) -> SlimCommit {
        SlimCommit {
            oid: oid.clone(),
            parents: self.parents.clone(),
            summary: self.summary(),
        }
    }

    pub fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;
        let mut lines = content.lines();

        let tree_line = lines
            .next()
            .context("Invalid commit object: missing tree line")?;
        let tree_oid = tree_line
            .strip_prefix("tree ")
            .context("Invalid commit object: invalid tree line")?
            .to_string();
        let tree_oid = ObjectId::try_parse(tree_oid)?;

        // Parse all parent lines (there can be 0, 1, or multiple parents)
        let mut parents = Vec::new();
        let mut next_line = lines
            .next()
            .context("Invalid commit object: missing author line")?;

        while let Some(parent_oid) = next_line.strip_prefix("parent ") {
            parents.push(ObjectId::try_parse(parent_oid.to_string())?);

            next_line = lines
                .next()
                .context("Invalid commit object: missing author line")?;
        }

        let author = next_line
            .strip_prefix("author ")
            .context("Invalid commit object: invalid author line")?;
        Author::try_from(author)?;

        let committer_line = lines
            .next()
            .context("Invalid commit object: missing committer line")?;
        let committer = committer_line
            .strip_prefix("committer ")
            .context("Invalid commit object: invalid committer line")?;
        Author::try_from(committer)?;

        // Skip any remaining headers (gpgsig, encoding, ...) up to the blank
        // line separating headers from the message.
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }
        }

        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Commit {
            parents,
            tree_oid,
            message,
        })
    }
}
