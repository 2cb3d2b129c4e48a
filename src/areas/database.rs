use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::diff::tree_diff::{ChangeSet, TreeDiff};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::provenance::ProvenanceError;
use anyhow::Context;
use bytes::Bytes;
use std::io::{BufRead, Cursor, Read};
use std::path::Path;

/// Read-only loose-object database
///
/// Resolves objects from `.git/objects/<xx>/<rest>`, decompressing with zlib
/// and dispatching on the `<type> <size>\0` header. Packfiles are not
/// supported; a packed-only commit surfaces as not found.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    /// Path-scoped diff between two commits or trees; `None` is the empty
    /// tree (used for root commits).
    pub fn tree_diff(
        &self,
        old: Option<&ObjectId>,
        new: Option<&ObjectId>,
        filter: &PathFilter,
    ) -> anyhow::Result<ChangeSet> {
        let mut tree_diff = TreeDiff::new(self);
        tree_diff.compare_oids(old, new, filter)?;
        Ok(tree_diff.into_changes())
    }

    /// Parse the object as a commit; fails if it exists but is another type.
    pub fn parse_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, reader) = self.open_object(oid)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(reader)
                .with_context(|| format!("Malformed commit object {oid}")),
            other => Err(anyhow::anyhow!("Object {oid} is a {other}, not a commit")),
        }
    }

    /// Parse the object as a tree, following a commit to its root tree.
    pub fn parse_tree_or_commit_tree(&self, oid: &ObjectId) -> anyhow::Result<Tree> {
        let (object_type, reader) = self.open_object(oid)?;

        match object_type {
            ObjectType::Tree => {
                Tree::deserialize(reader).with_context(|| format!("Malformed tree object {oid}"))
            }
            ObjectType::Commit => {
                let commit = Commit::deserialize(reader)
                    .with_context(|| format!("Malformed commit object {oid}"))?;
                self.parse_tree_or_commit_tree(commit.tree_oid())
            }
            ObjectType::Blob => Err(anyhow::anyhow!("Object {oid} is a blob, not a tree")),
        }
    }

    fn open_object(&self, oid: &ObjectId) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let content = self.load(oid)?;
        let mut reader = Cursor::new(content);

        let object_type = ObjectType::parse_header(&mut reader)
            .with_context(|| format!("Malformed object header for {oid}"))?;

        Ok((object_type, reader))
    }

    fn load(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(oid.to_path());

        let compressed = match std::fs::read(&object_path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProvenanceError::ObjectNotFound {
                    oid: oid.to_string(),
                }
                .into());
            }
            Err(err) => {
                return Err(err).context(format!(
                    "Unable to read object file {}",
                    object_path.display()
                ));
            }
        };

        Self::decompress(compressed.into())
            .with_context(|| format!("Unable to decompress object {oid}"))
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder.read_to_end(&mut decompressed_content)?;

        Ok(decompressed_content.into())
    }
}
