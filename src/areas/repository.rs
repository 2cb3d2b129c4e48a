use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::artifacts::diff::path_filter::PathFilter;
use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::provenance::{PathChange, RepositoryBackend};
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};

/// A repository opened for analysis
///
/// Bundles the read-only views over a `.git` directory (object database,
/// merge refs, staging area) behind one handle, and carries the output
/// writer commands print through.
pub struct Repository {
    git_dir: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    database: Database,
    refs: Refs,
    index: Index,
}

impl Repository {
    /// Open the repository whose `.git` directory is at `git_dir`.
    pub fn open(git_dir: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let git_dir = git_dir.canonicalize().map_err(|_| {
            anyhow::anyhow!("Not a git repository: {} does not exist", git_dir.display())
        })?;

        let objects = git_dir.join("objects");
        if !objects.is_dir() {
            return Err(anyhow::anyhow!(
                "Not a git repository: {} has no objects directory",
                git_dir.display()
            ));
        }

        let database = Database::new(objects.into_boxed_path());
        let refs = Refs::new(git_dir.clone().into_boxed_path());
        let index = Index::new(git_dir.join("index").into_boxed_path());

        Ok(Repository {
            git_dir: git_dir.into_boxed_path(),
            writer: RefCell::new(writer),
            database,
            refs,
            index,
        })
    }

    /// Locate the `.git` directory from `$GIT_DIR` or by walking up from the
    /// current working directory, then open it.
    pub fn discover(writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if let Ok(git_dir) = std::env::var("GIT_DIR") {
            return Self::open(Path::new(&git_dir), writer);
        }

        let cwd = std::env::current_dir()?;
        for ancestor in cwd.ancestors() {
            let candidate = ancestor.join(".git");
            if candidate.is_dir() {
                return Self::open(&candidate, writer);
            }
        }

        Err(anyhow::anyhow!(
            "Not a git repository (or any of the parent directories): {}",
            cwd.display()
        ))
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn index(&self) -> &Index {
        &self.index
    }
}

impl RepositoryBackend for Repository {
    fn resolve_commit(&self, oid: &ObjectId) -> anyhow::Result<SlimCommit> {
        Ok(self.database.parse_commit(oid)?.to_slim(oid))
    }

    fn diff_paths(
        &self,
        old: Option<&ObjectId>,
        new: &ObjectId,
        path: &Path,
    ) -> anyhow::Result<Vec<PathChange>> {
        let filter = PathFilter::new([path.to_path_buf()]);
        let change_set = self.database.tree_diff(old, Some(new), &filter)?;

        Ok(change_set
            .into_iter()
            .map(|(changed_path, change)| {
                let kind = change.kind();
                PathChange::new(
                    change.old.map(|_| changed_path.clone()),
                    change.new.map(|_| changed_path),
                    kind,
                )
            })
            .collect())
    }

    fn conflicting_paths(&self) -> anyhow::Result<Vec<PathBuf>> {
        self.index.conflicting_paths()
    }

    fn merge_heads(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.refs.read_merge_heads()
    }

    fn orig_head(&self) -> anyhow::Result<ObjectId> {
        self.refs.read_orig_head()
    }
}
