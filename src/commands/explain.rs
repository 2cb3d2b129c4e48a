//! The `explain` command: report conflict provenance per conflicting path
//!
//! For every path with conflict-stage index entries, prints the commits in
//! each side's exclusive history that changed that path:
//!
//! ```text
//! File config.toml:
//! ours: a1b2c3d Raise the connection limit
//! ours: [merge] 9f8e7d6 Merge branch 'tuning'
//! theirs: 0a1b2c3 Rewrite the config section
//! ------------------
//! ```

use crate::areas::repository::Repository;
use crate::artifacts::provenance::attribution::{
    AttributedCommit, ConflictAttributor, PathReport, Side,
};
use crate::artifacts::provenance::graph::GraphSession;
use crate::artifacts::provenance::{ProvenanceError, RepositoryBackend};
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;

/// Printed between per-file report blocks
const SEPARATOR: &str = "------------------";

#[derive(Debug, Clone, Default)]
pub struct ExplainOptions {
    /// Restrict the report to these paths; empty means every conflicting path
    pub paths: Vec<PathBuf>,
    /// Cap on the number of commits the ancestry walk may materialize
    pub budget: Option<usize>,
}

impl Repository {
    pub fn explain(&self, opts: &ExplainOptions) -> anyhow::Result<()> {
        let mut writer = self.writer();
        explain_conflicts(self, opts, &mut **writer)
    }
}

/// Run the full pipeline: merge-state checks, ancestry classification, and
/// per-path attribution, printed to `writer`.
pub fn explain_conflicts<B: RepositoryBackend>(
    backend: &B,
    opts: &ExplainOptions,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    // Preconditions come first so a bad merge state fails before any
    // classification work happens.
    let merge_heads = backend.merge_heads()?;
    let [theirs] = merge_heads.as_slice() else {
        return Err(ProvenanceError::MergeHeadCount {
            found: merge_heads.len(),
        }
        .into());
    };
    let ours = backend.orig_head()?;

    let mut conflicting = backend.conflicting_paths()?;
    if !opts.paths.is_empty() {
        conflicting.retain(|path| opts.paths.iter().any(|wanted| wanted == path));
    }
    if conflicting.is_empty() {
        return Ok(());
    }

    // One classification pass serves every path: ancestry does not depend
    // on which file conflicted.
    let mut session = GraphSession::new(backend);
    session.saturate(&ours, theirs, opts.budget)?;

    let attributor = ConflictAttributor::new(backend, &session);
    for path in &conflicting {
        let report = attributor.attribute_path(&ours, theirs, path)?;
        render_report(&report, writer)?;
    }

    Ok(())
}

fn render_report(report: &PathReport, writer: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(writer, "File {}:", report.path.display())?;

    for record in report.ours.iter().chain(&report.theirs) {
        render_record(record, writer)?;
    }

    writeln!(writer, "{SEPARATOR}")?;
    Ok(())
}

fn render_record(record: &AttributedCommit, writer: &mut dyn Write) -> anyhow::Result<()> {
    let label = match record.side {
        Side::Ours => record.side.to_string().green(),
        Side::Theirs => record.side.to_string().red(),
    };
    let marker = if record.is_merge {
        format!("{} ", "[merge]".yellow())
    } else {
        String::new()
    };

    writeln!(
        writer,
        "{}: {}{} {}",
        label,
        marker,
        record.oid.to_short_oid(),
        record.summary
    )?;

    Ok(())
}
