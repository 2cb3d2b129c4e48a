//! mergetrace: explain where merge conflicts come from
//!
//! When a merge stops with conflicts, mergetrace reads the repository's
//! merge state (`MERGE_HEAD`, `ORIG_HEAD`, conflict-stage index entries),
//! classifies the commit graph into each side's exclusive history versus
//! shared history, and reports, per conflicting file, the commits on each
//! side that changed it.
//!
//! The crate is strictly read-only: it never writes objects, refs, or the
//! index.

pub mod areas;
pub mod artifacts;
pub mod commands;
