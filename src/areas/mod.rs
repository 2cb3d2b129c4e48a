//! Read-only repository components
//!
//! The Git plumbing mergetrace consumes, all strictly read-only:
//!
//! - `database`: loose-object store reader (blobs are never inflated)
//! - `index`: conflict-stage extraction from the staging area
//! - `refs`: merge-state references (`MERGE_HEAD`, `ORIG_HEAD`)
//! - `repository`: discovery and coordination

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
