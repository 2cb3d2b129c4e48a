//! Domain artifacts
//!
//! - `objects`: read-side parsing of Git objects (commits, trees)
//! - `diff`: path-filtered tree comparison
//! - `provenance`: ancestry classification and conflict attribution

pub mod diff;
pub mod objects;
pub mod provenance;
