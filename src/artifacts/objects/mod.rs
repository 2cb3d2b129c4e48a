//! Git object types and read-side parsing
//!
//! mergetrace never writes objects; this module only knows how to read the
//! on-disk object format `<type> <size>\0<content>` back into:
//!
//! - **Commit**: snapshot metadata (tree, parents, author, message)
//! - **Tree**: directory listing (names, modes, and object IDs)
//!
//! Blobs are recognized but never inflated — conflict provenance only needs
//! commit ancestry and tree shapes.

pub mod commit;
pub mod object_id;
pub mod object_type;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;
