//! Tree diffing
//!
//! - `path_filter`: trie of requested paths, pruning the diff walk to the
//!   subtrees that can still match
//! - `tree_diff`: recursive comparison of two tree snapshots into a change set

pub mod path_filter;
pub mod tree_diff;
