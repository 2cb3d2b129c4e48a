//! Ancestry classification over the commit DAG
//!
//! Every commit reachable from either merge head gets a side tag: LEFT for
//! "ours"-only history, RIGHT for "theirs"-only history, BASE for shared
//! history. A commit reached from both sides is promoted to BASE, and the
//! promotion propagates ancestor-ward through every parent list that has
//! already been materialized.
//!
//! ## Tag lattice
//!
//! `Left → Base` and `Right → Base` are the only legal transitions; `Base`
//! is terminal. There is no direct `Left ↔ Right` move — the meeting point
//! is always shared history.
//!
//! ## Saturation
//!
//! [`GraphSession::saturate`] floods both ancestries generation by
//! generation until every frontier member is BASE (or the frontier runs out
//! at root commits). This deliberately over-approximates: it visits the full
//! ancestry up to first convergence rather than computing a minimal merge
//! base, which is all attribution needs.
//!
//! ## Debug Logging
//!
//! Build with `--features debug_walk` to trace frontier expansion on stderr.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::provenance::{ProvenanceError, RepositoryBackend};
use std::collections::{HashMap, HashSet};

/// Macro for debug logging, enabled with the debug_walk feature flag
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_walk")]
        {
            eprintln!($($arg)*);
        }
    };
}

/// Side classification of a commit relative to the two merge heads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideTag {
    /// Exclusive ancestry of the "ours" head
    Left,
    /// Exclusive ancestry of the "theirs" head
    Right,
    /// Shared ancestry; terminal
    Base,
}

impl SideTag {
    /// Does a node holding `self` stay unchanged when reached as `incoming`?
    ///
    /// Only two transitions exist on the lattice: `Left → Base` and
    /// `Right → Base`; everything else is a no-op.
    fn absorbs(self, incoming: SideTag) -> bool {
        self == SideTag::Base || self == incoming
    }
}

/// A commit paired with its current side tag and memoized parent links
///
/// Nodes live only in the session table and refer to each other by
/// [`ObjectId`], so diamond-shaped ancestry shares one node per commit by
/// construction.
#[derive(Debug)]
pub struct GraphNode {
    commit: SlimCommit,
    tag: SideTag,
    /// Parent node ids, computed once under the tag held at that moment
    parents: Option<Vec<ObjectId>>,
}

impl GraphNode {
    pub fn commit(&self) -> &SlimCommit {
        &self.commit
    }

    pub fn tag(&self) -> SideTag {
        self.tag
    }
}

/// Classification state for one merge invocation
///
/// Owns the `ObjectId → GraphNode` table. Ancestry is path-independent, so
/// one session is built per merge and reused across every conflicting path,
/// then discarded. Not meant to outlive or be shared across invocations.
pub struct GraphSession<'b, B: RepositoryBackend> {
    backend: &'b B,
    nodes: HashMap<ObjectId, GraphNode>,
}

impl<'b, B: RepositoryBackend> GraphSession<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        GraphSession {
            backend,
            nodes: HashMap::new(),
        }
    }

    pub fn node(&self, oid: &ObjectId) -> Option<&GraphNode> {
        self.nodes.get(oid)
    }

    pub fn tag_of(&self, oid: &ObjectId) -> Option<SideTag> {
        self.nodes.get(oid).map(|node| node.tag)
    }

    /// Number of commits materialized so far
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Record that `oid` was reached under `tag`.
    ///
    /// First sighting resolves the commit through the backend and creates
    /// the node. A re-sighting under the same tag (or on a BASE node) is a
    /// no-op; a re-sighting under a different tag promotes the node to BASE.
    pub fn classify(&mut self, oid: &ObjectId, tag: SideTag) -> anyhow::Result<()> {
        match self.nodes.get(oid) {
            Some(node) if node.tag.absorbs(tag) => {}
            Some(_) => self.promote_to_base(oid),
            None => {
                let commit = self.backend.resolve_commit(oid)?;
                self.nodes.insert(
                    oid.clone(),
                    GraphNode {
                        commit,
                        tag,
                        parents: None,
                    },
                );
            }
        }

        Ok(())
    }

    /// Promote a node and its already-materialized ancestors to BASE.
    ///
    /// Propagation follows parent links only — descendants are not tracked.
    /// Parents that have not been materialized yet are left alone; they will
    /// be classified under BASE when their child's parent list is computed.
    fn promote_to_base(&mut self, oid: &ObjectId) {
        let mut pending = vec![oid.clone()];

        while let Some(oid) = pending.pop() {
            let Some(node) = self.nodes.get_mut(&oid) else {
                continue;
            };
            if node.tag == SideTag::Base {
                continue;
            }

            debug_log!("promoting {} to BASE", oid);
            node.tag = SideTag::Base;

            if let Some(parents) = &node.parents {
                pending.extend(parents.iter().cloned());
            }
        }
    }

    /// The node's parent list, materialized on first request.
    ///
    /// Each raw parent is classified under the tag the node holds right now;
    /// the resulting list is memoized and never recomputed, which is what
    /// makes later BASE promotion reach exactly the parents resolved so far.
    pub fn parents_of(&mut self, oid: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        let (raw_parents, tag) = {
            let node = self
                .nodes
                .get(oid)
                .ok_or_else(|| anyhow::anyhow!("Commit {oid} was never classified"))?;

            if let Some(parents) = &node.parents {
                return Ok(parents.clone());
            }

            (node.commit.parents.clone(), node.tag)
        };

        for parent in &raw_parents {
            self.classify(parent, tag)?;
        }

        if let Some(node) = self.nodes.get_mut(oid) {
            node.parents = Some(raw_parents.clone());
        }

        Ok(raw_parents)
    }

    /// Drive classification to saturation from the two heads.
    ///
    /// Maintains a frontier initialized to the two head nodes and repeatedly
    /// replaces it with the deduplicated union of every member's parents,
    /// until the frontier is empty or every member is BASE. Terminates
    /// because the DAG is finite and acyclic; worst case visits every commit
    /// reachable from either head.
    ///
    /// `budget` caps the number of materialized commits; exceeding it fails
    /// with [`ProvenanceError::BudgetExceeded`] instead of walking a
    /// pathological history to exhaustion.
    pub fn saturate(
        &mut self,
        left: &ObjectId,
        right: &ObjectId,
        budget: Option<usize>,
    ) -> anyhow::Result<()> {
        self.classify(left, SideTag::Left)?;
        self.classify(right, SideTag::Right)?;

        let mut frontier = if left == right {
            vec![left.clone()]
        } else {
            vec![left.clone(), right.clone()]
        };

        while frontier
            .iter()
            .any(|oid| self.tag_of(oid) != Some(SideTag::Base))
        {
            if let Some(limit) = budget
                && self.nodes.len() > limit
            {
                return Err(ProvenanceError::BudgetExceeded { limit }.into());
            }

            debug_log!(
                "frontier: {}",
                frontier
                    .iter()
                    .map(|oid| format!("{}({:?})", oid.to_short_oid(), self.tag_of(oid)))
                    .collect::<Vec<_>>()
                    .join(", ")
            );

            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for oid in &frontier {
                for parent in self.parents_of(oid)? {
                    if seen.insert(parent.clone()) {
                        next.push(parent);
                    }
                }
            }

            frontier = next;
        }

        debug_log!("saturated after materializing {} commits", self.nodes.len());
        Ok(())
    }
}
