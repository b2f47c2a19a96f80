// src/cluster.rs
//! Single-pass greedy clustering of mapped entries into groups of
//! near-duplicate stories.
//!
//! Each incoming entry is compared against the FIRST member of every
//! existing cluster (the cluster's original anchor, never recomputed) and
//! joins the first cluster whose anchor scores at or above the threshold.
//! Greedy and order-dependent: O(n*k) with no backtracking, so membership
//! is similar to the anchor, not pairwise transitive.

use std::collections::BTreeSet;

use crate::model::MappedEntry;
use crate::similarity::similarity;

pub const DEFAULT_CLUSTER_THRESHOLD: f64 = 0.35;

/// A group of entries believed to describe the same real-world event.
/// Members keep their insertion order; `members[0]` is the anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub members: Vec<MappedEntry>,
}

impl Cluster {
    fn new(first: MappedEntry) -> Self {
        Self {
            members: vec![first],
        }
    }

    /// The title all candidate members are compared against.
    pub fn anchor_title(&self) -> &str {
        &self.members[0].title
    }

    /// Canonical representative: the member with the longest title by
    /// character count, chosen independently of the anchor. Ties keep the
    /// earliest member.
    pub fn leader(&self) -> &MappedEntry {
        let mut best = &self.members[0];
        for m in &self.members[1..] {
            if m.title.chars().count() > best.title.chars().count() {
                best = m;
            }
        }
        best
    }

    /// Distinct publisher names across all members, in first-seen order.
    pub fn distinct_publishers(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for m in &self.members {
            if seen.insert(m.publisher.as_str()) {
                out.push(m.publisher.clone());
            }
        }
        out
    }
}

/// Cluster entries in input order. Empty input yields empty output; a
/// single entry yields one singleton cluster.
pub fn cluster(entries: Vec<MappedEntry>, threshold: f64) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();
    'next_entry: for entry in entries {
        for c in clusters.iter_mut() {
            if similarity(&entry.title, c.anchor_title()) >= threshold {
                c.members.push(entry);
                continue 'next_entry;
            }
        }
        clusters.push(Cluster::new(entry));
    }
    clusters
}
