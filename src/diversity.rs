// src/diversity.rs
//! Publisher diversity limiting: greedy walk over an already-ranked list
//! that drops clusters once their leader's publisher has used up its quota.
//! Order-dependent on purpose; the caller is responsible for rank order.

use std::collections::HashMap;

use crate::cluster::Cluster;

pub const DEFAULT_MAX_PER_PUBLISHER: usize = 3;

/// Keep each cluster only while its leader's publisher has appeared fewer
/// than `max_per_publisher` times so far. Never reorders the input.
pub fn limit_by_publisher(ranked: Vec<Cluster>, max_per_publisher: usize) -> Vec<Cluster> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(ranked.len());
    for cluster in ranked {
        let publisher = cluster.leader().publisher.clone();
        let count = counts.entry(publisher).or_insert(0);
        if *count < max_per_publisher {
            *count += 1;
            out.push(cluster);
        }
    }
    out
}
