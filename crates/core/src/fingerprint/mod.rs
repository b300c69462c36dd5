//! Canonical structural keys for contiguous node windows.
//!
//! A window `(start, size)` induces a subgraph on node indices
//! `[start, start+size)`. Its fingerprint captures exactly two things: the
//! pattern of jump edges that stay inside the window (re-indexed to local
//! positions) and, for every jump that leaves the window, whether it exits
//! before or after it. Which external node is targeted is deliberately
//! erased; absolute addresses never enter the key at all. Sequence edges are
//! identical across all windows of one size and are omitted.

use std::collections::HashMap;

use crate::model::Graph;

/// Where a node's jump edge lands, relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JumpShape {
    /// Destination inside the window, at this local index.
    Within(u32),
    /// Destination before the window start.
    Before,
    /// Destination at or past the window end.
    After,
}

/// Canonical key of one window's induced subgraph.
///
/// Entries are `(local_source_index, shape)` for every node in the window
/// with an outgoing jump edge, in ascending local order. Nodes without a
/// jump contribute nothing. Two windows (in the same graph or across
/// graphs) match iff their keys are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct WindowFingerprint {
    jumps: Vec<(u32, JumpShape)>,
}

/// Fingerprint the window `[start, start+size)` of `graph`.
///
/// Pure function of the graph's edge structure; callers must ensure
/// `start + size <= graph.node_count()`.
pub fn window_fingerprint(graph: &Graph, start: usize, size: usize) -> WindowFingerprint {
    let stop = start + size;
    let mut jumps = Vec::new();
    for (local, index) in (start..stop).enumerate() {
        let Some(destination) = graph.jump_target(index) else {
            continue;
        };
        let shape = if destination < start {
            JumpShape::Before
        } else if destination >= stop {
            JumpShape::After
        } else {
            JumpShape::Within((destination - start) as u32)
        };
        jumps.push((local as u32, shape));
    }
    WindowFingerprint { jumps }
}

/// Bucket every window of `size` in `graph` by fingerprint.
///
/// Start offsets within each bucket are ascending. Sizes of zero or larger
/// than the graph yield an empty map. Buckets for one size are meant to be
/// consumed and dropped before moving to the next size, keeping matcher
/// memory bounded by a single-size pass.
pub fn window_map(graph: &Graph, size: usize) -> HashMap<WindowFingerprint, Vec<u32>> {
    let mut buckets: HashMap<WindowFingerprint, Vec<u32>> = HashMap::new();
    let node_count = graph.node_count();
    if size == 0 || size > node_count {
        return buckets;
    }
    for start in 0..=(node_count - size) {
        let fingerprint = window_fingerprint(graph, start, size);
        buckets.entry(fingerprint).or_default().push(start as u32);
    }
    buckets
}
