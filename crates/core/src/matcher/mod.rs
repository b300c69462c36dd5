//! Exhaustive contiguous-window matching between two graphs.
//!
//! The matcher descends window sizes from `min(|A|, |B|)` down to
//! `min_size`, bucketing the new graph's windows by fingerprint at each size
//! and probing them with the prior graph's windows in ascending start order.
//! Best-size mode stops at the first size that matches anywhere; all-sizes
//! mode keeps descending and accumulates matches across sizes up to
//! `max_report`. A `size_filter` never narrows the descent; it only gates
//! which matches reach the report, so `best_match_size` always records the
//! true maximum.
//!
//! The matcher is a pure function of its inputs: no state survives a call,
//! and the input graphs are never mutated.

use serde::{Deserialize, Serialize};

use crate::fingerprint::{window_fingerprint, window_map};
use crate::model::Graph;

/// Default lower bound on window size.
pub const DEFAULT_MIN_SIZE: u32 = 4;
/// Default report cap in all-sizes mode.
pub const DEFAULT_MAX_REPORT_ALL_SIZES: u32 = 200;
/// Default report cap in best-size mode.
pub const DEFAULT_MAX_REPORT_BEST_SIZE: u32 = 1;

/// The two matcher operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Stop at the largest size with at least one match.
    BestSize,
    /// Descend all the way to `min_size`, accumulating matches.
    AllSizes,
}

/// Matcher inputs beyond the two graphs. Serialized verbatim into the
/// comparison document's `params` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchParams {
    pub mode: MatchMode,
    pub min_size: u32,
    pub size_filter: Option<u32>,
    pub max_report: u32,
}

impl MatchParams {
    /// Defaults for a mode: `min_size` 4, no filter, `max_report` 1 for
    /// best-size and 200 for all-sizes.
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            min_size: DEFAULT_MIN_SIZE,
            size_filter: None,
            max_report: default_max_report(mode),
        }
    }
}

/// The effective `max_report` when the caller left it unset.
pub fn default_max_report(mode: MatchMode) -> u32 {
    match mode {
        MatchMode::BestSize => DEFAULT_MAX_REPORT_BEST_SIZE,
        MatchMode::AllSizes => DEFAULT_MAX_REPORT_ALL_SIZES,
    }
}

/// One reported window pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMatch {
    pub prior_start: u32,
    pub new_start: u32,
    pub size: u32,
}

/// The comparison record: best size, fit ratio, and the reported pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub best_match_size: u32,
    pub fit_ratio_against_min_nodes: f64,
    pub match_count_reported: u32,
    pub matches: Vec<WindowMatch>,
}

/// Identifies one side of a comparison in the serialized report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRef {
    pub path: String,
    pub node_count: u32,
}

/// Exact serialized shape of a comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonDocument {
    pub prior_graph: GraphRef,
    pub new_graph: GraphRef,
    pub params: MatchParams,
    pub comparison: Comparison,
}

/// Find fingerprint-identical contiguous windows shared by `prior` and `new`.
///
/// Deterministic: candidate pairs are enumerated by descending size, then
/// ascending `prior_start`, then ascending `new_start`, and truncation at
/// `max_report` happens in that order. Degenerate inputs (either graph
/// smaller than `min_size`) yield a zero-match report rather than an error.
pub fn compare_graphs(prior: &Graph, new: &Graph, params: &MatchParams) -> Comparison {
    let min_nodes = prior.node_count().min(new.node_count());
    let min_size = params.min_size.max(1) as usize;
    let max_report = params.max_report as usize;

    let mut best_match_size: u32 = 0;
    let mut matches: Vec<WindowMatch> = Vec::new();

    'descent: for size in (min_size..=min_nodes).rev() {
        // Buckets live for exactly one size; memory stays O(windows at size).
        let buckets = window_map(new, size);
        let filtered_out = params.size_filter.is_some_and(|filter| filter as usize != size);

        for prior_start in 0..=(prior.node_count() - size) {
            let fingerprint = window_fingerprint(prior, prior_start, size);
            let Some(new_starts) = buckets.get(&fingerprint) else {
                continue;
            };
            // The best size counts fingerprint hits even when the filter
            // keeps them out of the report.
            if best_match_size == 0 {
                best_match_size = size as u32;
            }
            if filtered_out {
                continue;
            }
            for &new_start in new_starts {
                if matches.len() >= max_report {
                    break 'descent;
                }
                matches.push(WindowMatch {
                    prior_start: prior_start as u32,
                    new_start,
                    size: size as u32,
                });
            }
        }

        if params.mode == MatchMode::BestSize && best_match_size != 0 {
            break;
        }
        if matches.len() >= max_report {
            break;
        }
    }

    matches.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then(a.prior_start.cmp(&b.prior_start))
            .then(a.new_start.cmp(&b.new_start))
    });

    let fit_ratio = if min_nodes == 0 {
        0.0
    } else {
        f64::from(best_match_size) / min_nodes as f64
    };

    Comparison {
        best_match_size,
        fit_ratio_against_min_nodes: fit_ratio,
        match_count_reported: matches.len() as u32,
        matches,
    }
}
