use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use branchprint_core::matcher::{
    compare_graphs, default_max_report, ComparisonDocument, GraphRef, MatchMode, MatchParams,
};
use branchprint_core::model::Graph;

use crate::commands::extract_graph;
use crate::write_json_atomic;

/// Inputs for the compare command, mirroring its CLI flags.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub binary: String,
    pub prior_graph: String,
    pub output: String,
    pub extracted_output: Option<String>,
    pub collect_all_sizes: bool,
    pub min_size: u32,
    pub size_filter: Option<u32>,
    /// Report cap; `None` means the mode default (1 best-size, 200 all-sizes).
    pub max_report: Option<u32>,
}

/// Extract a fresh graph from the binary, load the prior graph, run the
/// matcher, and write the comparison report.
pub fn compare_command(options: &CompareOptions) -> Result<()> {
    let new_graph = extract_graph(Path::new(&options.binary))?;

    let prior_bytes = fs::read(&options.prior_graph)
        .with_context(|| format!("Failed to read prior graph at {}", options.prior_graph))?;
    let prior = Graph::from_json_slice(&prior_bytes)
        .with_context(|| format!("Failed to load prior graph at {}", options.prior_graph))?;

    if let Some(extracted_output) = &options.extracted_output {
        write_json_atomic(Path::new(extracted_output), &new_graph.to_document())?;
    }

    let mode = if options.collect_all_sizes { MatchMode::AllSizes } else { MatchMode::BestSize };
    let params = MatchParams {
        mode,
        min_size: options.min_size,
        size_filter: options.size_filter,
        max_report: options.max_report.unwrap_or_else(|| default_max_report(mode)),
    };

    let comparison = compare_graphs(&prior, &new_graph, &params);
    let document = ComparisonDocument {
        prior_graph: GraphRef {
            path: options.prior_graph.clone(),
            node_count: prior.node_count() as u32,
        },
        new_graph: GraphRef {
            path: options.binary.clone(),
            node_count: new_graph.node_count() as u32,
        },
        params,
        comparison,
    };
    write_json_atomic(Path::new(&options.output), &document)?;

    println!(
        "Best fit size {} ({:.2}% of min node count), reported matches: {}",
        document.comparison.best_match_size,
        document.comparison.fit_ratio_against_min_nodes * 100.0,
        document.comparison.match_count_reported
    );
    println!("Wrote comparison report to {}", options.output);
    Ok(())
}
