use std::path::Path;

use anyhow::{Context, Result};
use branchprint_core::analysis::build_graph;
use branchprint_core::disasm::parse_listing;
use branchprint_core::model::Graph;
use branchprint_core::services::{Disassembler, ObjdumpDisassembler};

use crate::write_json_atomic;

/// Disassemble `binary`, build its conditional-jump graph, and write the
/// graph document to `output`.
pub fn extract_command(binary: &str, output: &str) -> Result<()> {
    let graph = extract_graph(Path::new(binary))?;
    let document = graph.to_document();
    write_json_atomic(Path::new(output), &document)?;

    println!(
        "Wrote graph with {} nodes and {} jump edges to {}",
        graph.node_count(),
        graph.jump_edges().len(),
        output
    );
    Ok(())
}

/// Run the extraction pipeline: objdump listing, instruction records, graph.
pub fn extract_graph(binary: &Path) -> Result<Graph> {
    let disassembler = ObjdumpDisassembler::from_env();
    let listing = disassembler
        .disassemble(binary)
        .with_context(|| format!("Failed to disassemble {}", binary.display()))?;
    let instructions = parse_listing(&listing);
    Ok(build_graph(binary.display().to_string(), &instructions))
}
