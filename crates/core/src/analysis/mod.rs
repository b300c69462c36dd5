//! Conditional-branch graph construction.
//!
//! Walks a parsed instruction sequence, keeps the conditional branches in
//! encounter order, and wires a jump edge wherever a branch's scanned target
//! address lands exactly on another retained branch. Targets that point at
//! non-branch instructions (or nowhere) simply produce no edge; sequence
//! edges are implicit in the node count and never stored.

use std::collections::HashMap;

use crate::disasm::{is_conditional_branch, parse_target_address, Instruction};
use crate::model::{Graph, Node};

/// Build the conditional-jump graph for one binary's instruction stream.
///
/// `binary` is recorded verbatim as provenance metadata. The result is
/// deterministic given the instruction sequence.
pub fn build_graph(binary: impl Into<String>, instructions: &[Instruction]) -> Graph {
    let mut nodes: Vec<Node> = Vec::new();
    let mut address_to_index: HashMap<u64, u32> = HashMap::new();

    for instruction in instructions {
        if !is_conditional_branch(&instruction.mnemonic) {
            continue;
        }
        let index = nodes.len() as u32;
        address_to_index.insert(instruction.address, index);
        nodes.push(Node {
            index,
            address: instruction.address,
            target_address: parse_target_address(&instruction.operands),
        });
    }

    // At most one jump edge per source; self-loops and backward edges are
    // both legitimate (think `jne` back to a loop header).
    let jmp_edges: Vec<(u32, u32)> = nodes
        .iter()
        .filter_map(|node| {
            let target = node.target_address?;
            address_to_index.get(&target).map(|&dst| (node.index, dst))
        })
        .collect();

    Graph::from_parts(binary, nodes, &jmp_edges)
}
