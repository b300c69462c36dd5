//! Graph data model and on-disk JSON schema.
//!
//! A `Graph` is the immutable product of extraction: the ordered sequence of
//! conditional-branch nodes plus the jump edges between them. Sequence edges
//! (`n_i -> n_{i+1}`) are fully determined by the node count, so the runtime
//! type does not store them; they are materialized when the graph is written
//! out for human inspection and validated when a serialized graph is loaded.
//!
//! `GraphDocument` is the exact serialized shape. Loading goes through full
//! structural validation so that a prior graph file that was edited, truncated,
//! or produced by an incompatible tool fails with an error naming the
//! offending field instead of corrupting a comparison.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for graph documents that fail to load or validate.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The bytes are not a syntactically valid graph document.
    #[error("invalid graph file: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `meta.node_count` disagrees with the length of `nodes`.
    #[error("invalid graph file: meta.node_count is {declared} but nodes has {actual} entries")]
    NodeCountMismatch { declared: u32, actual: usize },

    /// Node indices must form the contiguous range `0..node_count`.
    #[error("invalid graph file: nodes[{position}].index is {found}, expected {position}")]
    NonContiguousIndex { position: usize, found: u32 },

    /// Two nodes cannot share an address.
    #[error("invalid graph file: nodes contains duplicate address {address:#x}")]
    DuplicateAddress { address: u64 },

    /// An edge references a node index outside the graph.
    #[error(
        "invalid graph file: edges.{kind} entry ({src}, {dst}) is out of range for {node_count} nodes"
    )]
    EdgeOutOfRange { kind: &'static str, src: u32, dst: u32, node_count: u32 },

    /// At most one jump edge may leave a node.
    #[error("invalid graph file: edges.jmp has more than one edge leaving node {src}")]
    DuplicateJumpSource { src: u32 },

    /// A `seq` entry does not connect consecutive nodes.
    #[error("invalid graph file: edges.seq[{position}] is ({src}, {dst}), expected ({position}, {expected_dst})")]
    BadSeqEdge { position: usize, src: u32, dst: u32, expected_dst: u32 },

    /// The `seq` list, when present, must cover every consecutive pair.
    #[error("invalid graph file: edges.seq has {actual} entries, expected {expected}")]
    SeqCountMismatch { expected: usize, actual: usize },
}

/// Convenience result type for graph loading/validation.
pub type GraphResult<T> = Result<T, GraphError>;

/// Provenance metadata carried alongside the node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphMeta {
    /// Path of the binary the graph was extracted from, as given by the caller.
    pub binary: String,
    /// Number of nodes; duplicated here so readers can size buffers up front.
    pub node_count: u32,
}

/// A conditional-branch instruction retained as a graph node.
///
/// `index` is the 0-based position in linear disassembly encounter order;
/// windows, sequence edges, and report offsets all rely on that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub index: u32,
    #[serde(with = "hex_address")]
    pub address: u64,
    #[serde(with = "hex_address_opt")]
    pub target_address: Option<u64>,
}

/// The `edges` section of a graph document.
///
/// `seq` is reconstructible from the node count, so it may be omitted on
/// read; it is always emitted on write.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<Vec<(u32, u32)>>,
    pub jmp: Vec<(u32, u32)>,
}

/// Exact serialized shape of an extracted graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDocument {
    pub meta: GraphMeta,
    pub nodes: Vec<Node>,
    pub edges: EdgeSection,
}

/// Immutable conditional-jump graph.
///
/// Construction happens once (builder or document load); afterwards the graph
/// is read-only and may be shared across concurrent matcher invocations
/// without synchronization.
#[derive(Debug, Clone)]
pub struct Graph {
    meta: GraphMeta,
    nodes: Vec<Node>,
    /// Jump destination per node index, derived from the jmp edge set.
    jump_targets: Vec<Option<u32>>,
}

impl Graph {
    /// Assemble a graph from builder output.
    ///
    /// The builder guarantees the §3 invariants by construction (indices are
    /// assigned sequentially, edges point at retained instructions), so this
    /// constructor trusts its inputs. Serialized documents go through
    /// [`Graph::from_document`] instead, which validates everything.
    pub fn from_parts(binary: impl Into<String>, nodes: Vec<Node>, jmp_edges: &[(u32, u32)]) -> Self {
        let mut jump_targets = vec![None; nodes.len()];
        for &(src, dst) in jmp_edges {
            jump_targets[src as usize] = Some(dst);
        }
        let meta = GraphMeta { binary: binary.into(), node_count: nodes.len() as u32 };
        Self { meta, nodes, jump_targets }
    }

    /// Validate a deserialized document and promote it to a runtime graph.
    pub fn from_document(document: GraphDocument) -> GraphResult<Self> {
        let GraphDocument { meta, nodes, edges } = document;
        let node_count = nodes.len();

        if meta.node_count as usize != node_count {
            return Err(GraphError::NodeCountMismatch {
                declared: meta.node_count,
                actual: node_count,
            });
        }

        let mut seen_addresses = HashSet::with_capacity(node_count);
        for (position, node) in nodes.iter().enumerate() {
            if node.index as usize != position {
                return Err(GraphError::NonContiguousIndex { position, found: node.index });
            }
            if !seen_addresses.insert(node.address) {
                return Err(GraphError::DuplicateAddress { address: node.address });
            }
        }

        if let Some(seq) = &edges.seq {
            let expected = node_count.saturating_sub(1);
            if seq.len() != expected {
                return Err(GraphError::SeqCountMismatch { expected, actual: seq.len() });
            }
            for (position, &(src, dst)) in seq.iter().enumerate() {
                if src as usize != position || dst as usize != position + 1 {
                    return Err(GraphError::BadSeqEdge {
                        position,
                        src,
                        dst,
                        expected_dst: position as u32 + 1,
                    });
                }
            }
        }

        let mut jump_targets = vec![None; node_count];
        for &(src, dst) in &edges.jmp {
            if src as usize >= node_count || dst as usize >= node_count {
                return Err(GraphError::EdgeOutOfRange {
                    kind: "jmp",
                    src,
                    dst,
                    node_count: node_count as u32,
                });
            }
            if jump_targets[src as usize].is_some() {
                return Err(GraphError::DuplicateJumpSource { src });
            }
            jump_targets[src as usize] = Some(dst);
        }

        Ok(Self { meta, nodes, jump_targets })
    }

    /// Parse and validate a graph document from raw JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> GraphResult<Self> {
        let document: GraphDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    /// Render the serialized shape, including the reconstructible `seq` edges.
    pub fn to_document(&self) -> GraphDocument {
        let node_count = self.nodes.len() as u32;
        let seq: Vec<(u32, u32)> = (1..node_count).map(|next| (next - 1, next)).collect();
        GraphDocument {
            meta: self.meta.clone(),
            nodes: self.nodes.clone(),
            edges: EdgeSection { seq: Some(seq), jmp: self.jump_edges() },
        }
    }

    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    pub fn binary(&self) -> &str {
        &self.meta.binary
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Destination node index of the jump edge leaving `index`, if any.
    pub fn jump_target(&self, index: usize) -> Option<usize> {
        self.jump_targets.get(index).copied().flatten().map(|dst| dst as usize)
    }

    /// The jmp edge set, ordered by source index.
    pub fn jump_edges(&self) -> Vec<(u32, u32)> {
        self.jump_targets
            .iter()
            .enumerate()
            .filter_map(|(src, dst)| dst.map(|dst| (src as u32, dst)))
            .collect()
    }
}

/// Addresses serialize as lower-case `0x…` strings for human inspection.
mod hex_address {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_hex_address(&text)
            .ok_or_else(|| D::Error::custom(format!("expected a 0x-prefixed hex address, got {text:?}")))
    }
}

mod hex_address_opt {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(address) => serializer.serialize_str(&format!("0x{address:x}")),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            None => Ok(None),
            Some(text) => super::parse_hex_address(&text)
                .map(Some)
                .ok_or_else(|| {
                    D::Error::custom(format!("expected a 0x-prefixed hex address, got {text:?}"))
                }),
        }
    }
}

fn parse_hex_address(text: &str) -> Option<u64> {
    let digits = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}
