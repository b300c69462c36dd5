//! branchprint-core
//!
//! Core library for structural fingerprinting of ELF executables.
//!
//! This crate reduces a linear disassembly to a directed graph over its
//! conditional branches, then searches two such graphs for the largest (or
//! all) contiguous node windows whose induced subgraphs are structurally
//! identical.
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! and reusable from multiple frontends (CLI, batch triage pipelines, etc.).
//! The only external boundary is the disassembler invocation in `services`;
//! everything else is a pure function of bytes in.

pub mod analysis;
pub mod disasm;
pub mod fingerprint;
pub mod matcher;
pub mod model;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
