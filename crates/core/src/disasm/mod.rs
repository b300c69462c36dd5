//! Parser for GNU-style linear disassembly listings.
//!
//! The engine never disassembles natively; it consumes the textual output of
//! an external `objdump -d`-style tool as raw bytes and tokenizes it into a
//! linear sequence of instruction records. Section headers, symbol labels,
//! blank lines, and anything else that does not look like an instruction line
//! are ignored. Individual malformed lines are skipped silently; a listing
//! that yields no instructions is valid (empty) output, not an error.

use std::sync::OnceLock;

use regex::Regex;

/// One instruction as printed by the disassembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Virtual address from the listing's address column.
    pub address: u64,
    /// Opcode token, as printed (case preserved).
    pub mnemonic: String,
    /// Remainder of the line after the mnemonic, trimmed, `#` comment stripped.
    pub operands: String,
}

/// Mnemonics that are jumps but never conditional.
const UNCONDITIONAL_JUMPS: [&str; 3] = ["jmp", "jmpq", "ljmp"];

/// The loop-family conditional branches.
const CONDITIONAL_LOOPS: [&str; 5] = ["loop", "loope", "loopne", "loopz", "loopnz"];

/// The sole filter that turns instructions into graph nodes: a mnemonic
/// starting with `j` that is not an unconditional jump, or one of the
/// loop-family conditionals. Case-insensitive.
pub fn is_conditional_branch(mnemonic: &str) -> bool {
    let name = mnemonic.trim().to_ascii_lowercase();
    if name.starts_with('j') && !UNCONDITIONAL_JUMPS.contains(&name.as_str()) {
        return true;
    }
    CONDITIONAL_LOOPS.contains(&name.as_str())
}

/// Tokenize a raw listing into instruction records, preserving order.
pub fn parse_listing(listing: &[u8]) -> Vec<Instruction> {
    let text = String::from_utf8_lossy(listing);
    text.lines().filter_map(parse_instruction_line).collect()
}

/// Recognize a single instruction line.
///
/// The accepted shape is `<hex-address>: [<byte-pairs>…] <mnemonic> [<operands>]`.
/// The raw-byte column is a run of two-hex-digit tokens and may be absent
/// entirely (some disassembler flags omit it). Returns `None` for anything
/// else: section banners, `<symbol>:` labels, addresses that fail to parse.
pub fn parse_instruction_line(line: &str) -> Option<Instruction> {
    let (left, right) = line.split_once(':')?;
    let left = left.trim();
    if left.is_empty() || !left.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let address = u64::from_str_radix(left, 16).ok()?;

    let mut tokens = right.split_whitespace().peekable();
    while tokens.peek().is_some_and(|token| is_byte_pair(token)) {
        tokens.next();
    }
    let mnemonic = tokens.next()?.to_string();

    let mut operands = tokens.collect::<Vec<_>>().join(" ");
    if let Some(comment) = operands.find('#') {
        operands.truncate(comment);
    }
    let operands = operands.trim().to_string();

    Some(Instruction { address, mnemonic, operands })
}

fn is_byte_pair(token: &str) -> bool {
    token.len() == 2 && token.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Extract the branch target from an operand tail.
///
/// The scan runs over the raw operand text in three tiers, first hit wins:
/// a hex run immediately preceding `<` (the `4005d6 <main+0x2a>` symbol
/// form), then any `0x…` token, then a bare hex run of at least four digits.
/// A literal that overflows `u64` counts as no target.
pub fn parse_target_address(operands: &str) -> Option<u64> {
    if operands.is_empty() {
        return None;
    }

    if let Some(captures) = symbol_target_pattern().captures(operands) {
        return u64::from_str_radix(&captures[1], 16).ok();
    }
    if let Some(captures) = prefixed_hex_pattern().captures(operands) {
        return u64::from_str_radix(&captures[1], 16).ok();
    }
    if let Some(captures) = bare_hex_pattern().captures(operands) {
        return u64::from_str_radix(&captures[1], 16).ok();
    }
    None
}

fn symbol_target_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b([0-9a-fA-F]+)\s*<").expect("static pattern"))
}

fn prefixed_hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b0x([0-9a-fA-F]+)\b").expect("static pattern"))
}

fn bare_hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b([0-9a-fA-F]{4,})\b").expect("static pattern"))
}
