use branchprint_core::disasm::{
    is_conditional_branch, parse_instruction_line, parse_listing, parse_target_address,
};

/// A realistic objdump excerpt: file banner, section banner, symbol label,
/// instructions with raw-byte columns, an inline `#` comment, and a blank
/// line. Only the instruction lines should survive parsing.
const LISTING: &str = "\
prog_a:     file format elf64-x86-64


Disassembly of section .init:

0000000000401000 <_init>:
  401000:\tf3 0f 1e fa          \tendbr64
  401004:\t48 83 ec 08          \tsub    $0x8,%rsp
  401008:\t48 8b 05 e9 2f 00 00 \tmov    0x2fe9(%rip),%rax        # 403ff8 <__gmon_start__@Base>
  40100f:\t48 85 c0             \ttest   %rax,%rax
  401012:\t74 02                \tje     401016 <_init+0x16>
  401014:\tff d0                \tcall   *%rax
  401016:\t48 83 c4 08          \tadd    $0x8,%rsp
  40101a:\tc3                   \tret
";

#[test]
fn parses_only_instruction_lines_in_order() {
    let instructions = parse_listing(LISTING.as_bytes());
    assert_eq!(instructions.len(), 8);
    assert_eq!(instructions[0].address, 0x401000);
    assert_eq!(instructions[0].mnemonic, "endbr64");
    assert_eq!(instructions[7].address, 0x40101a);
    assert_eq!(instructions[7].mnemonic, "ret");
}

#[test]
fn strips_trailing_hash_comment_from_operands() {
    let instructions = parse_listing(LISTING.as_bytes());
    let mov = &instructions[2];
    assert_eq!(mov.mnemonic, "mov");
    assert_eq!(mov.operands, "0x2fe9(%rip),%rax");
}

#[test]
fn keeps_symbol_suffix_in_branch_operands() {
    let instructions = parse_listing(LISTING.as_bytes());
    let je = &instructions[4];
    assert_eq!(je.mnemonic, "je");
    assert_eq!(je.operands, "401016 <_init+0x16>");
}

/// Some disassembler flags omit the raw-byte column entirely; the line is
/// still an instruction line.
#[test]
fn tolerates_missing_byte_column() {
    let parsed = parse_instruction_line("  401012:\tje     401016 <_init+0x16>")
        .expect("instruction without byte column");
    assert_eq!(parsed.address, 0x401012);
    assert_eq!(parsed.mnemonic, "je");
}

#[test]
fn ignores_labels_banners_and_blank_lines() {
    assert!(parse_instruction_line("prog_a:     file format elf64-x86-64").is_none());
    assert!(parse_instruction_line("Disassembly of section .text:").is_none());
    assert!(parse_instruction_line("0000000000401000 <_init>:").is_none());
    assert!(parse_instruction_line("main:").is_none());
    assert!(parse_instruction_line("").is_none());
}

/// Address columns that overflow u64 (more than 16 hex digits) are skipped
/// silently rather than surfaced as errors.
#[test]
fn skips_lines_with_unparseable_addresses() {
    assert!(parse_instruction_line("zz401000:\t90\tnop").is_none());
    assert!(parse_instruction_line("ffffffffffffffffff:\t90\tnop").is_none());
}

#[test]
fn sixteen_digit_addresses_are_accepted() {
    let parsed = parse_instruction_line("ffffffffffffff00:\t90\tnop").expect("16-digit address");
    assert_eq!(parsed.address, 0xffffffffffffff00);
}

#[test]
fn empty_listing_yields_no_instructions() {
    assert!(parse_listing(b"").is_empty());
}

#[test]
fn conditional_predicate_accepts_j_family_except_unconditional() {
    for mnemonic in ["je", "jne", "jg", "js", "jae", "jnbe", "JE"] {
        assert!(is_conditional_branch(mnemonic), "{mnemonic} should be conditional");
    }
    for mnemonic in ["jmp", "jmpq", "ljmp", "JMP"] {
        assert!(!is_conditional_branch(mnemonic), "{mnemonic} should not be conditional");
    }
}

#[test]
fn conditional_predicate_accepts_loop_family() {
    for mnemonic in ["loop", "loope", "loopne", "loopz", "loopnz", "LOOPNZ"] {
        assert!(is_conditional_branch(mnemonic), "{mnemonic} should be conditional");
    }
}

#[test]
fn conditional_predicate_rejects_everything_else() {
    for mnemonic in ["call", "mov", "ret", "test", "nop", "lea"] {
        assert!(!is_conditional_branch(mnemonic), "{mnemonic} should not be conditional");
    }
}

/// Symbol form first, then 0x tokens, then bare hex runs of length >= 4.
#[test]
fn target_scan_follows_source_priority() {
    assert_eq!(parse_target_address("401016 <_init+0x16>"), Some(0x401016));
    assert_eq!(parse_target_address("0x4005d6"), Some(0x4005d6));
    assert_eq!(parse_target_address("4005d6"), Some(0x4005d6));
    // The symbol form outranks an earlier 0x literal.
    assert_eq!(parse_target_address("$0x10,4005d6 <spin>"), Some(0x4005d6));
}

#[test]
fn target_scan_yields_none_for_indirect_operands() {
    assert_eq!(parse_target_address(""), None);
    assert_eq!(parse_target_address("%eax"), None);
    assert_eq!(parse_target_address("*%rax"), None);
    // Three hex characters is below the bare-run threshold.
    assert_eq!(parse_target_address("abc"), None);
}
