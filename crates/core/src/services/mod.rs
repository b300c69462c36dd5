pub mod disassembler;

pub use disassembler::{is_elf, Disassembler, DisassemblyError, ObjdumpDisassembler};
