//! External disassembler invocation.
//!
//! The engine's only process boundary. A [`Disassembler`] turns a binary path
//! into raw listing bytes; everything downstream (parser, builder, matcher)
//! is pure. The default implementation shells out to `objdump -d`.

use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Environment variable overriding the objdump executable path.
pub const OBJDUMP_ENV: &str = "BRANCHPRINT_OBJDUMP";

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Error type for disassembly invocations.
#[derive(Debug, Error)]
pub enum DisassemblyError {
    #[error("binary not found at {0}")]
    MissingBinary(PathBuf),

    #[error("file is not an ELF executable: {0}")]
    NotElf(PathBuf),

    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external tool ran but reported failure; `detail` carries its
    /// stderr (or stdout when stderr was empty).
    #[error("{program} exited with {status}: {detail}")]
    Failed { program: String, status: String, detail: String },

    #[error("{program} produced no output for {path}")]
    EmptyOutput { program: String, path: PathBuf },
}

/// Produces a linear disassembly listing for a binary.
pub trait Disassembler {
    fn disassemble(&self, binary: &Path) -> Result<Vec<u8>, DisassemblyError>;
    fn name(&self) -> &'static str;
}

/// `objdump -d`-backed disassembler.
pub struct ObjdumpDisassembler {
    program: PathBuf,
}

impl ObjdumpDisassembler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Resolve the executable from `BRANCHPRINT_OBJDUMP`, falling back to
    /// `objdump` on `PATH`.
    pub fn from_env() -> Self {
        match env::var_os(OBJDUMP_ENV) {
            Some(program) if !program.is_empty() => Self::new(PathBuf::from(program)),
            _ => Self::new("objdump"),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ObjdumpDisassembler {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Disassembler for ObjdumpDisassembler {
    fn disassemble(&self, binary: &Path) -> Result<Vec<u8>, DisassemblyError> {
        if !binary.is_file() {
            return Err(DisassemblyError::MissingBinary(binary.to_path_buf()));
        }
        match is_elf(binary) {
            Ok(true) => {}
            Ok(false) => return Err(DisassemblyError::NotElf(binary.to_path_buf())),
            Err(source) => {
                return Err(DisassemblyError::Read { path: binary.to_path_buf(), source })
            }
        }

        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .arg("-d")
            .arg(binary)
            .output()
            .map_err(|source| DisassemblyError::Spawn { program: program.clone(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(DisassemblyError::Failed {
                program,
                status: output.status.to_string(),
                detail,
            });
        }
        if output.stdout.is_empty() {
            return Err(DisassemblyError::EmptyOutput { program, path: binary.to_path_buf() });
        }
        Ok(output.stdout)
    }

    fn name(&self) -> &'static str {
        "objdump"
    }
}

/// Check the four-byte ELF magic. Short files are simply not ELF.
pub fn is_elf(path: &Path) -> Result<bool, std::io::Error> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ELF_MAGIC),
        Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(error) => Err(error),
    }
}
