use std::{fmt, io};

use thiserror::Error;

/// Violations of a chunk's internal invariants.
///
/// These are defects of whoever produced or decodes the bytecode, never a
/// consequence of user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    /// Looked up the line of a byte that was never written
    #[error("Bytecode offset {offset} does not have a matching line number (recorded {len}).")]
    LineOutOfRange {
        /// The requested offset
        offset: usize,
        /// Number of bytes with a recorded line
        len: usize,
    },
    /// The constant pool outgrew what a 24-bit operand can address
    #[error("Constant index {index:#X} doesn't fit in 3 bytes.")]
    ConstantIndexOverflow {
        /// The index that could not be encoded
        index: usize,
    },
    /// Decoded a constant operand from an instruction that has none
    #[error("Opcode {byte:#X} at offset {offset} is not a constant opcode.")]
    NotAConstantOp {
        /// Offset of the instruction
        offset: usize,
        /// The opcode byte found there
        byte: u8,
    },
    /// Read past the end of the instruction stream
    #[error("Offset {offset} is outside of the chunk (length {len}).")]
    OffsetOutOfRange {
        /// The requested offset
        offset: usize,
        /// Length of the instruction stream
        len: usize,
    },
    /// An instruction's operand bytes run past the end of the stream
    #[error("Instruction at offset {offset} is missing operand bytes.")]
    TruncatedOperand {
        /// Offset of the instruction
        offset: usize,
    },
    /// A constant operand names a slot that the pool doesn't have
    #[error("Constant index {index} is out of range (pool size {len}).")]
    ConstantOutOfRange {
        /// The decoded index
        index: usize,
        /// Number of constants in the pool
        len: usize,
    },
    /// The byte at an instruction boundary is not an opcode
    #[error("Unknown opcode {byte:#X} at offset {offset}.")]
    UnknownOpcode {
        /// Offset of the byte
        offset: usize,
        /// The byte found there
        byte: u8,
    },
}

/// Where in the source a syntax error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// At the end of the input
    AtEnd,
    /// At the given lexeme
    At(String),
    /// Reported by the scanner, the message already describes the problem
    Lexical,
}

/// A single error reported while compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Source line of the offending token
    pub line: usize,
    /// Context of the offending token
    pub location: Location,
    /// Human readable description
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error", self.line)?;
        match &self.location {
            Location::AtEnd => write!(f, " at end")?,
            Location::At(lexeme) => write!(f, " at '{lexeme}'")?,
            Location::Lexical => {}
        }
        write!(f, ": {}", self.message)
    }
}

/// Errors while compiling source code into a chunk.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Lexical or syntax errors in the source, in the order they were found
    #[error("{}", display_diagnostics(.0))]
    Syntax(Vec<Diagnostic>),
    /// The compiler produced a chunk it could not encode
    #[error("Internal compiler error: {0}")]
    Internal(#[from] ChunkError),
}

impl CompileError {
    /// All diagnostics that were reported. Internal errors have none.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Syntax(diags) => diags,
            Self::Internal(_) => &[],
        }
    }
}

fn display_diagnostics(diags: &[Diagnostic]) -> String {
    diags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Virtual machine errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Push on a full stack
    #[error("Stack overflow.\n[line {line}] in script.")]
    StackOverflow {
        /// Line of the executing instruction
        line: usize,
    },
    /// Pop on an empty stack
    #[error("Stack underflow.\n[line {line}] in script.")]
    StackUnderflow {
        /// Line of the executing instruction
        line: usize,
    },
    /// The instruction pointer landed on a byte that isn't an opcode
    #[error("Unknown opcode {byte:#X}.\n[line {line}] in script.")]
    UnknownOpcode {
        /// The byte that was read
        byte: u8,
        /// Line of the byte
        line: usize,
    },
    /// Execution ran off the end of the chunk without returning
    #[error("Reached end of chunk at offset {offset} without a return.")]
    UnexpectedEnd {
        /// Length of the instruction stream
        offset: usize,
    },
    /// The chunk being executed is malformed
    #[error("Malformed chunk: {0}")]
    Chunk(#[from] ChunkError),
    /// Program output could not be written
    #[error("Could not write program output: {0}")]
    Output(#[from] io::Error),
}

/// Status of an interpretation, mirroring the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretStatus {
    /// Compiled and ran to completion
    Ok,
    /// The source did not compile
    CompileError,
    /// Execution failed
    RuntimeError,
}

impl InterpretStatus {
    /// Exit code following the `sysexits.h` convention.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::CompileError => 65,
            Self::RuntimeError => 70,
        }
    }
}

/// Interpreter errors
#[derive(Debug, Error)]
pub enum Error {
    /// A compilation error happened
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// A runtime error happened
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// The interpretation status this error corresponds to.
    pub fn status(&self) -> InterpretStatus {
        match self {
            Self::Compile(_) => InterpretStatus::CompileError,
            Self::Runtime(_) => InterpretStatus::RuntimeError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let at = Diagnostic {
            line: 3,
            location: Location::At("+".to_string()),
            message: "Expect expression.".to_string(),
        };
        assert_eq!(at.to_string(), "[line 3] Error at '+': Expect expression.");

        let end = Diagnostic {
            line: 1,
            location: Location::AtEnd,
            message: "Expect expression.".to_string(),
        };
        assert_eq!(end.to_string(), "[line 1] Error at end: Expect expression.");

        let lex = Diagnostic {
            line: 2,
            location: Location::Lexical,
            message: "Unexpected character.".to_string(),
        };
        assert_eq!(lex.to_string(), "[line 2] Error: Unexpected character.");
    }

    #[test]
    fn status_codes() {
        let err = Error::from(RuntimeError::StackUnderflow { line: 1 });
        assert_eq!(err.status(), InterpretStatus::RuntimeError);
        assert_eq!(err.status().exit_code(), 70);
        let err = Error::from(CompileError::Syntax(Vec::new()));
        assert_eq!(err.status().exit_code(), 65);
        assert_eq!(InterpretStatus::Ok.exit_code(), 0);
    }

    #[test]
    fn runtime_error_mentions_line() {
        let err = RuntimeError::StackOverflow { line: 12 };
        assert!(err.to_string().contains("[line 12]"));
    }
}
