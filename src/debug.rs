//! Human readable views of bytecode.

use std::{fmt, io};

use crate::{Chunk, ChunkError, OpCode, Value};

/// A single decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of the opcode byte
    pub offset: usize,
    /// Source line of the opcode byte
    pub line: usize,
    /// Whether the previous byte came from the same line
    pub same_line: bool,
    /// The decoded opcode
    pub op: OpCode,
    /// Index and value of the loaded constant, for constant loads
    pub constant: Option<(usize, Value)>,
    /// Offset of the instruction that follows this one
    pub next: usize,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04} ", self.offset)?;
        if self.same_line {
            write!(f, "   | ")?;
        } else {
            write!(f, "{:4} ", self.line)?;
        }
        match self.constant {
            Some((idx, val)) => write!(f, "{:<16} {:4} '{}'", self.op.mnemonic(), idx, val),
            None => write!(f, "{}", self.op.mnemonic()),
        }
    }
}

/// Decode the instruction that starts at the given offset.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> Result<Instruction, ChunkError> {
    let op = chunk.read_opcode(offset)?;
    let line = chunk.line(offset)?;
    let same_line = offset > 0 && chunk.line(offset - 1)? == line;
    let constant = if op.is_constant() {
        let idx = chunk.get_constant_idx(offset)?;
        Some((idx, chunk.constants().get(idx)?))
    } else {
        None
    };
    Ok(Instruction {
        offset,
        line,
        same_line,
        op,
        constant,
        next: offset + 1 + op.operand_width(),
    })
}

impl Chunk {
    /// Go through the instructions in the chunk and write them in human-readable format.
    ///
    /// Bytes that can't be decoded are reported in place and skipped one at a time.
    pub fn disassemble<W: io::Write>(&self, name: &str, mut w: W) -> io::Result<()> {
        writeln!(w, "== {name} ==")?;
        let mut offset = 0;
        while offset < self.len() {
            match disassemble_instruction(self, offset) {
                Ok(instruction) => {
                    writeln!(w, "{instruction}")?;
                    offset = instruction.next;
                }
                Err(err) => {
                    writeln!(w, "{offset:04} {err}")?;
                    offset += 1;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        let mut chunk = Chunk::default();
        chunk.push_constant(Value::Number(1.2), 123).unwrap();
        chunk.push_constant(Value::Number(3.0), 123).unwrap();
        chunk.push(OpCode::Add.into(), 123);
        chunk.push(OpCode::Negate.into(), 124);
        chunk.push(OpCode::Return.into(), 124);
        chunk
    }

    #[test]
    fn decode_one_instruction() {
        let chunk = sample();
        let instruction = disassemble_instruction(&chunk, 2).unwrap();
        assert_eq!(instruction.op, OpCode::Constant);
        assert_eq!(instruction.constant, Some((1, Value::Number(3.0))));
        assert!(instruction.same_line);
        assert_eq!(instruction.next, 4);

        let instruction = disassemble_instruction(&chunk, 5).unwrap();
        assert_eq!(instruction.op, OpCode::Negate);
        assert_eq!(instruction.line, 124);
        assert!(!instruction.same_line);
        assert_eq!(instruction.next, 6);
    }

    #[test]
    fn chunk_listing() {
        let mut out = Vec::new();
        sample().disassemble("test chunk", &mut out).unwrap();
        let expected = "\
== test chunk ==
0000  123 OP_CONSTANT         0 '1.2'
0002    | OP_CONSTANT         1 '3'
0004    | OP_ADD
0005  124 OP_NEGATE
0006    | OP_RETURN
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn unknown_bytes_are_skipped() {
        let mut chunk = Chunk::default();
        chunk.push(0xEE, 1);
        chunk.push(OpCode::Return.into(), 1);
        let mut out = Vec::new();
        chunk.disassemble("bad", &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("0000 Unknown opcode 0xEE at offset 0."));
        assert!(out.contains("0001    | OP_RETURN"));
    }
}
