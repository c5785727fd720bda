//! This module deals with chunks of bytecodes.

use crate::{Buffer, ChunkError, OpCode, Value};

/// Largest constant index loaded with [`OpCode::Constant`].
pub const MAX_SHORT_CONSTANT: usize = 0xFF;

/// Largest constant index loaded with [`OpCode::ConstantLong`].
pub const MAX_LONG_CONSTANT: usize = 0xFF_FFFF;

/// A run of consecutive instruction bytes that came from the same source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRun {
    /// Source line
    pub line: usize,
    /// Number of consecutive bytes on that line, always at least 1
    pub run_length: usize,
}

/// Run-length encoded mapping from instruction offsets to source lines.
///
/// Lookups scan the runs from the start, so they are linear in the number of runs.
/// Lines are only needed to report errors and to disassemble, never while executing.
#[derive(Debug, Default, Clone)]
pub struct LineTable {
    runs: Buffer<LineRun>,
    len: usize,
}

impl LineTable {
    /// Record the line of the next instruction byte.
    pub fn push(&mut self, line: usize) {
        self.len += 1;
        if let Some(last) = self.runs.last_mut() {
            if last.line == line {
                last.run_length += 1;
                return;
            }
        }
        self.runs.push(LineRun {
            line,
            run_length: 1,
        });
    }

    /// Get the line of the byte at the given offset.
    pub fn get(&self, offset: usize) -> Result<usize, ChunkError> {
        let mut bytes_seen = 0;
        for run in &self.runs {
            bytes_seen += run.run_length;
            if bytes_seen > offset {
                return Ok(run.line);
            }
        }
        Err(ChunkError::LineOutOfRange {
            offset,
            len: self.len,
        })
    }

    /// Number of bytes whose line has been recorded.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if no line has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The compressed runs.
    pub fn runs(&self) -> &[LineRun] {
        self.runs.as_slice()
    }
}

/// Append-only table of the literal values used by a chunk.
///
/// Equal values are not deduplicated, each push gets its own slot.
#[derive(Debug, Default, Clone)]
pub struct ConstantPool {
    values: Buffer<Value>,
}

impl ConstantPool {
    /// Add a value to the pool and return its index.
    pub fn push(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Read the constant at the given index
    pub fn get(&self, index: usize) -> Result<Value, ChunkError> {
        self.values
            .get(index)
            .copied()
            .ok_or(ChunkError::ConstantOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    /// Number of constants in the pool.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return true if the pool has no constant.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Chunk is a sequence of instructions and data that will be written to by the compiler
/// and later run by the virtual-machine.
///
/// Every byte of the instruction stream has exactly one recorded line.
///
/// # Examples
///
/// ```
/// use loxcalc::{Chunk, OpCode, Value};
///
/// let mut chunk = Chunk::default();
/// let idx = chunk.push_constant(Value::Number(1.2), 123).unwrap();
/// chunk.push(OpCode::Return.into(), 123);
///
/// assert_eq!(idx, 0);
/// assert_eq!(chunk.len(), 3);
/// assert_eq!(chunk.get_constant(0).unwrap(), Value::Number(1.2));
/// assert_eq!(chunk.line(2).unwrap(), 123);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Chunk {
    code: Buffer<u8>,
    lines: LineTable,
    constants: ConstantPool,
}

impl Chunk {
    /// Add a byte to the chunk along with the line it came from.
    pub fn push(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    /// Add a constant to the pool and the instruction that loads it. Returns the
    /// index of the constant.
    ///
    /// # Errors
    ///
    /// If the pool already holds as many constants as a 3-byte operand can address,
    /// the chunk is left unchanged and [`ChunkError::ConstantIndexOverflow`] is returned.
    pub fn push_constant(&mut self, value: Value, line: usize) -> Result<usize, ChunkError> {
        let index = self.constants.push(value);
        if index <= MAX_SHORT_CONSTANT {
            self.push(OpCode::Constant.into(), line);
            self.push(index as u8, line);
        } else if index <= MAX_LONG_CONSTANT {
            self.push(OpCode::ConstantLong.into(), line);
            self.push((index >> 16) as u8, line);
            self.push((index >> 8) as u8, line);
            self.push(index as u8, line);
        } else {
            self.constants.pop();
            return Err(ChunkError::ConstantIndexOverflow { index });
        }
        Ok(index)
    }

    /// Read the byte at the offset.
    pub fn read_byte(&self, offset: usize) -> Result<u8, ChunkError> {
        self.code
            .get(offset)
            .copied()
            .ok_or(ChunkError::OffsetOutOfRange {
                offset,
                len: self.code.len(),
            })
    }

    /// Decode the opcode at the offset.
    pub fn read_opcode(&self, offset: usize) -> Result<OpCode, ChunkError> {
        let byte = self.read_byte(offset)?;
        OpCode::try_from(byte).map_err(|byte| ChunkError::UnknownOpcode { offset, byte })
    }

    /// Decode the constant index of the constant-load instruction at the offset.
    pub fn get_constant_idx(&self, offset: usize) -> Result<usize, ChunkError> {
        let byte = self.read_byte(offset)?;
        let op = match OpCode::try_from(byte) {
            Ok(op) if op.is_constant() => op,
            _ => return Err(ChunkError::NotAConstantOp { offset, byte }),
        };
        let operands = self
            .code
            .as_slice()
            .get(offset + 1..offset + 1 + op.operand_width())
            .ok_or(ChunkError::TruncatedOperand { offset })?;
        Ok(operands
            .iter()
            .fold(0, |idx, &b| (idx << 8) | usize::from(b)))
    }

    /// Resolve the constant loaded by the constant-load instruction at the offset.
    pub fn get_constant(&self, offset: usize) -> Result<Value, ChunkError> {
        self.constants.get(self.get_constant_idx(offset)?)
    }

    /// Get the source line of the byte at the offset.
    pub fn line(&self, offset: usize) -> Result<usize, ChunkError> {
        self.lines.get(offset)
    }

    /// The instruction stream.
    pub fn code(&self) -> &[u8] {
        self.code.as_slice()
    }

    /// The line table.
    pub fn lines(&self) -> &LineTable {
        &self.lines
    }

    /// The constant pool.
    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    /// Number of bytes in the instruction stream.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Return true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
