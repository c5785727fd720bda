/// OpCode is a one-byte tag that specifies the type of the instruction.
///
/// # Notes
///
/// Instructions are variable-width: the opcode byte is followed by
/// [`OpCode::operand_width`] operand bytes. Only the two constant loads carry
/// operands. A constant whose pool index fits in a byte is loaded with
/// `Constant`; larger indices up to 24 bits use `ConstantLong` with the index
/// stored big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Load a constant using a 1-byte index
    Constant = 0,
    /// Load a constant using a 3-byte big-endian index
    ConstantLong = 1,
    /// Negate a single number operand
    Negate = 2,
    /// Add two number operands
    Add = 3,
    /// Subtract the second operand from the first operand
    Subtract = 4,
    /// Multiply two number operands
    Multiply = 5,
    /// Divide the first operand by the second operand
    Divide = 6,
    /// Pop the top of the stack, emit it, and halt
    Return = 7,
}

impl OpCode {
    /// Number of operand bytes following the opcode.
    pub fn operand_width(self) -> usize {
        match self {
            Self::Constant => 1,
            Self::ConstantLong => 3,
            _ => 0,
        }
    }

    /// Name of the instruction as shown in disassembly.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Constant => "OP_CONSTANT",
            Self::ConstantLong => "OP_CONSTANT_LONG",
            Self::Negate => "OP_NEGATE",
            Self::Add => "OP_ADD",
            Self::Subtract => "OP_SUBTRACT",
            Self::Multiply => "OP_MULTIPLY",
            Self::Divide => "OP_DIVIDE",
            Self::Return => "OP_RETURN",
        }
    }

    /// Return true if the instruction loads a constant.
    pub fn is_constant(self) -> bool {
        matches!(self, Self::Constant | Self::ConstantLong)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0 => Self::Constant,
            1 => Self::ConstantLong,
            2 => Self::Negate,
            3 => Self::Add,
            4 => Self::Subtract,
            5 => Self::Multiply,
            6 => Self::Divide,
            7 => Self::Return,
            _ => return Err(byte),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_conversion() {
        for byte in 0..=7u8 {
            let op = OpCode::try_from(byte).unwrap();
            assert_eq!(u8::from(op), byte);
        }
        assert_eq!(OpCode::try_from(8), Err(8));
        assert_eq!(OpCode::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn only_constant_loads_have_operands() {
        assert_eq!(OpCode::Constant.operand_width(), 1);
        assert_eq!(OpCode::ConstantLong.operand_width(), 3);
        assert_eq!(OpCode::Add.operand_width(), 0);
        assert_eq!(OpCode::Return.operand_width(), 0);
        assert!(!OpCode::Negate.is_constant());
    }
}
