use std::io;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    debug::disassemble_instruction, Chunk, Compiler, Config, Error, OpCode, RuntimeError, Value,
};

/// A bytecode virtual machine with an operand stack of bounded depth.
///
/// Each machine owns all of its state. Machines are independent of one another and a
/// single machine can run any number of chunks one after the other. Values produced by
/// `OP_RETURN` are written, one per line, to the machine's output.
///
/// # Examples
///
/// ```
/// use loxcalc::{Config, Value, VM};
///
/// let mut vm = VM::new(Config::default(), Vec::new());
/// let value = vm.interpret_source("(1 + 2) * 3").unwrap();
/// assert_eq!(value, Value::Number(9.0));
/// assert_eq!(vm.output(), b"9\n");
/// ```
#[derive(Debug)]
pub struct VM<W = io::Stdout> {
    stack: Vec<Value>,
    ip: usize,
    instruction: usize,
    config: Config,
    out: W,
}

impl Default for VM {
    fn default() -> Self {
        Self::new(Config::default(), io::stdout())
    }
}

impl<W: io::Write> VM<W> {
    /// Create a machine that writes program output to `out`.
    pub fn new(config: Config, out: W) -> Self {
        Self {
            stack: Vec::with_capacity(config.stack_max),
            ip: 0,
            instruction: 0,
            config,
            out,
        }
    }

    /// Compile the source and run the resulting chunk.
    pub fn interpret_source(&mut self, src: &str) -> Result<Value, Error> {
        let mut chunk = Chunk::default();
        Compiler::new(src, &mut chunk, &self.config).compile()?;
        Ok(self.interpret(&chunk)?)
    }

    /// Run the chunk from its first instruction until it returns.
    pub fn interpret(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        self.stack.clear();
        self.ip = 0;
        self.instruction = 0;
        debug!(target: "loxcalc::vm", bytes = chunk.len(), "running");
        let result = self.run(chunk);
        if let Err(ref err) = result {
            debug!(target: "loxcalc::vm", "{err}");
        }
        result
    }

    /// The writer that receives program output.
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Consume the machine and return its output writer.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Values currently on the operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        loop {
            if self.config.trace_execution {
                self.trace_instruction(chunk);
            }

            self.instruction = self.ip;
            let byte = *chunk
                .code()
                .get(self.ip)
                .ok_or(RuntimeError::UnexpectedEnd { offset: self.ip })?;
            self.ip += 1;

            let opcode = match OpCode::try_from(byte) {
                Ok(opcode) => opcode,
                Err(byte) => {
                    return Err(RuntimeError::UnknownOpcode {
                        byte,
                        line: chunk.line(self.instruction)?,
                    })
                }
            };
            match opcode {
                OpCode::Constant | OpCode::ConstantLong => {
                    let val = chunk.get_constant(self.instruction)?;
                    self.ip += opcode.operand_width();
                    self.push(chunk, val)?;
                }
                OpCode::Negate => {
                    let val = self.pop(chunk)?;
                    self.push(chunk, -&val)?;
                }
                OpCode::Add => self.binary(chunk, |a, b| a + b)?,
                OpCode::Subtract => self.binary(chunk, |a, b| a - b)?,
                OpCode::Multiply => self.binary(chunk, |a, b| a * b)?,
                OpCode::Divide => self.binary(chunk, |a, b| a / b)?,
                OpCode::Return => {
                    let val = self.pop(chunk)?;
                    writeln!(self.out, "{val}")?;
                    return Ok(val);
                }
            }
        }
    }

    fn binary(
        &mut self,
        chunk: &Chunk,
        op: fn(&Value, &Value) -> Value,
    ) -> Result<(), RuntimeError> {
        let rhs = self.pop(chunk)?;
        let lhs = self.pop(chunk)?;
        self.push(chunk, op(&lhs, &rhs))
    }

    fn push(&mut self, chunk: &Chunk, val: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.stack_max {
            return Err(RuntimeError::StackOverflow {
                line: chunk.line(self.instruction)?,
            });
        }
        self.stack.push(val);
        Ok(())
    }

    fn pop(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        match self.stack.pop() {
            Some(val) => Ok(val),
            None => Err(RuntimeError::StackUnderflow {
                line: chunk.line(self.instruction)?,
            }),
        }
    }

    fn trace_instruction(&self, chunk: &Chunk) {
        let stack = self.stack.iter().map(|v| format!("[ {v} ]")).join("");
        match disassemble_instruction(chunk, self.ip) {
            Ok(instruction) => trace!(target: "loxcalc::vm", %stack, "{instruction}"),
            Err(err) => trace!(target: "loxcalc::vm", %stack, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompileError, OpCode};

    fn vm() -> VM<Vec<u8>> {
        VM::new(Config::default(), Vec::new())
    }

    fn eval(src: &str) -> f64 {
        vm().interpret_source(src).unwrap().as_number()
    }

    #[test]
    fn arithmetic_follows_precedence() {
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("-2 + 3"), 1.0);
        assert_eq!(eval("8 / 4 / 2"), 1.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("--3"), 3.0);
    }

    #[test]
    fn mixed_expression() {
        assert_eq!(eval("1.2 + 3.4 / 5.6 * -2"), 1.2 + 3.4 / 5.6 * -2.0);
    }

    #[test]
    fn divide_by_zero() {
        assert_eq!(eval("1 / 0"), f64::INFINITY);
        assert!(eval("0 / 0").is_nan());
    }

    #[test]
    fn return_writes_output() {
        let mut vm = vm();
        vm.interpret_source("1.5 * 2").unwrap();
        vm.interpret_source("1 / 4").unwrap();
        assert_eq!(vm.into_output(), b"3\n0.25\n");
    }

    #[test]
    fn compile_errors_do_not_run() {
        let mut vm = vm();
        let err = vm.interpret_source("1 +").unwrap_err();
        assert!(matches!(err, Error::Compile(CompileError::Syntax(_))));
        assert!(vm.output().is_empty());
    }

    #[test]
    fn constant_long_executes() {
        let mut chunk = Chunk::default();
        for i in 0..300 {
            chunk.push_constant(Value::Number(i as f64), 1).unwrap();
        }
        for _ in 0..299 {
            chunk.push(OpCode::Add.into(), 1);
        }
        chunk.push(OpCode::Return.into(), 1);

        let mut vm = VM::new(Config::default().with_stack_max(512), Vec::new());
        let val = vm.interpret(&chunk).unwrap();
        assert_eq!(val, Value::Number((0..300).sum::<i32>() as f64));
    }

    #[test]
    fn stack_overflow_is_reported_with_line() {
        let mut chunk = Chunk::default();
        chunk.push_constant(Value::Number(1.0), 1).unwrap();
        chunk.push_constant(Value::Number(2.0), 1).unwrap();
        chunk.push_constant(Value::Number(3.0), 4).unwrap();
        chunk.push(OpCode::Return.into(), 4);

        let mut vm = VM::new(Config::default().with_stack_max(2), Vec::new());
        let err = vm.interpret(&chunk).unwrap_err();
        assert!(matches!(err, RuntimeError::StackOverflow { line: 4 }));
    }

    #[test]
    fn stack_underflow_is_reported_with_line() {
        let mut chunk = Chunk::default();
        chunk.push_constant(Value::Number(1.0), 1).unwrap();
        chunk.push(OpCode::Add.into(), 2);
        chunk.push(OpCode::Return.into(), 2);

        let err = vm().interpret(&chunk).unwrap_err();
        assert!(matches!(err, RuntimeError::StackUnderflow { line: 2 }));
    }

    #[test]
    fn unknown_opcode_is_an_error() {
        let mut chunk = Chunk::default();
        chunk.push(0xAB, 7);
        chunk.push(OpCode::Return.into(), 7);

        let err = vm().interpret(&chunk).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UnknownOpcode {
                byte: 0xAB,
                line: 7
            }
        ));
    }

    #[test]
    fn running_off_the_end() {
        let mut chunk = Chunk::default();
        chunk.push_constant(Value::Number(1.0), 1).unwrap();

        let err = vm().interpret(&chunk).unwrap_err();
        assert!(matches!(err, RuntimeError::UnexpectedEnd { offset: 2 }));
    }

    #[test]
    fn machine_is_reusable_after_an_error() {
        let mut bad = Chunk::default();
        bad.push_constant(Value::Number(1.0), 1).unwrap();
        bad.push_constant(Value::Number(2.0), 1).unwrap();
        bad.push(0xFF, 1);

        let mut vm = vm();
        assert!(vm.interpret(&bad).is_err());
        assert_eq!(vm.stack().len(), 2);
        assert_eq!(vm.interpret_source("4 - 1").unwrap(), Value::Number(3.0));
        assert!(vm.stack().is_empty());
    }

    #[test]
    fn machines_are_independent() {
        let mut a = vm();
        let mut b = vm();
        a.interpret_source("1").unwrap();
        b.interpret_source("2").unwrap();
        a.interpret_source("3").unwrap();
        assert_eq!(a.output(), b"1\n3\n");
        assert_eq!(b.output(), b"2\n");
    }
}
