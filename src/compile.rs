//! Single-pass compiler from source text to bytecode.
//!
//! Expressions are parsed with precedence climbing and bytecode is emitted as soon as
//! each piece is recognized, no syntax tree is ever built.

use tracing::debug;

use crate::{
    scan::Scanner,
    token::{self, Token},
    Chunk, ChunkError, CompileError, Config, Diagnostic, Location, OpCode, Value,
};

/// Deepest nesting of operands, through groupings and operators, a single expression may have.
pub const MAX_NESTING: usize = 256;

/// Binding power of an operator, from loosest to tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Tokens that never appear as an infix operator
    None,
    /// `=`
    Assignment,
    /// `or`
    Or,
    /// `and`
    And,
    /// `==` `!=`
    Equality,
    /// `<` `>` `<=` `>=`
    Comparison,
    /// `+` `-`
    Term,
    /// `*` `/`
    Factor,
    /// `!` `-`
    Unary,
    /// `.` `()`
    Call,
    /// Literals and groupings
    Primary,
}

impl Precedence {
    /// The precedence one level tighter than this one.
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call | Self::Primary => Self::Primary,
        }
    }
}

/// What to do with a token found at the start of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `( expr )`
    Grouping,
    /// `-expr`
    Unary,
    /// A number literal
    Number,
}

/// What to do with a token found after a complete operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    /// `lhs op rhs`
    Binary,
}

/// How a token type takes part in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseRule {
    /// Action when the token starts an expression
    pub prefix: Option<Prefix>,
    /// Action when the token follows an operand
    pub infix: Option<Infix>,
    /// Binding power of the infix action
    pub precedence: Precedence,
}

impl ParseRule {
    const fn new(prefix: Option<Prefix>, infix: Option<Infix>, precedence: Precedence) -> Self {
        Self {
            prefix,
            infix,
            precedence,
        }
    }
}

/// Get the parse rule of a token type.
pub const fn rule(typ: token::Type) -> ParseRule {
    use token::Type;
    match typ {
        Type::LParen => ParseRule::new(Some(Prefix::Grouping), None, Precedence::None),
        Type::Minus => ParseRule::new(Some(Prefix::Unary), Some(Infix::Binary), Precedence::Term),
        Type::Plus => ParseRule::new(None, Some(Infix::Binary), Precedence::Term),
        Type::Slash | Type::Star => ParseRule::new(None, Some(Infix::Binary), Precedence::Factor),
        Type::Number => ParseRule::new(Some(Prefix::Number), None, Precedence::None),
        _ => ParseRule::new(None, None, Precedence::None),
    }
}

/// Compile the given source code into bytecodes appended to the chunk.
///
/// # Examples
///
/// ```
/// use loxcalc::{compile, Chunk};
///
/// let mut chunk = Chunk::default();
/// compile("1 + 2 * 3", &mut chunk).unwrap();
/// assert_eq!(chunk.constants().len(), 3);
///
/// let mut chunk = Chunk::default();
/// assert!(compile("1 +", &mut chunk).is_err());
/// ```
pub fn compile(src: &str, chunk: &mut Chunk) -> Result<(), CompileError> {
    Compiler::new(src, chunk, &Config::default()).compile()
}

/// Parser state for compiling one source string into one chunk.
#[derive(Debug)]
pub struct Compiler<'src, 'chunk> {
    scanner: Scanner<'src>,
    chunk: &'chunk mut Chunk,
    previous: Token<'src>,
    current: Token<'src>,
    had_error: bool,
    panic_mode: bool,
    diagnostics: Vec<Diagnostic>,
    internal: Option<ChunkError>,
    depth: usize,
    print_code: bool,
}

impl<'src, 'chunk> Compiler<'src, 'chunk> {
    /// Create a compiler that writes into the given chunk.
    pub fn new(src: &'src str, chunk: &'chunk mut Chunk, config: &Config) -> Self {
        Self {
            scanner: Scanner::new(src),
            chunk,
            previous: Token::empty(),
            current: Token::empty(),
            had_error: false,
            panic_mode: false,
            diagnostics: Vec::new(),
            internal: None,
            depth: 0,
            print_code: config.print_code,
        }
    }

    /// Compile exactly one expression followed by the end of the input.
    pub fn compile(mut self) -> Result<(), CompileError> {
        debug!(target: "loxcalc::compile", "compiling");
        self.advance();
        self.expression();
        self.consume(token::Type::Eof, "Expect end of expression.");
        self.emit_byte(OpCode::Return);

        if let Some(err) = self.internal {
            return Err(CompileError::Internal(err));
        }
        if self.had_error {
            return Err(CompileError::Syntax(self.diagnostics));
        }
        if self.print_code {
            let mut listing = Vec::new();
            if self.chunk.disassemble("code", &mut listing).is_ok() {
                debug!(target: "loxcalc::compile", "\n{}", String::from_utf8_lossy(&listing));
            }
        }
        debug!(target: "loxcalc::compile", bytes = self.chunk.len(), "compiled");
        Ok(())
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        if self.depth >= MAX_NESTING {
            self.error_at_current("Expression nested too deeply.");
            return;
        }
        self.depth += 1;
        self.parse_operand(precedence);
        self.depth -= 1;
    }

    fn parse_operand(&mut self, precedence: Precedence) {
        self.advance();
        let prefix = match rule(self.previous.typ).prefix {
            Some(prefix) => prefix,
            None => {
                self.error("Expect expression.");
                return;
            }
        };
        self.apply_prefix(prefix);

        while precedence <= rule(self.current.typ).precedence {
            self.advance();
            if let Some(infix) = rule(self.previous.typ).infix {
                self.apply_infix(infix);
            }
        }
    }

    fn apply_prefix(&mut self, prefix: Prefix) {
        match prefix {
            Prefix::Grouping => self.grouping(),
            Prefix::Unary => self.unary(),
            Prefix::Number => self.number(),
        }
    }

    fn apply_infix(&mut self, infix: Infix) {
        match infix {
            Infix::Binary => self.binary(),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(token::Type::RParen, "Expect ')' after expression.");
    }

    fn number(&mut self) {
        match self.previous.lexeme.parse::<f64>() {
            Ok(n) => self.emit_constant(Value::Number(n)),
            Err(_) => self.error("Invalid number literal."),
        }
    }

    fn unary(&mut self) {
        let operator = self.previous;
        self.parse_precedence(Precedence::Unary);
        if operator.typ == token::Type::Minus {
            self.emit_byte_at(OpCode::Negate, operator.line);
        }
    }

    fn binary(&mut self) {
        let operator = self.previous;
        self.parse_precedence(rule(operator.typ).precedence.next());
        let op = match operator.typ {
            token::Type::Plus => OpCode::Add,
            token::Type::Minus => OpCode::Subtract,
            token::Type::Star => OpCode::Multiply,
            token::Type::Slash => OpCode::Divide,
            _ => return,
        };
        self.emit_byte_at(op, operator.line);
    }

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            self.current = self.scanner.scan();
            if self.current.typ != token::Type::Error {
                break;
            }
            self.error_at_current(self.current.lexeme);
        }
    }

    fn consume(&mut self, typ: token::Type, msg: &str) {
        if self.current.typ == typ {
            self.advance();
        } else {
            self.error_at_current(msg);
        }
    }

    fn emit_byte(&mut self, op: OpCode) {
        self.emit_byte_at(op, self.previous.line);
    }

    fn emit_byte_at(&mut self, op: OpCode, line: usize) {
        self.chunk.push(op.into(), line);
    }

    fn emit_constant(&mut self, value: Value) {
        if let Err(err) = self.chunk.push_constant(value, self.previous.line) {
            debug!(target: "loxcalc::compile", line = self.previous.line, "{err}");
            self.had_error = true;
            self.internal.get_or_insert(err);
        }
    }

    fn error(&mut self, msg: &str) {
        self.error_at(self.previous, msg);
    }

    fn error_at_current(&mut self, msg: &str) {
        self.error_at(self.current, msg);
    }

    fn error_at(&mut self, token: Token<'_>, msg: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;

        let location = match token.typ {
            token::Type::Eof => Location::AtEnd,
            token::Type::Error => Location::Lexical,
            _ => Location::At(token.lexeme.to_string()),
        };
        let diagnostic = Diagnostic {
            line: token.line,
            location,
            message: msg.to_string(),
        };
        debug!(target: "loxcalc::compile", line = diagnostic.line, "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}
