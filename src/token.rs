//! Tokens produced by the scanner and consumed by the compiler.

/// A token borrowed from the source it was scanned from. Literals are not
/// evaluated eagerly, the compiler reads them from the lexeme when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    /// Token type
    pub typ: Type,
    /// The string segment in source that represents this token.
    ///
    /// For [`Type::Error`] tokens this is a message describing the problem instead.
    pub lexeme: &'src str,
    /// The line on which this token was found in source.
    pub line: usize,
}

impl<'src> Token<'src> {
    /// A placeholder token that appears before anything is scanned.
    pub fn empty() -> Self {
        Self {
            typ: Type::Eof,
            lexeme: "",
            line: 1,
        }
    }
}

/// Token types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Single character '('
    LParen,
    /// Single character ')'
    RParen,
    /// Single character '{'
    LBrace,
    /// Single character '}'
    RBrace,
    /// Single character ','
    Comma,
    /// Single character '.'
    Dot,
    /// Single character '-'
    Minus,
    /// Single character '+'
    Plus,
    /// Single character ';'
    Semicolon,
    /// Single character '/'
    Slash,
    /// Single character '*'
    Star,
    /// Single character '!'
    Bang,
    /// Double character '!='
    BangEqual,
    /// Single character '='
    Equal,
    /// Double character '=='
    EqualEqual,
    /// Single character '>'
    Greater,
    /// Double character '>='
    GreaterEqual,
    /// Single character '<'
    Less,
    /// Double character '<='
    LessEqual,
    /// Named entity
    Ident,
    /// String literal
    String,
    /// Number literal
    Number,
    /// Keyword 'and'
    And,
    /// Keyword 'class'
    Class,
    /// Keyword 'else'
    Else,
    /// Boolean literal 'false'
    False,
    /// Keyword 'for'
    For,
    /// Keyword 'fun'
    Fun,
    /// Keyword 'if'
    If,
    /// Nothing literal 'nil'
    Nil,
    /// Keyword 'or'
    Or,
    /// Keyword 'print'
    Print,
    /// Keyword 'return'
    Return,
    /// Keyword 'super'
    Super,
    /// Keyword 'this'
    This,
    /// Boolean literal 'true'
    True,
    /// Keyword 'var'
    Var,
    /// Keyword 'while'
    While,
    /// Malformed input
    Error,
    /// End of the source, repeated on every later scan
    Eof,
}
