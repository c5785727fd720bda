use crate::token::{self, Token};

/// Scanner reads characters from the source code and groups them in to
/// a sequence of tokens, one token per call to [`Scanner::scan`].
///
/// Once the source is exhausted every call returns an [`Type::Eof`](crate::Type::Eof) token.
/// Used as an iterator, the scanner stops before the end-of-input token.
#[derive(Debug)]
pub struct Scanner<'src> {
    src: &'src str,
    start: usize,
    current: usize,
    line: usize,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Consume and return the next token from source.
    pub fn scan(&mut self) -> Token<'src> {
        self.skip_whitespace();
        self.start = self.current;
        if self.is_source_end() {
            return self.token(token::Type::Eof);
        }
        match self.advance() {
            b'(' => self.token(token::Type::LParen),
            b')' => self.token(token::Type::RParen),
            b'{' => self.token(token::Type::LBrace),
            b'}' => self.token(token::Type::RBrace),
            b';' => self.token(token::Type::Semicolon),
            b',' => self.token(token::Type::Comma),
            b'.' => self.token(token::Type::Dot),
            b'-' => self.token(token::Type::Minus),
            b'+' => self.token(token::Type::Plus),
            b'/' => self.token(token::Type::Slash),
            b'*' => self.token(token::Type::Star),
            b'!' => self.compound(b'=', token::Type::BangEqual, token::Type::Bang),
            b'=' => self.compound(b'=', token::Type::EqualEqual, token::Type::Equal),
            b'<' => self.compound(b'=', token::Type::LessEqual, token::Type::Less),
            b'>' => self.compound(b'=', token::Type::GreaterEqual, token::Type::Greater),
            b'"' => self.string(),
            c if is_digit(c) => self.number(),
            c if is_alpha(c) => self.identity(),
            c => {
                // Swallow the rest of a multi-byte character so the next lexeme
                // starts on a char boundary.
                if !c.is_ascii() {
                    while !self.src.is_char_boundary(self.current) {
                        self.current += 1;
                    }
                }
                self.error("Unexpected character.")
            }
        }
    }

    fn compound(&mut self, next: u8, matched: token::Type, single: token::Type) -> Token<'src> {
        if self.consume(next) {
            self.token(matched)
        } else {
            self.token(single)
        }
    }

    fn identity(&mut self) -> Token<'src> {
        while is_alpha(self.peek()) || is_digit(self.peek()) {
            self.advance();
        }
        self.token(self.identity_token_type())
    }

    /// Determine if an identifer is a keyword by examining its prefix tree.
    fn identity_token_type(&self) -> token::Type {
        let lexeme = self.lexeme().as_bytes();
        match lexeme[0] {
            b'a' => return self.check_keyword(1, "nd", token::Type::And),
            b'c' => return self.check_keyword(1, "lass", token::Type::Class),
            b'e' => return self.check_keyword(1, "lse", token::Type::Else),
            b'i' => return self.check_keyword(1, "f", token::Type::If),
            b'f' if lexeme.len() > 1 => match lexeme[1] {
                b'a' => return self.check_keyword(2, "lse", token::Type::False),
                b'o' => return self.check_keyword(2, "r", token::Type::For),
                b'u' => return self.check_keyword(2, "n", token::Type::Fun),
                _ => {}
            },
            b'n' => return self.check_keyword(1, "il", token::Type::Nil),
            b'o' => return self.check_keyword(1, "r", token::Type::Or),
            b'p' => return self.check_keyword(1, "rint", token::Type::Print),
            b'r' => return self.check_keyword(1, "eturn", token::Type::Return),
            b's' => return self.check_keyword(1, "uper", token::Type::Super),
            b't' if lexeme.len() > 1 => match lexeme[1] {
                b'h' => return self.check_keyword(2, "is", token::Type::This),
                b'r' => return self.check_keyword(2, "ue", token::Type::True),
                _ => {}
            },
            b'v' => return self.check_keyword(1, "ar", token::Type::Var),
            b'w' => return self.check_keyword(1, "hile", token::Type::While),
            _ => {}
        }
        token::Type::Ident
    }

    fn check_keyword(&self, start: usize, rest: &str, typ: token::Type) -> token::Type {
        if &self.lexeme()[start..] == rest {
            return typ;
        }
        token::Type::Ident
    }

    fn number(&mut self) -> Token<'src> {
        while is_digit(self.peek()) {
            self.advance();
        }
        if self.peek() == b'.' && is_digit(self.peek_next()) {
            self.advance();
            while is_digit(self.peek()) {
                self.advance();
            }
        }
        self.token(token::Type::Number)
    }

    fn string(&mut self) -> Token<'src> {
        while self.peek() != b'"' && !self.is_source_end() {
            self.advance();
        }
        if self.is_source_end() {
            return self.error("Unterminated string.");
        }
        self.advance();
        self.token(token::Type::String)
    }

    fn lexeme(&self) -> &'src str {
        &self.src[self.start..self.current]
    }

    fn token(&self, typ: token::Type) -> Token<'src> {
        Token {
            typ,
            lexeme: self.lexeme(),
            line: self.line,
        }
    }

    fn error(&self, message: &'static str) -> Token<'src> {
        Token {
            typ: token::Type::Error,
            lexeme: message,
            line: self.line,
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                b' ' | b'\r' | b'\t' | b'\n' => {
                    self.advance();
                }
                b'/' => {
                    if self.peek_next() == b'/' {
                        while self.peek() != b'\n' && !self.is_source_end() {
                            self.advance();
                        }
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn peek(&self) -> u8 {
        self.src.as_bytes().get(self.current).copied().unwrap_or(b'\0')
    }

    fn peek_next(&self) -> u8 {
        self.src
            .as_bytes()
            .get(self.current + 1)
            .copied()
            .unwrap_or(b'\0')
    }

    fn advance(&mut self) -> u8 {
        let c = self.peek();
        if c == b'\n' {
            self.line += 1;
        }
        self.current += 1;
        c
    }

    fn consume(&mut self, expected: u8) -> bool {
        if self.is_source_end() || self.peek() != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn is_source_end(&self) -> bool {
        self.current >= self.src.len()
    }
}

fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Type;

    fn tokens(src: &str) -> Vec<Token<'_>> {
        let mut scanner = Scanner::new(src);
        let mut tokens = Vec::new();
        loop {
            let token = scanner.scan();
            if token.typ == Type::Eof {
                return tokens;
            }
            tokens.push(token);
        }
    }

    fn types(src: &str) -> Vec<Type> {
        tokens(src).iter().map(|t| t.typ).collect()
    }

    #[test]
    fn punctuation_and_compound_operators() {
        assert_eq!(
            types("(){};,.-+/*! != = == < <= > >="),
            vec![
                Type::LParen,
                Type::RParen,
                Type::LBrace,
                Type::RBrace,
                Type::Semicolon,
                Type::Comma,
                Type::Dot,
                Type::Minus,
                Type::Plus,
                Type::Slash,
                Type::Star,
                Type::Bang,
                Type::BangEqual,
                Type::Equal,
                Type::EqualEqual,
                Type::Less,
                Type::LessEqual,
                Type::Greater,
                Type::GreaterEqual,
            ]
        );
    }

    #[test]
    fn numbers_borrow_their_lexeme() {
        let tokens = tokens("12 3.25 4.");
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme).collect();
        assert_eq!(lexemes, vec!["12", "3.25", "4", "."]);
        assert_eq!(tokens[2].typ, Type::Number);
        assert_eq!(tokens[3].typ, Type::Dot);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            types("and class else false for fun if nil or print return super this true var while"),
            vec![
                Type::And,
                Type::Class,
                Type::Else,
                Type::False,
                Type::For,
                Type::Fun,
                Type::If,
                Type::Nil,
                Type::Or,
                Type::Print,
                Type::Return,
                Type::Super,
                Type::This,
                Type::True,
                Type::Var,
                Type::While,
            ]
        );
        assert_eq!(types("an classy f t fortune this_ _x"), vec![Type::Ident; 7]);
    }

    #[test]
    fn comments_and_lines() {
        let tokens = tokens("1 // one\n+\n\n2");
        let lines: Vec<_> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn end_of_input_repeats() {
        let mut s = Scanner::new("  ");
        assert_eq!(s.scan().typ, Type::Eof);
        assert_eq!(s.scan().typ, Type::Eof);
    }

    #[test]
    fn malformed_input_yields_error_tokens() {
        let mut s = Scanner::new("\"abc\n");
        let token = s.scan();
        assert_eq!(token.typ, Type::Error);
        assert_eq!(token.lexeme, "Unterminated string.");
        assert_eq!(token.line, 2);

        let mut s = Scanner::new("1 @ 2");
        s.scan();
        let token = s.scan();
        assert_eq!(token.typ, Type::Error);
        assert_eq!(token.lexeme, "Unexpected character.");
        assert_eq!(s.scan().lexeme, "2");
    }

    #[test]
    fn non_ascii_character() {
        let tokens = tokens("é1");
        assert_eq!(tokens[0].typ, Type::Error);
        assert_eq!(tokens[1].lexeme, "1");
    }

    #[test]
    fn strings_keep_quotes() {
        let tokens = tokens("\"hi\"");
        assert_eq!(tokens[0].typ, Type::String);
        assert_eq!(tokens[0].lexeme, "\"hi\"");
    }
}
