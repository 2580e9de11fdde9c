use std::fmt;
use thiserror::Error;

/// A single lexeme. `source` is the slice of the input that produced it and
/// `line` the 1-based line its first character was read on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'s> {
    pub kind: TokenKind,
    pub line: u32,
    pub source: &'s str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Exit,
    Let,
    If,
    Elif,
    Else,
    While,
    Ident,
    IntLit,
    Semi,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Eq,
    Plus,
    Minus,
    Star,
    Slash,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    EqEq,
    NotEq,
    PlusPlus,
    MinusMinus,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Exit => "'exit'",
            Self::Let => "'let'",
            Self::If => "'if'",
            Self::Elif => "'elif'",
            Self::Else => "'else'",
            Self::While => "'while'",
            Self::Ident => "identifier",
            Self::IntLit => "integer literal",
            Self::Semi => "';'",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::OpenBrace => "'{'",
            Self::CloseBrace => "'}'",
            Self::Eq => "'='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Greater => "'>'",
            Self::Less => "'<'",
            Self::GreaterEq => "'>='",
            Self::LessEq => "'<='",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::PlusPlus => "'++'",
            Self::MinusMinus => "'--'",
            Self::PlusEq => "'+='",
            Self::MinusEq => "'-='",
            Self::StarEq => "'*='",
            Self::SlashEq => "'/='",
        })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexError {
    #[error("Invalid token")]
    InvalidToken { line: u32 },
    #[error("Unterminated block comment")]
    UnterminatedComment { line: u32 },
}

/// Hand-rolled scanner with a single character of lookahead. The language is
/// ASCII-only, so it walks the raw bytes.
pub struct Lexer<'s> {
    source: &'s str,
    pos: usize,
    line: u32,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token<'s>>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token<'s>>, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let line = self.line;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(None),
        };
        let kind = if ch.is_ascii_alphabetic() {
            self.word()
        } else if ch.is_ascii_digit() {
            self.number()
        } else {
            self.operator(ch)?
        };
        Ok(Some(Token {
            kind,
            line,
            source: &self.source[start..self.pos],
        }))
    }

    /// An alphabetic run followed by alphanumerics: either a keyword or an
    /// identifier. Underscores are not part of the language.
    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        self.bump();
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric()) {
            self.bump();
        }
        match &self.source[start..self.pos] {
            "exit" => TokenKind::Exit,
            "let" => TokenKind::Let,
            "if" => TokenKind::If,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            _ => TokenKind::Ident,
        }
    }

    fn number(&mut self) -> TokenKind {
        self.bump();
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.bump();
        }
        TokenKind::IntLit
    }

    /// Punctuation and operators. Two-character lexemes win over the
    /// one-character lexemes they start with.
    fn operator(&mut self, ch: u8) -> Result<TokenKind, LexError> {
        self.bump();
        Ok(match ch {
            b';' => TokenKind::Semi,
            b'(' => TokenKind::OpenParen,
            b')' => TokenKind::CloseParen,
            b'{' => TokenKind::OpenBrace,
            b'}' => TokenKind::CloseBrace,
            b'=' => {
                if self.eat(b'=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            b'+' => {
                if self.eat(b'+') {
                    TokenKind::PlusPlus
                } else if self.eat(b'=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            b'-' => {
                if self.eat(b'-') {
                    TokenKind::MinusMinus
                } else if self.eat(b'=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            b'*' => {
                if self.eat(b'=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            // comments were consumed as trivia, so a slash here is always an
            // operator
            b'/' => {
                if self.eat(b'=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            b'>' => {
                if self.eat(b'=') {
                    TokenKind::GreaterEq
                } else {
                    TokenKind::Greater
                }
            }
            b'<' => {
                if self.eat(b'=') {
                    TokenKind::LessEq
                } else {
                    TokenKind::Less
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    TokenKind::NotEq
                } else {
                    return Err(LexError::InvalidToken { line: self.line });
                }
            }
            _ => return Err(LexError::InvalidToken { line: self.line }),
        })
    }

    /// Skips whitespace and both comment forms, keeping the line count in
    /// step. Block comments must be closed before the input ends.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(b'\n') => {
                    self.line += 1;
                    self.bump();
                }
                Some(ch) if ch.is_ascii_whitespace() => self.bump(),
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let line = self.line;
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => return Err(LexError::UnterminatedComment { line }),
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(b'\n') => {
                                self.line += 1;
                                self.bump();
                            }
                            Some(_) => self.bump(),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.bump();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .expect("expected no failure")
            .into_iter()
            .map(|tok| tok.kind)
            .collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("exit let if elif else while exits lets"),
            [Exit, Let, If, Elif, Else, While, Ident, Ident]
        );
    }

    #[test]
    fn longest_match_wins() {
        use TokenKind::*;
        assert_eq!(kinds("= == >= > <= < != ++ + += -- - -="), [
            Eq, EqEq, GreaterEq, Greater, LessEq, Less, NotEq, PlusPlus, Plus, PlusEq,
            MinusMinus, Minus, MinusEq,
        ]);
        assert_eq!(kinds("*= * /= /"), [StarEq, Star, SlashEq, Slash]);
        // adjacent pairs still obey one-character lookahead
        assert_eq!(kinds("+ +"), [Plus, Plus]);
    }

    #[test]
    fn token_carries_spelling() {
        let tokens = Lexer::new("let answer = 42;").tokenize().unwrap();
        let spelled: Vec<_> = tokens.iter().map(|tok| tok.source).collect();
        assert_eq!(spelled, ["let", "answer", "=", "42", ";"]);
    }

    #[test]
    fn lines_are_tracked() {
        let tokens = Lexer::new("let x = 1;\nlet y = 2;\n\nexit(x);")
            .tokenize()
            .unwrap();
        let lines: Vec<_> = tokens.iter().map(|tok| tok.line).collect();
        assert_eq!(lines, [1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 4, 4, 4, 4, 4]);
        // monotonically non-decreasing by construction
        assert!(lines.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn line_comments() {
        use TokenKind::*;
        let tokens = Lexer::new("// leading\nexit(0); // trailing\n").tokenize().unwrap();
        assert_eq!(
            tokens.iter().map(|tok| tok.kind).collect::<Vec<_>>(),
            [Exit, OpenParen, IntLit, CloseParen, Semi]
        );
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn block_comments() {
        use TokenKind::*;
        let tokens = Lexer::new("exit/* inline */(/* multi\nline */0);")
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens.iter().map(|tok| tok.kind).collect::<Vec<_>>(),
            [Exit, OpenParen, IntLit, CloseParen, Semi]
        );
        // the literal sits after the newline inside the comment
        assert_eq!(tokens[2].line, 2);
    }

    #[test]
    fn unterminated_block_comment() {
        let err = Lexer::new("exit(0); /* no end").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedComment { line: 1 });
        assert_eq!(err.to_string(), "Unterminated block comment");
    }

    #[test]
    fn invalid_characters() {
        let err = Lexer::new("@").tokenize().unwrap_err();
        assert_eq!(err, LexError::InvalidToken { line: 1 });
        assert_eq!(err.to_string(), "Invalid token");
        // underscores do not start identifiers
        assert!(Lexer::new("_x").tokenize().is_err());
        // a bare bang is not an operator
        assert!(Lexer::new("!").tokenize().is_err());
    }
}
