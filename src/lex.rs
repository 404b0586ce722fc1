use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[error("invalid character '{token}' in input")]
#[diagnostic(help("only digits, `.`, `+`, `*`, `(`, `)` and whitespace are allowed"))]
pub struct SingleTokenError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
}

impl SingleTokenError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Error, Debug, Diagnostic)]
#[error("malformed number literal '{literal}'")]
#[diagnostic(help("a number may contain at most one decimal point"))]
pub struct NumberLiteralError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this numeric literal")]
    bad_bit: SourceSpan,

    pub literal: String,
}

impl NumberLiteralError {
    pub fn offset(&self) -> usize {
        self.bad_bit.offset()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub literal: &'de str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Plus,
    Star,
    LeftParen,
    RightParen,
    Eof,
}

impl TokenKind {
    /// How the kind reads in a diagnostic, e.g. "expected `)`".
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Number(_) => "a number",
            TokenKind::Plus => "`+`",
            TokenKind::Star => "`*`",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::Eof => "end of input",
        }
    }

    pub fn same_kind(&self, other: &TokenKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl Token<'_> {
    /// The token as it appears in an error message.
    pub fn found(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", self.literal),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.literal;
        match self.kind {
            TokenKind::Number(n) => write!(f, "NUMBER {lit} {n}"),
            TokenKind::Plus => write!(f, "PLUS {lit} null"),
            TokenKind::Star => write!(f, "STAR {lit} null"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN {lit} null"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN {lit} null"),
            TokenKind::Eof => write!(f, "EOF  null"),
        }
    }
}

pub struct Lexer<'de> {
    whole: &'de str,
    rest: &'de str,
    byte: usize,
}

impl<'de> Lexer<'de> {
    pub fn new(input: &'de str) -> Self {
        Lexer {
            whole: input,
            rest: input,
            byte: 0,
        }
    }

    pub fn source(&self) -> &'de str {
        self.whole
    }

    pub fn position(&self) -> usize {
        self.byte
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new("<input>", self.whole.to_string())
    }

    /// Scans the next token. Once the input is exhausted every call returns `Eof`.
    pub fn next_token(&mut self) -> Result<Token<'de>, Error> {
        let trimmed = self.rest.trim_start();
        self.byte += self.rest.len() - trimmed.len();
        self.rest = trimmed;

        let mut chars = self.rest.chars();
        let Some(c) = chars.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                literal: "",
            });
        };
        let literal = &self.rest[..c.len_utf8()];

        let kind = match c {
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '0'..='9' => return self.number(),
            c => {
                // the cursor stays in front of the bad character
                return Err(SingleTokenError {
                    src: self.named_source(),
                    bad_bit: SourceSpan::from(self.byte..self.byte + c.len_utf8()),
                    token: c,
                }
                .into());
            }
        };

        self.rest = chars.as_str();
        self.byte += c.len_utf8();
        Ok(Token { kind, literal })
    }

    fn number(&mut self) -> Result<Token<'de>, Error> {
        let end = self
            .rest
            .find(|c| !matches!(c, '0'..='9' | '.'))
            .unwrap_or(self.rest.len());
        let literal = &self.rest[..end];

        let malformed = || NumberLiteralError {
            src: self.named_source(),
            bad_bit: SourceSpan::from(self.byte..self.byte + literal.len()),
            literal: literal.to_string(),
        };

        if literal.matches('.').count() > 1 {
            return Err(malformed().into());
        }
        let n: f64 = literal.parse().map_err(|_| malformed())?;

        self.rest = &self.rest[end..];
        self.byte += end;
        Ok(Token {
            kind: TokenKind::Number(n),
            literal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("(1 + 2.5) * 30"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.5),
                TokenKind::RightParen,
                TokenKind::Star,
                TokenKind::Number(30.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_no_whitespace_needed() {
        assert_eq!(
            kinds("2+3*4"),
            vec![
                TokenKind::Number(2.0),
                TokenKind::Plus,
                TokenKind::Number(3.0),
                TokenKind::Star,
                TokenKind::Number(4.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds(" \t \r\n"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("7 ");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Number(7.0));
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
            assert_eq!(lexer.position(), 2);
        }
    }

    #[test]
    fn test_literal_slices() {
        let mut lexer = Lexer::new("  12.75*");
        let number = lexer.next_token().unwrap();
        assert_eq!(number.literal, "12.75");
        assert_eq!(lexer.position(), 7);
        assert_eq!(lexer.next_token().unwrap().literal, "*");
    }

    #[test]
    fn test_trailing_dot() {
        assert_eq!(kinds("3."), vec![TokenKind::Number(3.0), TokenKind::Eof]);
    }

    #[test]
    fn test_invalid_character() {
        let mut lexer = Lexer::new("1+@");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();

        let err = lexer.next_token().unwrap_err();
        let err = err.downcast_ref::<SingleTokenError>().unwrap();
        assert_eq!(err.token, '@');
        assert_eq!(err.offset(), 2);
        assert_eq!(lexer.position(), 2);

        // the bad character is not skipped on a retry either
        assert!(lexer.next_token().is_err());
        assert_eq!(lexer.position(), 2);
    }

    #[test]
    fn test_multibyte_invalid_character() {
        let mut lexer = Lexer::new("ü");
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.downcast_ref::<SingleTokenError>().unwrap().token, 'ü');
    }

    #[test]
    fn test_multiple_decimal_points() {
        let mut lexer = Lexer::new("1.2.3 + 4");
        let err = lexer.next_token().unwrap_err();
        let err = err.downcast_ref::<NumberLiteralError>().unwrap();
        assert_eq!(err.literal, "1.2.3");
        assert_eq!(err.offset(), 0);
        assert_eq!(lexer.position(), 0);
    }

    #[test]
    fn test_display() {
        let mut lexer = Lexer::new("1.5+");
        assert_eq!(lexer.next_token().unwrap().to_string(), "NUMBER 1.5 1.5");
        assert_eq!(lexer.next_token().unwrap().to_string(), "PLUS + null");
        assert_eq!(lexer.next_token().unwrap().to_string(), "EOF  null");
    }
}
