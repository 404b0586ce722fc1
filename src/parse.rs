use std::fmt::Display;

use miette::{Diagnostic, Error, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::trace;

use crate::{
    Lexer,
    lex::{Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
#[error("unexpected token: found {found}, expected {expected}")]
#[diagnostic(help("insert or replace with {expected}"))]
pub struct UnexpectedToken {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    bad_bit: SourceSpan,

    pub found: String,
    pub expected: &'static str,
}

#[derive(Error, Debug, Diagnostic)]
#[error("expected number or parenthesis, found {found}")]
#[diagnostic(help("an operand is either a number or a parenthesized expression"))]
pub struct ExpectedOperand {
    #[source_code]
    src: NamedSource<String>,

    #[label("operand missing here")]
    bad_bit: SourceSpan,

    pub found: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Mul,
}

impl Op {
    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Mul => "*",
        }
    }
}

/// Expression tree. Every binary node owns both of its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Binary {
        op: Op,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn render_infix(&self) -> String {
        self.to_string()
    }

    /// Pre-order dump, one node per line, two spaces per level.
    pub fn render_tree(&self, indent: usize) -> Vec<String> {
        let mut lines = Vec::new();
        self.collect_tree(indent, &mut lines);
        lines
    }

    fn collect_tree(&self, indent: usize, lines: &mut Vec<String>) {
        let pad = "  ".repeat(indent);
        match self {
            Expr::Number(n) => lines.push(format!("{pad}Number({n})")),
            Expr::Binary { op, left, right } => {
                lines.push(format!("{pad}BinaryOp({})", op.symbol()));
                left.collect_tree(indent + 1, lines);
                right.collect_tree(indent + 1, lines);
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Expr::Number(_) => 1,
            Expr::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
        }
    }
}

/// Deepest tree, and deepest parenthesis nesting, a line may produce.
pub const MAX_DEPTH: usize = 256;

#[derive(Error, Debug, Diagnostic)]
#[error("expression nests deeper than {limit} levels")]
#[diagnostic(help("split the expression into smaller lines or drop redundant parentheses"))]
pub struct NestingTooDeep {
    #[source_code]
    src: NamedSource<String>,

    #[label("limit reached here")]
    bad_bit: SourceSpan,

    pub limit: usize,
}

/// A parsed subtree and its depth.
type Parsed = (Expr, usize);

pub struct Parser<'de> {
    lexer: Lexer<'de>,
    current: Token<'de>,
    nesting: usize,
}

impl<'de> Parser<'de> {
    pub fn new(whole: &'de str) -> Result<Self, Error> {
        let mut lexer = Lexer::new(whole);
        let current = lexer.next_token()?;
        trace!(token = %current, "lookahead");
        Ok(Parser {
            lexer,
            current,
            nesting: 0,
        })
    }

    /// Parses one expression spanning the whole input.
    pub fn parse(mut self) -> Result<Expr, Error> {
        let (expr, _) = self.expr()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected(TokenKind::Eof));
        }
        Ok(expr)
    }

    fn expr(&mut self) -> Result<Parsed, Error> {
        let mut lhs = self.term()?;
        while self.current.kind == TokenKind::Plus {
            let span = self.current_span();
            let op = self.consume(TokenKind::Plus)?;
            let rhs = self.term()?;
            lhs = self.join(op, lhs, rhs, span)?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Parsed, Error> {
        let mut lhs = self.factor()?;
        while self.current.kind == TokenKind::Star {
            let span = self.current_span();
            let op = self.consume(TokenKind::Star)?;
            let rhs = self.factor()?;
            lhs = self.join(op, lhs, rhs, span)?;
        }
        Ok(lhs)
    }

    fn factor(&mut self) -> Result<Parsed, Error> {
        match self.current.kind {
            TokenKind::Number(n) => {
                self.advance()?;
                Ok((Expr::Number(n), 1))
            }
            TokenKind::LeftParen => {
                if self.nesting >= MAX_DEPTH {
                    return Err(self.too_deep(self.current_span()));
                }
                self.nesting += 1;
                self.consume(TokenKind::LeftParen)?;
                let inner = self.expr()?;
                self.consume(TokenKind::RightParen)?;
                self.nesting -= 1;
                Ok(inner)
            }
            _ => Err(ExpectedOperand {
                src: self.named_source(),
                bad_bit: self.current_span(),
                found: self.current.found(),
            }
            .into()),
        }
    }

    // each operator adds a level on top of the deeper operand
    fn join(
        &self,
        op: Token<'de>,
        (left, left_depth): Parsed,
        (right, right_depth): Parsed,
        span: SourceSpan,
    ) -> Result<Parsed, Error> {
        let depth = 1 + left_depth.max(right_depth);
        if depth > MAX_DEPTH {
            return Err(self.too_deep(span));
        }
        Ok((Expr::binary(op.kind, left, right)?, depth))
    }

    fn too_deep(&self, span: SourceSpan) -> Error {
        NestingTooDeep {
            src: self.named_source(),
            bad_bit: span,
            limit: MAX_DEPTH,
        }
        .into()
    }

    /// Takes the lookahead if it has the expected kind and pulls the next one.
    fn consume(&mut self, expected: TokenKind) -> Result<Token<'de>, Error> {
        if !self.current.kind.same_kind(&expected) {
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn advance(&mut self) -> Result<Token<'de>, Error> {
        let next = self.lexer.next_token()?;
        trace!(token = %next, "lookahead");
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn unexpected(&self, expected: TokenKind) -> Error {
        UnexpectedToken {
            src: self.named_source(),
            bad_bit: self.current_span(),
            found: self.current.found(),
            expected: expected.describe(),
        }
        .into()
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new("<input>", self.lexer.source().to_string())
    }

    // the lexer has already moved past the lookahead
    fn current_span(&self) -> SourceSpan {
        let end = self.lexer.position();
        SourceSpan::from(end - self.current.literal.len()..end)
    }
}
