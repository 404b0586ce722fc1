use miette::Diagnostic;
use thiserror::Error;

use crate::{
    lex::TokenKind,
    parse::{Expr, Op},
};

#[derive(Error, Debug, Diagnostic)]
#[error("unknown operator {token:?}")]
#[diagnostic(help("only `+` and `*` can join two operands"))]
pub struct UnknownOperator {
    pub token: TokenKind,
}

impl TryFrom<TokenKind> for Op {
    type Error = UnknownOperator;

    fn try_from(token: TokenKind) -> Result<Self, Self::Error> {
        match token {
            TokenKind::Plus => Ok(Op::Add),
            TokenKind::Star => Ok(Op::Mul),
            token => Err(UnknownOperator { token }),
        }
    }
}

impl Op {
    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Op::Add => lhs + rhs,
            Op::Mul => lhs * rhs,
        }
    }
}

impl Expr {
    /// Builds a binary node, rejecting any token that is not an operator.
    pub fn binary(token: TokenKind, left: Expr, right: Expr) -> Result<Expr, UnknownOperator> {
        Ok(Expr::Binary {
            op: Op::try_from(token)?,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn evaluate(&self) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Binary { op, left, right } => op.apply(left.evaluate(), right.evaluate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    fn eval(input: &str) -> f64 {
        Parser::new(input).unwrap().parse().unwrap().evaluate()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("2 * 3 + 4"), 10.0);
    }

    #[test]
    fn test_chains() {
        assert_eq!(eval("8+3+1"), 12.0);
        assert_eq!(eval("2*3*4"), 24.0);
        assert_eq!(eval("1 + 2 * 3 + 4 * (5 + 6)"), 51.0);
    }

    #[test]
    fn test_decimals() {
        assert_eq!(eval("0.5 * 4"), 2.0);
        assert_eq!(eval("1.25 + 1.25"), 2.5);
    }

    #[test]
    fn test_binary_rejects_non_operators() {
        let err = Expr::binary(TokenKind::LeftParen, Expr::Number(1.0), Expr::Number(2.0))
            .unwrap_err();
        assert_eq!(err.token, TokenKind::LeftParen);
        assert!(err.to_string().starts_with("unknown operator"));
    }

    #[test]
    fn test_binary_accepts_operators() {
        let sum = Expr::binary(TokenKind::Plus, Expr::Number(1.0), Expr::Number(2.0)).unwrap();
        assert_eq!(sum.evaluate(), 3.0);
        let product = Expr::binary(TokenKind::Star, sum, Expr::Number(4.0)).unwrap();
        assert_eq!(product.evaluate(), 12.0);
    }
}
