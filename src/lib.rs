//! An interactive calculator for `+`, `*` and parentheses.
//!
//! A line goes through [`Lexer`] and [`Parser`] into an [`Expr`] tree, which
//! is then rendered in fully parenthesized infix form, dumped as an indented
//! tree and evaluated. [`Repl`] drives that loop over any pair of streams.

pub mod eval;
pub mod lex;
pub mod parse;
pub mod repl;

pub use eval::UnknownOperator;
pub use lex::Lexer;
pub use parse::{Expr, Op, Parser};
pub use repl::{Evaluation, Repl, evaluate_line};
