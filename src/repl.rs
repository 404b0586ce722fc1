use std::io::{self, BufRead, Write};

use miette::{Error, IntoDiagnostic, WrapErr};
use tracing::{debug, error};

use crate::Parser;

pub const PROMPT: &str = ">>> ";

/// Everything a successful line produces, in print order.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub infix: String,
    pub tree: Vec<String>,
    pub value: f64,
}

/// Runs one line through lexer, parser and tree.
pub fn evaluate_line(line: &str) -> Result<Evaluation, Error> {
    let expr = Parser::new(line)?.parse()?;
    Ok(Evaluation {
        infix: expr.render_infix(),
        tree: expr.render_tree(0),
        value: expr.evaluate(),
    })
}

pub struct Repl<R, W, E> {
    input: R,
    out: W,
    err: E,
}

impl Repl<io::StdinLock<'static>, io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Repl::new(io::stdin().lock(), io::stdout(), io::stderr())
    }
}

impl<R: BufRead, W: Write, E: Write> Repl<R, W, E> {
    pub fn new(input: R, out: W, err: E) -> Self {
        Repl { input, out, err }
    }

    /// Prompts and processes lines until the input ends.
    ///
    /// Errors in a line are reported and the loop goes on; only a failed write
    /// to one of the output streams stops it with an error.
    pub fn run(&mut self) -> Result<(), Error> {
        let mut buf = Vec::new();
        loop {
            write!(self.out, "{PROMPT}")
                .and_then(|()| self.out.flush())
                .into_diagnostic()
                .wrap_err("writing prompt failed")?;

            buf.clear();
            match self.input.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    debug!("end of input");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "reading input failed, stopping");
                    return Ok(());
                }
            }

            let line = match std::str::from_utf8(&buf)
                .into_diagnostic()
                .wrap_err("input line is not valid UTF-8")
            {
                Ok(line) => line.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    self.report_error(e)?;
                    continue;
                }
            };
            debug!(line, "processing line");
            match evaluate_line(line) {
                Ok(evaluation) => self.report(&evaluation)?,
                Err(e) => self.report_error(e)?,
            }
        }
    }

    fn report(&mut self, evaluation: &Evaluation) -> Result<(), Error> {
        debug!(value = evaluation.value, "evaluated");
        writeln!(self.out, "Infix notation: {}", evaluation.infix).into_diagnostic()?;
        writeln!(self.out, "Tree structure:").into_diagnostic()?;
        for line in &evaluation.tree {
            writeln!(self.out, "{line}").into_diagnostic()?;
        }
        writeln!(self.out, "Result: {}", evaluation.value)
            .into_diagnostic()
            .wrap_err("writing result failed")
    }

    fn report_error(&mut self, e: Error) -> Result<(), Error> {
        debug!("{e:?}");
        writeln!(self.err, "Error: {e}")
            .into_diagnostic()
            .wrap_err("writing error report failed")
    }
}
