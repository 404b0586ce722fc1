use clap::Parser;
use infix_calc::Repl;
use tracing_subscriber::EnvFilter;

/// Reads arithmetic expressions from stdin and prints their infix form, tree
/// and value. Supports numbers, `+`, `*` and parentheses.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {}

fn main() -> miette::Result<()> {
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    Repl::stdio().run()
}
