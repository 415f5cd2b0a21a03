//! Command-line entry point for preparing the Learn OpenUSD workshop tree.

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
