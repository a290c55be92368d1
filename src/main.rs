//! CLI entry point for the IFS fractal generator

use clap::Parser;
use ifsforge::io::cli::{Cli, Runner};
use ifsforge::io::logging;

fn main() -> ifsforge::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);
    let mut runner = Runner::new(cli);
    runner.run()
}
