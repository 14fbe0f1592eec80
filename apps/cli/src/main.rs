//! profilegen CLI — context assembly for job-profile generation.
//!
//! Fronts the core engine: assemble generation context, search the
//! organization index, inspect metric resolution, and validate the
//! loaded data set.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
