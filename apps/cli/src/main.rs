//! SchoolPrompt CLI: builds AI research prompts for verifying overseas high
//! schools against university admission eligibility standards.

mod clipboard;
mod commands;
mod warnings;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
