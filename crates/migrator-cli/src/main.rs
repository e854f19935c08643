mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod package;

use anyhow::Result;

fn main() -> Result<()> {
    cli::run()
}
