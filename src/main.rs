//! Hashloom CLI: sign integer streams through the layered digest pipeline,
//! or print a directory tree.

use anyhow::Result;
use clap::Parser;
use hashloom::cli::Cli;
use hashloom::handlers::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
