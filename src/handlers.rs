//! Command handlers for the sign and tree operations.

use anyhow::Result;
use log::debug;
use std::io::Write;
use std::path::Path;

use crate::cli::{Cli, Commands};
use crate::tree::dir_tree;
use crate::types::{LoomOpts, Opts};
use crate::utils::setup_logging;

/// Dispatch the parsed CLI to its handler.
pub fn handle_run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Sign {
            values,
            quota,
            verbose,
        } => handle_sign(values, *quota as usize, verbose.unwrap_or(false)),
        Commands::Tree {
            dir,
            files,
            verbose,
        } => handle_tree(dir, files.unwrap_or(false), verbose.unwrap_or(false)),
    }
}

/// Run the signing pipeline over `values` and print the final combined digest.
pub fn handle_sign(values: &[u64], quota: usize, verbose: bool) -> Result<()> {
    setup_logging(verbose);
    let opts = Opts {
        quota_capacity: quota,
        verbose,
    };
    debug!(
        "signing {} values, quota capacity {}",
        values.len(),
        opts.quota_capacity
    );
    let combined = crate::sign_values(values, &LoomOpts::from(&opts))?;
    println!("{combined}");
    Ok(())
}

/// Print the directory tree rooted at `dir` to stdout.
pub fn handle_tree(dir: &Path, files: bool, verbose: bool) -> Result<()> {
    setup_logging(verbose);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dir_tree(&mut out, dir, files)?;
    out.flush()?;
    Ok(())
}
