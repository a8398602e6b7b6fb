use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::DEFAULT_QUOTA_CAPACITY;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Layered digest pipeline over integer streams.
#[derive(Clone, Parser)]
#[command(name = "hashloom")]
#[command(about = "Sign integer streams through the layered digest pipeline.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Run the signing pipeline over the given integers and print the final digest.
    Sign {
        /// Integer values to feed the pipeline.
        #[arg(value_name = "VALUE", num_args = 1..)]
        values: Vec<u64>,

        /// Concurrent slow-digest call ceiling shared by the run. Must be at
        /// least 1.
        #[arg(long, short = 'q', default_value_t = DEFAULT_QUOTA_CAPACITY as u64, value_parser = clap::value_parser!(u64).range(1..))]
        quota: u64,

        /// Verbose output.
        #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        verbose: Option<bool>,
    },

    /// Print the directory tree rooted at DIR.
    Tree {
        /// Directory to print. Default: current directory.
        #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
        dir: PathBuf,

        /// Also print files with their sizes; default shows directories only.
        #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        files: Option<bool>,

        /// Verbose output.
        #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
        verbose: Option<bool>,
    },
}
