use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Solves a batch of random cutting-stock instances by column generation.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Seed of the generator that draws one seed per instance
    #[arg(short, long, default_value_t = 54321)]
    pub seed: u64,
    /// Number of instances to solve
    #[arg(short = 'n', long, default_value_t = 100)]
    pub count: usize,
    /// Number of distinct item sizes per instance
    #[arg(long, default_value_t = 50)]
    pub sizes: usize,
    /// Largest gap between two consecutive item sizes
    #[arg(long, default_value_t = 13)]
    pub max_step: u32,
    /// Largest demand of a single size
    #[arg(long, default_value_t = 20)]
    pub max_amount: u32,
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}
