use std::path::PathBuf;

use clap::Parser;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5555";

/// Wishlist service: keeps a card wishlist in a flat file and answers JSON
/// requests, one per line.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "wishlist-core", version)]
pub struct Config {
    /// Wishlist file (created with a header row if missing)
    #[arg(short, long, env = "WISHLIST_FILE", default_value = "wishlist.csv")]
    pub file: PathBuf,

    /// Serve TCP on this address instead of stdin/stdout (bare flag: 127.0.0.1:5555)
    #[arg(
        short,
        long,
        env = "WISHLIST_LISTEN",
        num_args = 0..=1,
        default_missing_value = DEFAULT_LISTEN
    )]
    pub listen: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
