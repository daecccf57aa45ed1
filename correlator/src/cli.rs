//! Command-line surface for the correlator binary (§6).

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "bt-correlator", about = "Offline Bluetooth fingerprint correlator")]
pub struct Args {
    /// SQLite database populated by the agent's HTTP endpoints.
    #[arg(default_value = "bluetooth.db")]
    pub db_file: PathBuf,

    /// Process every MAC address in the database instead of a chosen set.
    #[arg(short = 'a', long = "all", conflicts_with = "mac")]
    pub all: bool,

    /// One or more MAC addresses to correlate.
    #[arg(short = 'm', long = "mac", num_args = 1..)]
    pub mac: Vec<String>,

    /// Print which of the given MACs' fingerprints look like the same device.
    #[arg(short = 'c', long = "correlation", requires = "mac")]
    pub correlation: bool,

    /// Print the resolved antenna-hop path for each chosen MAC.
    #[arg(short = 'p', long = "path", requires = "mac")]
    pub path: bool,

    /// Print a static map image URL for each chosen MAC's path.
    #[arg(short = 'i', long = "image", requires = "mac")]
    pub image: bool,
}
