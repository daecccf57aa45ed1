//! Command-line surface for the agent binary (§6).

use clap::Parser;

use bt_types::SnifferMode;

#[derive(Debug, Parser)]
#[command(name = "bt-agent", about = "Edge Bluetooth telemetry collector")]
pub struct Args {
    /// One or more sniffer modes to run: btbr, btle, btle-adv.
    #[arg(required = true)]
    pub modes: Vec<String>,

    /// Path to network.conf.
    #[arg(long, default_value = "network.conf")]
    pub config: std::path::PathBuf,

    /// Directory the capture pipes are created under.
    #[arg(long, default_value = "pipes")]
    pub pipes_dir: std::path::PathBuf,
}

impl Args {
    /// Parse and validate `modes` into `SnifferMode`s, or an `InvariantError`-flavored
    /// message for an unrecognized one (§6: "unknown mode" is a non-zero exit).
    pub fn parsed_modes(&self) -> Result<Vec<SnifferMode>, String> {
        self.modes.iter().map(|m| m.parse::<SnifferMode>()).collect()
    }
}
