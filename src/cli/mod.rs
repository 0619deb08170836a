//! CLI interface for Sirenbox

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Keyboard control surface for a dub siren and delay rig, speaking OSC
#[derive(Parser)]
#[command(name = "sirenbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the terminal control surface
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "sirenbox.yaml")]
        config: PathBuf,

        /// Log outbound messages instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Write logs to this file (the terminal belongs to the UI)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Read control commands from stdin, one per line
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "sirenbox.yaml")]
        config: PathBuf,

        /// Log outbound messages instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Seconds to keep ticking after input ends
        #[arg(long, default_value = "1.0", value_parser = parse_seconds)]
        linger: Duration,
    },

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "sirenbox.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,

    /// Print the effective configuration as YAML
    Dump {
        /// Configuration file path
        #[arg(short, long, default_value = "sirenbox.yaml")]
        config: PathBuf,
    },
}

/// Parse a non-negative number of seconds
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{}' is not a usable number of seconds", s))
}
