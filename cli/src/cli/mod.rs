mod daemon;
mod tab;

pub use daemon::DaemonCommands;
pub use tab::TabCommands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show water and energy used so far (default)
    #[command(alias = "s")]
    Summary,

    /// Write all usage data to a JSON file
    Export {
        /// Output file (default: water-usage-<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clear all recorded usage
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Charge usage to a domain directly, outside any tab
    Record {
        /// Domain or hostname
        domain: String,

        /// Amount in the domain's unit (minutes for streaming sites)
        #[arg(short, long, default_value_t = 1.0)]
        duration: f64,
    },

    /// Forward a browser tab event to the daemon
    Tab {
        #[command(subcommand)]
        command: TabCommands,
    },

    /// Show the rate a URL or hostname is charged at
    Classify {
        /// URL or hostname
        target: String,
    },

    Config {
        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,

        #[arg(short, long)]
        edit: bool,
    },

    Daemon {
        #[command(subcommand)]
        command: DaemonCommands,
    },

    Logs {
        #[arg(short, long, default_value_t = 50)]
        lines: usize,

        #[arg(short, long)]
        follow: bool,
    },
}

/// droplet - estimate the energy and water cost of your browsing
#[derive(Debug, Parser)]
#[command(name = "droplet", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}
