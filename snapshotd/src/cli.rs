use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Blockchain node snapshot lifecycle daemon.
#[derive(Debug, Parser)]
#[command(name = "snapshotd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(long, env = "SNAPSHOTD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a snapshot of a node's data directory
    Create {
        /// Node name from the configuration
        node: String,
    },

    /// Upload an existing snapshot file to object storage
    Upload {
        /// Node name from the configuration
        node: String,
        /// Path to the snapshot file
        file: PathBuf,
    },

    /// Run the periodic snapshot daemon for a node
    Daemon {
        /// Node name from the configuration
        node: String,
        /// Snapshot interval in seconds (overrides config)
        #[arg(long)]
        interval_seconds: Option<u64>,
    },

    /// List configured nodes
    List,
}
