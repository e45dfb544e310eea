//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio portfolio server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the portfolio over HTTP
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Export the page, the resume preview, and the resume PDF to a directory
    Build {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out: PathBuf,
    },
}
