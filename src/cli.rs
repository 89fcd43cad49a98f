use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "discfinder")]
#[command(author, version, about = "Resolve DVD and Blu-ray barcodes to movie metadata")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP lookup server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Resolve a single barcode and print the result
    Lookup {
        /// UPC / EAN barcode
        #[arg(required = true)]
        barcode: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Print the lookup trace after the result
        #[arg(long)]
        trace: bool,
    },

    /// Show the search queries generated from a product title
    Candidates {
        /// Raw product title
        #[arg(required = true)]
        title: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
