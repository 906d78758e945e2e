// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "scanfeast")]
#[command(about = "Scan a product barcode and look up its nutrition data")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/scanfeast/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a product code in the catalog
    Lookup {
        /// Barcode value, e.g. 3017620422003
        code: String,

        /// Print the product view as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the codes found in image files
    Decode {
        /// Image files, one frame each
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Scan image files as a camera feed and show the first product found
    Scan {
        /// Image files, one frame each
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Grant camera access without asking
        #[arg(short, long)]
        yes: bool,

        /// Use the front camera
        #[arg(long)]
        front: bool,

        /// Print the product view as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=scanfeast=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.config.as_deref() {
        Some(path) => scanfeast::Config::load_from(path)?,
        None => scanfeast::Config::load()?,
    };

    match cli.command {
        Commands::Lookup { code, json } => cli::lookup(&config, &code, json).await,
        Commands::Decode { images } => cli::decode(&config, images).await,
        Commands::Scan {
            images,
            yes,
            front,
            json,
        } => cli::scan(&config, images, yes, front, json).await,
    }
}
