//! right_st: manage RightScripts and their attachments from local files.
//!
//! # Usage
//!
//! ```text
//! right_st rightscript list <filter>
//! right_st rightscript show <name_or_href>
//! right_st rightscript upload <path>... [--force] [--dry-run]
//! right_st rightscript download <name_or_href> [path]
//! right_st rightscript scaffold <path>...
//! right_st rightscript validate <path>...
//! ```
//!
//! Global flags: `--config/-c <file>`, `--environment/-e <name>`, `--debug/-d`.

mod commands;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{Globals, RightScriptCommand};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "right_st",
    version,
    about = "Upload, download and validate RightScripts and their attachments",
    long_about = None,
)]
struct Cli {
    /// Config file (default: ~/.right_st.yml).
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Environment from the config file to talk to.
    #[arg(short, long, global = true, value_name = "NAME")]
    environment: Option<String>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// RightScript management.
    #[command(name = "rightscript")]
    RightScript {
        #[command(subcommand)]
        command: RightScriptCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let globals = Globals {
        config: cli.config,
        environment: cli.environment,
    };
    match cli.command {
        Commands::RightScript { command } => commands::run(command, &globals),
    }
}
