//! `right_st rightscript download`: fetch a script's source.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rightst_sync::remote;

use super::Globals;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Script name, numeric id or `/api/right_scripts/<id>` href.
    pub name_or_href: String,

    /// Destination file (default: the script name in the current directory).
    pub path: Option<PathBuf>,
}

impl DownloadArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let client = globals.client()?;
        let download = remote::download(&client, &self.name_or_href, self.path.as_deref())
            .with_context(|| format!("download of '{}' failed", self.name_or_href))?;

        println!(
            "{} downloaded '{}' ({} bytes) to {}",
            "✓".green().bold(),
            download.name,
            download.bytes,
            download.path.display()
        );
        Ok(())
    }
}
