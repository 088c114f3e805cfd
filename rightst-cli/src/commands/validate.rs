//! `right_st rightscript validate`: offline metadata and attachment check.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use rightst_sync::pipeline;
use rightst_sync::walk::walk_paths;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Script files or directories to validate.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let files = walk_paths(&self.paths).context("validate aborted")?;

        let mut failed = 0;
        for path in &files {
            match pipeline::validate(path) {
                Ok(script) => {
                    println!(
                        "{} {}: '{}'",
                        "✓".green().bold(),
                        path.display(),
                        script.metadata.name
                    );
                    for a in &script.attachments {
                        println!("  {}  {}", a.fingerprint.to_string().bright_black(), a.filename);
                    }
                }
                Err(err) => {
                    failed += 1;
                    if err.script_path() == Some(path.as_path()) {
                        println!("{} {err}", "✗".red().bold());
                    } else {
                        println!("{} {}: {err}", "✗".red().bold(), path.display());
                    }
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} scripts failed validation", files.len());
        }
        Ok(())
    }
}
