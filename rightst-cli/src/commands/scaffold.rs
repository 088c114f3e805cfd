//! `right_st rightscript scaffold`: insert metadata blocks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rightst_sync::walk::walk_paths;
use rightst_sync::writer::scaffold_file;
use rightst_sync::ScaffoldResult;

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Script files or directories to scaffold.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl ScaffoldArgs {
    pub fn run(self) -> Result<()> {
        let files = walk_paths(&self.paths).context("scaffold aborted")?;
        for path in files {
            let result = scaffold_file(&path)
                .with_context(|| format!("failed to scaffold {}", path.display()))?;
            match result {
                ScaffoldResult::Written { path } => println!("  ✎  {}", path.display()),
                ScaffoldResult::Unchanged { path } => {
                    println!("  ·  {} (metadata present)", path.display())
                }
            }
        }
        Ok(())
    }
}
