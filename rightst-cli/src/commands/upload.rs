//! `right_st rightscript upload`: push scripts and reconcile attachments.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use rightst_sync::pipeline::{self, NamePolicy};
use rightst_sync::{AttachmentResult, PushReport, UpsertOutcome};

use super::Globals;

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Script files or directories to upload.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Upload scripts without metadata, named after the file.
    #[arg(short, long)]
    pub force: bool,

    /// Show what would change without touching the remote side.
    #[arg(long)]
    pub dry_run: bool,
}

impl UploadArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let policy = if self.force {
            NamePolicy::FallbackToFileStem
        } else {
            NamePolicy::Require
        };
        let plan = pipeline::plan(&self.paths, policy).context("upload aborted")?;
        if plan.scripts.is_empty() {
            println!("No scripts found.");
            return Ok(());
        }

        let client = globals.client()?;
        let results = pipeline::apply(&client, &plan, self.dry_run);

        let mut failed = 0;
        for result in &results {
            match &result.outcome {
                Ok(report) => print_report(&result.name.to_string(), report, self.dry_run),
                Err(err) => {
                    failed += 1;
                    println!(
                        "{} '{}' ({}): {err}",
                        "✗".red().bold(),
                        result.name,
                        result.path.display()
                    );
                }
            }
        }

        if failed > 0 {
            bail!("{failed} of {} scripts failed to upload", results.len());
        }
        Ok(())
    }
}

fn print_report(name: &str, report: &PushReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let action = match &report.script {
        UpsertOutcome::Created(href) => format!("created {href}"),
        UpsertOutcome::Updated(href) => format!("updated {href}"),
        UpsertOutcome::WouldCreate => "would be created".to_string(),
        UpsertOutcome::WouldUpdate(href) => format!("would update {href}"),
    };
    println!("{prefix}{} '{name}' {action}", "✓".green().bold());

    for r in &report.attachments {
        match r {
            AttachmentResult::Deleted { name, target, .. } => {
                println!("  {}  deleted '{name}' ({target})", "-".red())
            }
            AttachmentResult::WouldDelete { name, target, .. } => {
                println!("  {}  would delete '{name}' ({target})", "-".red())
            }
            AttachmentResult::Uploaded { name, fingerprint } => {
                println!("  {}  uploaded '{name}' with md5 {fingerprint}", "+".green())
            }
            AttachmentResult::WouldUpload { name, fingerprint } => {
                println!("  {}  would upload '{name}' with md5 {fingerprint}", "+".green())
            }
            AttachmentResult::Unchanged {
                name,
                remote_name,
                fingerprint,
            } if name != remote_name => println!(
                "  ·  '{name}' already uploaded as '{remote_name}' with md5 {fingerprint}"
            ),
            AttachmentResult::Unchanged {
                name, fingerprint, ..
            } => println!("  ·  '{name}' already uploaded with md5 {fingerprint}"),
        }
    }
}
