//! `right_st rightscript` subcommands.

pub mod download;
pub mod list;
pub mod scaffold;
pub mod show;
pub mod upload;
pub mod validate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use rightst_api::ApiClient;
use rightst_core::config;

use download::DownloadArgs;
use list::ListArgs;
use scaffold::ScaffoldArgs;
use show::ShowArgs;
use upload::UploadArgs;
use validate::ValidateArgs;

#[derive(Subcommand, Debug)]
pub enum RightScriptCommand {
    /// List RightScripts whose name matches a filter.
    List(ListArgs),

    /// Show a single RightScript and its attachments.
    Show(ShowArgs),

    /// Upload scripts and reconcile their attachments.
    Upload(UploadArgs),

    /// Download a RightScript's source to a local file.
    Download(DownloadArgs),

    /// Add a metadata block to scripts that lack one.
    Scaffold(ScaffoldArgs),

    /// Check scripts' metadata and attachments without contacting the API.
    Validate(ValidateArgs),
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct Globals {
    pub config: Option<PathBuf>,
    pub environment: Option<String>,
}

impl Globals {
    /// Load the config, pick the environment and log in.
    pub fn client(&self) -> Result<ApiClient> {
        let config = match &self.config {
            Some(path) => config::load_at(path),
            None => config::load(),
        }
        .context("failed to load right_st config")?;

        let (name, env) = config.environment(self.environment.as_deref())?;
        tracing::debug!(environment = name, account = env.account, "using {}", env.host);

        ApiClient::login(env)
            .with_context(|| format!("authentication against {} failed", env.host))
    }
}

pub fn run(command: RightScriptCommand, globals: &Globals) -> Result<()> {
    match command {
        RightScriptCommand::List(args) => args.run(globals),
        RightScriptCommand::Show(args) => args.run(globals),
        RightScriptCommand::Upload(args) => args.run(globals),
        RightScriptCommand::Download(args) => args.run(globals),
        RightScriptCommand::Scaffold(args) => args.run(),
        RightScriptCommand::Validate(args) => args.run(),
    }
}
