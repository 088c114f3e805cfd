//! `right_st rightscript show`: one script and its attachments.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rightst_sync::remote;

use super::Globals;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Script name, numeric id or `/api/right_scripts/<id>` href.
    pub name_or_href: String,
}

impl ShowArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let client = globals.client()?;
        let details = remote::show(&client, &self.name_or_href)
            .with_context(|| format!("cannot show '{}'", self.name_or_href))?;
        let script = &details.script;

        println!("{}", script.name.bold());
        println!("  href:        {}", script.href);
        println!("  revision:    {}", script.revision_label());
        if !script.description.is_empty() {
            println!("  description: {}", script.description);
        }

        if details.attachments.is_empty() {
            println!("Attachments: none");
            return Ok(());
        }
        println!("Attachments (id, md5, name):");
        for a in &details.attachments {
            println!("  {} {} {}", a.id, a.digest.to_string().bright_black(), a.name);
        }
        Ok(())
    }
}
