//! `right_st rightscript list`: remote scripts matching a name filter.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use rightst_core::ScriptSummary;
use rightst_sync::remote;

use super::Globals;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Name filter; partial matches are listed.
    pub filter: String,
}

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "href")]
    href: String,
    #[tabled(rename = "revision")]
    revision: String,
    #[tabled(rename = "name")]
    name: String,
}

impl From<ScriptSummary> for ListRow {
    fn from(s: ScriptSummary) -> Self {
        Self {
            revision: s.revision_label(),
            href: s.href.0,
            name: s.name,
        }
    }
}

impl ListArgs {
    pub fn run(self, globals: &Globals) -> Result<()> {
        let client = globals.client()?;
        let scripts = remote::list(&client, &self.filter)
            .with_context(|| format!("listing scripts matching '{}' failed", self.filter))?;

        if scripts.is_empty() {
            println!("No RightScripts match '{}'.", self.filter);
            return Ok(());
        }

        println!("Found {} RightScripts:", scripts.len());
        let mut table = Table::new(scripts.into_iter().map(ListRow::from));
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
