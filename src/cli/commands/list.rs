//! `s7n list`: display entries in a table.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, tag: Option<&str>) -> Result<()> {
    let session = open_session(cli)?;
    let entries = session.entries().entries();

    let shown: Vec<_> = entries
        .iter()
        .filter(|e| tag.map_or(true, |t| e.has_tag(t)))
        .collect();

    output::info(&format!("{} entries", shown.len()));
    output::print_entries_table(shown);

    Ok(())
}
