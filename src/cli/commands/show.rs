//! `s7n show`: print one entry's attributes.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::errors::{Result, S7nError};

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: i64, reveal: bool) -> Result<()> {
    let session = open_session(cli)?;
    let entry = session
        .entries()
        .find(id)
        .ok_or(S7nError::NoSuchEntry(id))?;

    output::print_entry(entry, reveal);

    Ok(())
}
