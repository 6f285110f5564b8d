//! `s7n import`: merge entries from a GPass file into the vault.

use std::path::Path;

use crate::cli::output;
use crate::cli::{open_session, prompt_gpass_passphrase, Cli};
use crate::errors::Result;
use crate::import::GpassImporter;

/// Execute the `import` command.
pub fn execute(cli: &Cli, file: Option<&Path>) -> Result<()> {
    let source = match file {
        Some(path) => path.to_path_buf(),
        None => GpassImporter::default_path()?,
    };

    let mut session = open_session(cli)?;
    let passphrase = prompt_gpass_passphrase()?;
    let ids = session.import_gpass(&passphrase, &source)?;

    if ids.is_empty() {
        output::warning("No entries found in the GPass file.");
        return Ok(());
    }

    for id in &ids {
        if let Some(entry) = session.entries().find(*id) {
            output::info(&format!("  + {id}: {}", entry.name().unwrap_or_default()));
        }
    }

    session.save(false)?;

    output::success(&format!(
        "Imported {} entries from {}",
        ids.len(),
        source.display()
    ));

    Ok(())
}
