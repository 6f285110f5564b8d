//! `s7n init`: create an empty vault.

use crate::cli::output;
use crate::cli::{base_dir, prompt_new_master_key, Cli};
use crate::errors::{Result, S7nError};
use crate::vault::VaultSession;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut session = VaultSession::new(base_dir(cli)?);

    if session.secrets_path().exists() {
        output::tip("Use `s7n import` to add entries to the existing vault.");
        return Err(S7nError::CommandFailed(format!(
            "vault already exists at {}",
            session.base_dir().display()
        )));
    }

    session.lock()?;
    let master_key = prompt_new_master_key()?;
    session.set_master_key(&master_key);
    session.save(true)?;

    output::success(&format!(
        "Vault created at {} ({})",
        session.base_dir().display(),
        session.configuration().cipher_algorithm
    ));

    Ok(())
}
