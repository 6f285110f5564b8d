//! `s7n cipher`: show or change the vault's cipher algorithm.
//!
//! The new cipher takes effect immediately: the vault is rewritten with it.

use crate::cli::output;
use crate::cli::{open_session, Cli};
use crate::crypto::CipherAlgorithm;
use crate::errors::Result;

/// Execute the `cipher` command.
pub fn execute(cli: &Cli, algorithm: Option<&str>) -> Result<()> {
    let mut session = open_session(cli)?;
    let current = session.configuration().cipher_algorithm;

    let Some(name) = algorithm else {
        output::info(&format!("Cipher: {current}"));
        let names: Vec<_> = CipherAlgorithm::ALL.iter().map(|a| a.name()).collect();
        output::tip(&format!("Available: {}", names.join(", ")));
        return Ok(());
    };

    let algorithm: CipherAlgorithm = name.parse()?;
    if algorithm == current {
        output::info(&format!("Cipher is already {current}"));
        return Ok(());
    }

    session.configuration_mut().cipher_algorithm = algorithm;
    session.save(false)?;

    output::success(&format!("Cipher changed from {current} to {algorithm}"));
    Ok(())
}
