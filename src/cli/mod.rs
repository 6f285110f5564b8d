//! CLI module: argument parser, prompts and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::errors::{Result, S7nError};
use crate::vault::VaultSession;

/// Environment variable holding the master key for non-interactive use.
pub const MASTER_KEY_ENV: &str = "S7N_MASTER_KEY";

/// Environment variable holding the GPass passphrase for non-interactive use.
pub const GPASS_PASSPHRASE_ENV: &str = "S7N_GPASS_PASSPHRASE";

/// s7n CLI: local encrypted secrets vault.
#[derive(Parser)]
#[command(name = "s7n", about = "Local encrypted secrets vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: ~/.s7n)
    #[arg(long, global = true, env = "S7N_BASE_DIR")]
    pub base_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an empty vault
    Init,

    /// Import entries from a GPass file
    Import {
        /// Path to the GPass file (default: ~/.gpass/passwords.gps)
        file: Option<PathBuf>,
    },

    /// List entries
    List {
        /// Only show entries with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show the attributes of one entry
    Show {
        /// Entry id
        id: i64,
        /// Print secret values instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Show or change the cipher used when the vault is written
    Cipher {
        /// New cipher algorithm (AES-256-CBC, BF-CBC, plain)
        algorithm: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the vault directory from `--base-dir`, `S7N_BASE_DIR` or the
/// default.
pub fn base_dir(cli: &Cli) -> Result<PathBuf> {
    match &cli.base_dir {
        Some(dir) => Ok(dir.clone()),
        None => VaultSession::default_base_dir(),
    }
}

/// Get the master key, trying in order:
/// 1. `S7N_MASTER_KEY` env var
/// 2. Interactive prompt
pub fn prompt_master_key() -> Result<Zeroizing<String>> {
    prompt_secret(MASTER_KEY_ENV, "Enter master key")
}

/// Prompt for a new master key with confirmation (used during `init`).
///
/// Also respects `S7N_MASTER_KEY` for scripted usage.
pub fn prompt_new_master_key() -> Result<Zeroizing<String>> {
    if let Some(key) = non_empty_env(MASTER_KEY_ENV) {
        return Ok(key);
    }

    loop {
        let key = dialoguer::Password::new()
            .with_prompt("Choose master key")
            .with_confirmation("Confirm master key", "Keys do not match, try again")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| S7nError::CommandFailed(format!("master key prompt: {e}")))?;

        if key.is_empty() {
            output::warning("Master key must not be empty. Try again.");
            continue;
        }

        return Ok(Zeroizing::new(key));
    }
}

/// Get the GPass passphrase from `S7N_GPASS_PASSPHRASE` or a prompt.
pub fn prompt_gpass_passphrase() -> Result<Zeroizing<String>> {
    prompt_secret(GPASS_PASSPHRASE_ENV, "Enter GPass passphrase")
}

/// Lock the vault and load it with the master key.
pub fn open_session(cli: &Cli) -> Result<VaultSession> {
    let mut session = VaultSession::new(base_dir(cli)?);
    session.lock()?;
    let master_key = prompt_master_key()?;
    session.load(&master_key)?;
    Ok(session)
}

fn prompt_secret(var: &str, prompt: &str) -> Result<Zeroizing<String>> {
    if let Some(value) = non_empty_env(var) {
        return Ok(value);
    }

    let value = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map_err(|e| S7nError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

fn non_empty_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Zeroizing::new)
}
