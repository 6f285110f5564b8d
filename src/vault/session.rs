//! The open vault: entries, configuration, master key and the instance lock.
//!
//! `VaultSession` ties the container format, the persisted configuration
//! and the PID lock together so that callers can work with simple calls
//! like `session.load("passphrase")` and `session.save(false)`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::format;
use super::lock::{remove_own_lock, PidLock};
use super::record;
use crate::config::Configuration;
use crate::errors::{Result, S7nError};
use crate::import::GpassImporter;
use crate::model::{Entry, EntryCollection};

/// Directory under `$HOME` used when no base directory is given.
pub const DEFAULT_DIR_NAME: &str = ".s7n";

const LOCK_FILE: &str = "lock";
const SECRETS_FILE: &str = "secrets";
const BACKUP_FILE: &str = "secrets.bak";
const CONFIGURATION_FILE: &str = "configuration";

/// A vault rooted at a base directory.
pub struct VaultSession {
    base_dir: PathBuf,

    /// Passphrase the secrets file is encrypted under (zeroized on drop).
    master_key: Option<Zeroizing<Vec<u8>>>,

    entries: EntryCollection,
    configuration: Configuration,

    /// Set by every mutation, cleared by `load` and `save`.
    dirty: bool,

    lock: Option<PidLock>,
}

impl VaultSession {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// A fresh, unlocked, empty session rooted at `base_dir`.
    ///
    /// Nothing is touched on disk until `lock`, `load` or `save`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            master_key: None,
            entries: EntryCollection::new(),
            configuration: Configuration::default(),
            dirty: false,
            lock: None,
        }
    }

    /// `~/.s7n`, resolved through `$HOME`.
    pub fn default_base_dir() -> Result<PathBuf> {
        std::env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(|home| PathBuf::from(home).join(DEFAULT_DIR_NAME))
            .ok_or_else(|| S7nError::ConfigError("HOME is not set".into()))
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(LOCK_FILE)
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.base_dir.join(SECRETS_FILE)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.base_dir.join(BACKUP_FILE)
    }

    pub fn configuration_path(&self) -> PathBuf {
        self.base_dir.join(CONFIGURATION_FILE)
    }

    // ------------------------------------------------------------------
    // Locking
    // ------------------------------------------------------------------

    /// Take the single-instance lock, creating the base directory if needed.
    ///
    /// Fails with `AlreadyRunning` when a live process holds it. Locking an
    /// already locked session is a no-op.
    pub fn lock(&mut self) -> Result<()> {
        if self.lock.is_some() {
            return Ok(());
        }
        self.ensure_base_dir()?;
        let lock = PidLock::acquire(&self.lock_path())?;
        info!(pid = lock.pid(), base_dir = %self.base_dir.display(), "vault locked");
        self.lock = Some(lock);
        Ok(())
    }

    /// Release the single-instance lock.
    ///
    /// A lock file recording another PID is left alone and reported as
    /// `AlreadyRunning`.
    pub fn unlock(&mut self) -> Result<()> {
        match self.lock.take() {
            Some(lock) => lock.release()?,
            None => remove_own_lock(&self.lock_path())?,
        }
        info!(base_dir = %self.base_dir.display(), "vault unlocked");
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    pub fn set_master_key(&mut self, master_key: &str) {
        self.master_key = Some(Zeroizing::new(master_key.as_bytes().to_vec()));
    }

    pub fn has_master_key(&self) -> bool {
        self.master_key.is_some()
    }

    /// Read configuration and entries from disk and keep `master_key` for
    /// later saves.
    ///
    /// A missing secrets file yields an empty collection. Content that does
    /// not decrypt or deserialize is reported as `InvalidPassphrase`. On
    /// failure the session keeps its previous key, configuration and entries.
    pub fn load(&mut self, master_key: &str) -> Result<()> {
        let configuration = Configuration::load(&self.configuration_path())?;

        let secrets = self.secrets_path();
        let entries = if secrets.exists() {
            let plaintext = Zeroizing::new(format::read(&secrets, master_key.as_bytes())?);
            record::load(&plaintext).map_err(|e| {
                debug!(error = %e, "secrets payload did not deserialize");
                S7nError::InvalidPassphrase
            })?
        } else {
            debug!(path = %secrets.display(), "no secrets file, starting empty");
            EntryCollection::new()
        };

        self.set_master_key(master_key);
        self.configuration = configuration;
        self.entries = entries;
        self.dirty = false;

        info!(entries = self.entries.len(), "vault loaded");
        Ok(())
    }

    /// Write entries and configuration to disk.
    ///
    /// Does nothing unless `force` is set or the session is dirty. The
    /// previous secrets file is kept as `secrets.bak`.
    pub fn save(&mut self, force: bool) -> Result<()> {
        if !force && !self.dirty {
            debug!("vault unchanged, nothing to save");
            return Ok(());
        }
        let master_key = self.master_key.as_ref().ok_or(S7nError::MasterKeyNotSet)?;

        self.ensure_base_dir()?;
        let secrets = self.secrets_path();
        if secrets.exists() {
            fs::copy(&secrets, self.backup_path())?;
        }

        let payload = Zeroizing::new(record::dump(&self.entries)?);
        format::write(
            &secrets,
            master_key,
            self.configuration.cipher_algorithm,
            &payload,
        )?;
        self.configuration.save(&self.configuration_path())?;
        self.dirty = false;

        info!(
            entries = self.entries.len(),
            cipher = %self.configuration.cipher_algorithm,
            "vault saved"
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entries and configuration
    // ------------------------------------------------------------------

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    /// Mutable access to the collection. Marks the session dirty.
    pub fn entries_mut(&mut self) -> &mut EntryCollection {
        self.dirty = true;
        &mut self.entries
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Mutable access to the configuration. Marks the session dirty.
    pub fn configuration_mut(&mut self) -> &mut Configuration {
        self.dirty = true;
        &mut self.configuration
    }

    /// Add entries, returning the ids they were given.
    pub fn add_entries<I>(&mut self, entries: I) -> Vec<i64>
    where
        I: IntoIterator<Item = Entry>,
    {
        self.entries_mut().add_entries(entries)
    }

    /// Remove the entries with these ids, returning what was removed.
    pub fn delete_entries(&mut self, ids: &[i64]) -> Vec<Entry> {
        self.entries_mut().delete_entries(ids)
    }

    /// Import a GPass file and merge its entries, returning their new ids.
    ///
    /// Nothing is merged if the import fails.
    pub fn import_gpass(&mut self, passphrase: &str, path: &Path) -> Result<Vec<i64>> {
        let imported = GpassImporter::read(passphrase, path)?;
        let ids = self.entries_mut().merge(imported);
        info!(count = ids.len(), path = %path.display(), "gpass entries imported");
        Ok(ids)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn ensure_base_dir(&self) -> Result<()> {
        if self.base_dir.exists() {
            if !self.base_dir.is_dir() {
                return Err(S7nError::InvalidPath(self.base_dir.clone()));
            }
            return Ok(());
        }
        fs::create_dir_all(&self.base_dir)?;
        restrict_dir_permissions(&self.base_dir)?;
        debug!(path = %self.base_dir.display(), "base directory created");
        Ok(())
    }
}

impl Drop for VaultSession {
    fn drop(&mut self) {
        if self.lock.is_some() {
            if let Err(e) = self.unlock() {
                warn!(error = %e, "failed to release vault lock");
            }
        }
    }
}

#[cfg(unix)]
fn restrict_dir_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
