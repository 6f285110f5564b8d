use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::CipherAlgorithm;
use crate::errors::{Result, S7nError};

/// Vault-level configuration, persisted next to the secrets file.
///
/// Every field has a default so a missing or partial file still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Cipher used when the vault is next written.
    #[serde(default)]
    pub cipher_algorithm: CipherAlgorithm,
}

impl Configuration {
    /// Load the configuration from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;

        toml::from_str(&contents)
            .map_err(|e| S7nError::ConfigError(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Write the configuration to `path`, replacing any previous content.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string(self)
            .map_err(|e| S7nError::ConfigError(format!("Failed to serialize configuration: {e}")))?;
        fs::write(path, contents)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_cipher_is_aes() {
        assert_eq!(
            Configuration::default().cipher_algorithm,
            CipherAlgorithm::Aes256Cbc
        );
    }

    #[test]
    fn load_returns_defaults_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = Configuration::load(&tmp.path().join("configuration")).unwrap();
        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configuration");
        let config = Configuration {
            cipher_algorithm: CipherAlgorithm::BlowfishCbc,
        };
        config.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim(), r#"cipher_algorithm = "BF-CBC""#);
        assert_eq!(Configuration::load(&path).unwrap(), config);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configuration");
        fs::write(&path, "# empty\n").unwrap();
        assert_eq!(
            Configuration::load(&path).unwrap().cipher_algorithm,
            CipherAlgorithm::Aes256Cbc
        );
    }

    #[test]
    fn load_errors_on_unknown_cipher() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configuration");
        fs::write(&path, "cipher_algorithm = \"ROT13\"\n").unwrap();
        assert!(matches!(
            Configuration::load(&path),
            Err(S7nError::ConfigError(_))
        ));
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("configuration");
        fs::write(&path, "not valid {{toml").unwrap();
        assert!(Configuration::load(&path).is_err());
    }
}
