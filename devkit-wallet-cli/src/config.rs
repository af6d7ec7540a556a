//! Wallet configuration.
//!
//! The core takes every external value (keystore path, network id) as
//! explicit configuration; only [`WalletConfig::from_env`] touches the
//! environment, and only the binary calls it.

use std::env;
use std::path::PathBuf;

/// Default Core space network id of the development node
pub const DEFAULT_CORE_NETWORK_ID: u32 = 2029;

/// Keystore file name under the user's home directory
const KEYSTORE_FILE_NAME: &str = ".devkit.keystore.json";

#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Path of the keystore JSON file
    pub keystore_path: PathBuf,

    /// Network id used for Core space address encoding
    pub core_network_id: u32,
}

impl WalletConfig {
    pub fn new(keystore_path: impl Into<PathBuf>) -> Self {
        Self {
            keystore_path: keystore_path.into(),
            core_network_id: DEFAULT_CORE_NETWORK_ID,
        }
    }

    /// Resolves configuration from `DEVKIT_KEYSTORE_PATH` and
    /// `DEVKIT_CHAIN_ID`, falling back to `~/.devkit.keystore.json` and the
    /// default dev-node network id.
    pub fn from_env() -> Self {
        let keystore_path = env::var_os("DEVKIT_KEYSTORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(KEYSTORE_FILE_NAME)
            });
        let core_network_id = env::var("DEVKIT_CHAIN_ID")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_CORE_NETWORK_ID);

        Self {
            keystore_path,
            core_network_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_keeps_default_network() {
        let config = WalletConfig::new("/tmp/keystore.json");
        assert_eq!(config.keystore_path, PathBuf::from("/tmp/keystore.json"));
        assert_eq!(config.core_network_id, DEFAULT_CORE_NETWORK_ID);
    }
}
