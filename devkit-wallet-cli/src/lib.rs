// Library exports for devkit-wallet-cli

pub mod config;
pub mod handlers;
pub mod keystore;
pub mod ui;
pub mod wallet;

// Re-export commonly used types
pub use config::WalletConfig;
pub use keystore::{KeystoreError, KeystoreStore};
pub use wallet::{Chain, WalletError};
