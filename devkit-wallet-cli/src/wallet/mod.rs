//! Wallet module: mnemonic management and hierarchical key derivation.
//!
//! [`mnemonic::MnemonicManager`] owns the keystore policy (creating, labeling,
//! selecting and resolving entries); [`derivation::HdWallet`] turns a resolved
//! mnemonic into per-chain private keys and addresses.

pub mod address;
pub mod derivation;
pub mod mnemonic;

pub use derivation::{DerivedAccount, HdWallet};
pub use mnemonic::MnemonicManager;

use crate::keystore::KeystoreError;
use crate::ui::prompt::PromptError;

/// The two address spaces sharing one seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// Conflux Core space, BIP-44 coin type 503, base32 addresses
    Core,
    /// Conflux eSpace (EVM-compatible), coin type 60, hex addresses
    Espace,
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Core => write!(f, "core"),
            Chain::Espace => write!(f, "espace"),
        }
    }
}

/// Error types that can occur during wallet operations
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error(transparent)]
    Keystore(#[from] KeystoreError),

    #[error("index {index} out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },

    #[error("invalid range: from {from} > to {to}")]
    InvalidRange { from: u32, to: u32 },

    #[error("no active mnemonic selected")]
    NoActiveMnemonic,

    #[error("not a valid BIP-39 mnemonic word: {0:?}")]
    InvalidMnemonicWord(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("derivation failed: {0}")]
    Derivation(String),

    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Result type for wallet operations
pub type Result<T> = std::result::Result<T, WalletError>;
