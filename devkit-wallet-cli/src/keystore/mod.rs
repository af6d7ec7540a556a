//! Keystore module for durable storage of labeled mnemonic secrets.
//!
//! This module provides the on-disk keystore file (a JSON aggregate of typed
//! entries plus an active selector), password-based encryption of individual
//! secrets, and migration of legacy file layouts into the canonical schema.

mod encryption;
mod models;
mod storage;

pub use encryption::{EncryptionService, MAX_DECRYPT_ATTEMPTS, decrypt_secret, encrypt_secret};
pub use models::{DEFAULT_DEV_MNEMONIC, KeystoreEntry, KeystoreFile, SecretKind};
pub use storage::KeystoreStore;

use crate::ui::prompt::PromptError;

/// Error types that can occur during keystore operations
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed secret blob")]
    MalformedBlob,

    #[error("incorrect password or corrupted data")]
    WrongPassword,

    #[error("maximum decryption attempts reached")]
    DecryptionExhausted,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Result type for keystore operations
pub type Result<T> = std::result::Result<T, KeystoreError>;
