//! Encryption utilities for the keystore module.
//!
//! Secrets are protected with AES-256-GCM under a key derived from a user
//! password via PBKDF2-HMAC-SHA256. The blob layout is
//! `salt (16 bytes) || nonce (12 bytes) || ciphertext+tag`, base64-encoded so
//! it can live inside the JSON keystore file as an opaque string.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use rand_core::RngCore;
use sha2::Sha256;
use tracing::warn;
use zeroize::Zeroizing;

use crate::keystore::{KeystoreError, Result};
use crate::ui::prompt::Prompt;

// Constants for encryption parameters
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32; // 256 bits
const PBKDF2_ROUNDS: u32 = 100_000;

/// Password attempts allowed before decryption gives up
pub const MAX_DECRYPT_ATTEMPTS: u32 = 3;

fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut key[..]);
    key
}

/// Decodes a blob and splits it into `(salt, nonce, ciphertext)`.
fn decode_blob(blob: &str) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>)> {
    let bytes = BASE64
        .decode(blob.trim())
        .map_err(|_| KeystoreError::MalformedBlob)?;
    if bytes.len() < SALT_LEN + NONCE_LEN {
        return Err(KeystoreError::MalformedBlob);
    }
    Ok((
        bytes[..SALT_LEN].to_vec(),
        bytes[SALT_LEN..SALT_LEN + NONCE_LEN].to_vec(),
        bytes[SALT_LEN + NONCE_LEN..].to_vec(),
    ))
}

/// Encrypts a UTF-8 secret with a password.
///
/// A fresh random salt and nonce are drawn on every call, so encrypting the
/// same input twice yields different blobs.
pub fn encrypt_secret(plaintext: &str, password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| KeystoreError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(blob))
}

/// Decrypts a blob produced by [`encrypt_secret`].
///
/// Authentication failure and corrupted ciphertext are indistinguishable by
/// design; both report [`KeystoreError::WrongPassword`].
pub fn decrypt_secret(blob: &str, password: &str) -> Result<String> {
    let (salt, nonce_bytes, ciphertext) = decode_blob(blob)?;

    let key = derive_key(password, &salt);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_slice())
        .map_err(|_| KeystoreError::WrongPassword)?;

    String::from_utf8(plaintext).map_err(|_| KeystoreError::MalformedBlob)
}

/// Prompting policy around the encryption primitives.
///
/// Encryption always requests a fresh password; decryption retries the prompt
/// a bounded number of times before failing with
/// [`KeystoreError::DecryptionExhausted`].
#[derive(Debug, Default)]
pub struct EncryptionService;

impl EncryptionService {
    pub fn new() -> Self {
        Self
    }

    /// Prompts for a new password and encrypts `plaintext` under it.
    pub fn encrypt_with_prompt(
        &self,
        plaintext: &str,
        prompt: &mut dyn Prompt,
    ) -> Result<String> {
        let password = Zeroizing::new(
            prompt.password("Enter encryption password to secure your mnemonic")?,
        );
        encrypt_secret(plaintext, &password)
    }

    /// Prompts for the password and decrypts `blob`, retrying up to
    /// [`MAX_DECRYPT_ATTEMPTS`] times on a wrong password.
    pub fn decrypt_with_prompt(
        &self,
        blob: &str,
        prompt: &mut dyn Prompt,
    ) -> Result<Zeroizing<String>> {
        // Structural problems are not retryable; reject before prompting.
        decode_blob(blob)?;

        for attempt in 1..=MAX_DECRYPT_ATTEMPTS {
            let password = Zeroizing::new(prompt.password("Password")?);
            match decrypt_secret(blob, &password) {
                Ok(plaintext) => return Ok(Zeroizing::new(plaintext)),
                Err(KeystoreError::WrongPassword) => {
                    warn!(attempt, "keystore decryption attempt failed");
                    prompt.notice(&format!(
                        "Decryption failed ({attempt}/{MAX_DECRYPT_ATTEMPTS}). \
                         Incorrect password or corrupted data."
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        Err(KeystoreError::DecryptionExhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::prompt::ScriptedPrompt;

    const MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn encrypt_decrypt_round_trip() {
        let blob = encrypt_secret(MNEMONIC, "hunter2").unwrap();
        let plaintext = decrypt_secret(&blob, "hunter2").unwrap();
        assert_eq!(plaintext, MNEMONIC);
    }

    #[test]
    fn same_input_yields_different_blobs() {
        let a = encrypt_secret(MNEMONIC, "hunter2").unwrap();
        let b = encrypt_secret(MNEMONIC, "hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_password_fails() {
        let blob = encrypt_secret(MNEMONIC, "hunter2").unwrap();
        let result = decrypt_secret(&blob, "hunter3");
        assert!(matches!(result, Err(KeystoreError::WrongPassword)));
    }

    #[test]
    fn flipped_ciphertext_byte_fails_authentication() {
        let blob = encrypt_secret(MNEMONIC, "hunter2").unwrap();
        let mut bytes = BASE64.decode(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = BASE64.encode(bytes);

        let result = decrypt_secret(&tampered, "hunter2");
        assert!(matches!(result, Err(KeystoreError::WrongPassword)));
    }

    #[test]
    fn short_blob_is_malformed() {
        let short = BASE64.encode([0u8; SALT_LEN + NONCE_LEN - 1]);
        assert!(matches!(
            decrypt_secret(&short, "hunter2"),
            Err(KeystoreError::MalformedBlob)
        ));
    }

    #[test]
    fn invalid_base64_is_malformed() {
        assert!(matches!(
            decrypt_secret("not base64 at all!", "hunter2"),
            Err(KeystoreError::MalformedBlob)
        ));
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let blob = encrypt_secret("", "hunter2").unwrap();
        assert_eq!(decrypt_secret(&blob, "hunter2").unwrap(), "");
    }

    #[test]
    fn decrypt_gives_up_after_three_attempts() {
        let blob = encrypt_secret(MNEMONIC, "correct").unwrap();
        let mut prompt = ScriptedPrompt::new()
            .with_passwords(["wrong1", "wrong2", "wrong3", "never-asked"]);

        let result = EncryptionService::new().decrypt_with_prompt(&blob, &mut prompt);
        assert!(matches!(result, Err(KeystoreError::DecryptionExhausted)));
        assert_eq!(prompt.password_requests, 3);
    }

    #[test]
    fn decrypt_succeeds_on_second_attempt() {
        let blob = encrypt_secret(MNEMONIC, "correct").unwrap();
        let mut prompt = ScriptedPrompt::new().with_passwords(["wrong", "correct"]);

        let plaintext = EncryptionService::new()
            .decrypt_with_prompt(&blob, &mut prompt)
            .unwrap();
        assert_eq!(plaintext.as_str(), MNEMONIC);
        assert_eq!(prompt.password_requests, 2);
    }

    #[test]
    fn malformed_blob_does_not_consume_attempts() {
        let mut prompt = ScriptedPrompt::new().with_passwords(["never-asked"]);
        let result = EncryptionService::new().decrypt_with_prompt("AAAA", &mut prompt);
        assert!(matches!(result, Err(KeystoreError::MalformedBlob)));
        assert_eq!(prompt.password_requests, 0);
    }
}
