//! Mnemonic lifecycle: creation, labeling, selection and resolution.
//!
//! This is the only place that talks to both the keystore storage and the
//! encryption service. All prompting goes through the typed [`Prompt`]
//! requests, so every flow here runs unchanged against a scripted adapter in
//! tests.

use bip39::{Language, Mnemonic};
use tracing::info;
use zeroize::Zeroizing;

use super::{Result, WalletError};
use crate::keystore::{
    EncryptionService, KeystoreEntry, KeystoreFile, KeystoreStore, SecretKind,
};
use crate::ui::prompt::Prompt;

/// Words collected during an import
const MNEMONIC_WORDS: usize = 12;

/// Policy layer for creating and resolving keystore entries.
pub struct MnemonicManager {
    store: KeystoreStore,
    crypto: EncryptionService,
}

impl MnemonicManager {
    pub fn new(store: KeystoreStore) -> Self {
        Self {
            store,
            crypto: EncryptionService::new(),
        }
    }

    pub fn store(&self) -> &KeystoreStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut KeystoreStore {
        &mut self.store
    }

    /// Loads the keystore, seeding a default plaintext entry when no keystore
    /// file exists yet. Returns `true` when the default was seeded.
    pub fn ensure_initialized(&mut self) -> Result<bool> {
        if self.store.load()? {
            return Ok(false);
        }

        let seeded = KeystoreFile::seeded_default();
        self.store.set_entries(seeded.entries);
        self.store.set_active_index(seeded.active_index);
        self.store.write()?;
        info!(path = %self.store.path().display(), "default keystore created and activated");
        Ok(true)
    }

    /// Generates a fresh 12-word English mnemonic from the OS random source.
    pub fn generate_phrase() -> Zeroizing<String> {
        // Entropy sizing for 12 words is fixed by BIP-39; generation can only
        // fail on an unsupported word count.
        let mnemonic = Mnemonic::generate_in(Language::English, MNEMONIC_WORDS)
            .expect("12 is a valid BIP-39 word count");
        Zeroizing::new(mnemonic.to_string())
    }

    /// Checks a single word against the English wordlist.
    pub fn validate_word(word: &str) -> Result<()> {
        if Language::English.word_list().iter().any(|w| *w == word) {
            Ok(())
        } else {
            Err(WalletError::InvalidMnemonicWord(word.to_string()))
        }
    }

    /// Collects a mnemonic word by word, validating each against the wordlist
    /// and re-prompting for that word only on failure.
    fn import_phrase(&self, prompt: &mut dyn Prompt) -> Result<Zeroizing<String>> {
        prompt.notice("Please enter your mnemonic key one word at a time.");
        let mut words: Vec<String> = Vec::with_capacity(MNEMONIC_WORDS);
        for position in 1..=MNEMONIC_WORDS {
            loop {
                let word = prompt
                    .input(&format!("Enter word {position} of {MNEMONIC_WORDS}"), None)?
                    .trim()
                    .to_lowercase();
                match Self::validate_word(&word) {
                    Ok(()) => {
                        words.push(word);
                        break;
                    }
                    Err(e) => {
                        prompt.notice(&format!("{e}. Please enter a valid BIP-39 word."));
                    }
                }
            }
        }
        Ok(Zeroizing::new(words.join(" ")))
    }

    /// Interactive entry creation: storage mode, generate-or-import, label.
    ///
    /// All validation and cryptography complete in memory before anything is
    /// appended or persisted; a failure at any step leaves both the entry
    /// list and the file untouched. Returns the new entry's index.
    pub fn add_mnemonic(&mut self, prompt: &mut dyn Prompt) -> Result<usize> {
        let encrypt = prompt.select(
            "Choose storage option for the mnemonic:",
            &["Store encrypted", "Store in plaintext"],
        )? == 0;

        let generate = prompt.select(
            "Generate or import a mnemonic?",
            &["Generate a new mnemonic", "Insert an existing mnemonic"],
        )? == 0;
        let phrase = if generate {
            Self::generate_phrase()
        } else {
            self.import_phrase(prompt)?
        };

        let default_label = format!("Mnemonic {}", self.store.entries().len() + 1);
        let label = prompt.input("Enter a label for this mnemonic", Some(&default_label))?;

        let entry = if encrypt {
            let blob = self.crypto.encrypt_with_prompt(&phrase, prompt)?;
            KeystoreEntry::encrypted(label, blob)
        } else {
            KeystoreEntry::plaintext(label, phrase.as_str())
        };

        let index = self.store.push_entry(entry);
        if let Err(e) = self.store.write() {
            // Keep the cache consistent with the unchanged file.
            self.store.pop_entry();
            return Err(e.into());
        }

        info!(index, encrypted = encrypt, "mnemonic added to keystore");
        prompt.notice(if encrypt {
            "Mnemonic stored securely."
        } else {
            "Mnemonic stored in plaintext."
        });
        Ok(index)
    }

    /// Returns the plaintext mnemonic for any entry, decrypting if needed.
    /// This is the sole decryption entry point used by derivation.
    pub fn resolve_mnemonic(
        &self,
        entry: &KeystoreEntry,
        prompt: &mut dyn Prompt,
    ) -> Result<Zeroizing<String>> {
        match entry.kind {
            SecretKind::Plaintext => Ok(Zeroizing::new(entry.secret.clone())),
            SecretKind::Encrypted => Ok(self.crypto.decrypt_with_prompt(&entry.secret, prompt)?),
        }
    }

    /// Resolves the active entry's mnemonic.
    pub fn resolve_active_mnemonic(&self, prompt: &mut dyn Prompt) -> Result<Zeroizing<String>> {
        let entry = self.active_entry()?;
        self.resolve_mnemonic(entry, prompt)
    }

    /// Label of the active entry.
    pub fn active_label(&self) -> Result<&str> {
        Ok(&self.active_entry()?.label)
    }

    fn active_entry(&self) -> Result<&KeystoreEntry> {
        let index = self
            .store
            .active_index()
            .ok_or(WalletError::NoActiveMnemonic)?;
        self.store
            .entries()
            .get(index)
            .ok_or(WalletError::NoActiveMnemonic)
    }

    /// Marks the entry at `index` active and persists the selection.
    pub fn select_active(&mut self, index: usize) -> Result<()> {
        let len = self.store.entries().len();
        if index >= len {
            return Err(WalletError::OutOfRange { index, len });
        }
        self.store.set_active_index(Some(index));
        self.store.write()?;
        info!(index, "active mnemonic selected");
        Ok(())
    }

    /// Removes the entry at `index` and persists the shrunken list. The
    /// active selector is cleared or shifted as needed.
    pub fn delete_entry(&mut self, index: usize) -> Result<KeystoreEntry> {
        let len = self.store.entries().len();
        if index >= len {
            return Err(WalletError::OutOfRange { index, len });
        }
        let removed = self.store.remove_entry(index);
        self.store.write()?;
        info!(index, label = %removed.label, "keystore entry deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::keystore::{DEFAULT_DEV_MNEMONIC, decrypt_secret, encrypt_secret};
    use crate::ui::prompt::ScriptedPrompt;

    fn manager_in(dir: &TempDir) -> MnemonicManager {
        MnemonicManager::new(KeystoreStore::open(dir.path().join("keystore.json")))
    }

    #[test]
    fn fresh_keystore_scenario() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        assert!(mgr.store().read().unwrap().is_none());

        // plaintext storage, import, accept default label
        let mut prompt = ScriptedPrompt::new()
            .with_selections([1, 1])
            .with_inputs(
                DEFAULT_DEV_MNEMONIC
                    .split(' ')
                    .map(str::to_string)
                    .chain([String::new()]),
            );
        let index = mgr.add_mnemonic(&mut prompt).unwrap();
        assert_eq!(index, 0);

        let file = mgr.store().read().unwrap().unwrap();
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].kind, SecretKind::Plaintext);
        assert_eq!(file.entries[0].label, "Mnemonic 1");
        assert_eq!(file.entries[0].secret, DEFAULT_DEV_MNEMONIC);
        // Adding never selects; activation is explicit.
        assert_eq!(file.active_index, None);
    }

    #[test]
    fn add_appends_at_prior_length_and_keeps_active() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        mgr.store_mut()
            .push_entry(KeystoreEntry::plaintext("Mnemonic 1", DEFAULT_DEV_MNEMONIC));
        mgr.store_mut().set_active_index(Some(0));
        mgr.store_mut().write().unwrap();

        let mut prompt = ScriptedPrompt::new()
            .with_selections([1, 0])
            .with_inputs([String::new()]);
        let index = mgr.add_mnemonic(&mut prompt).unwrap();
        assert_eq!(index, 1);
        assert_eq!(mgr.store().entries()[1].label, "Mnemonic 2");
        assert_eq!(mgr.store().active_index(), Some(0));
    }

    #[test]
    fn generated_phrase_is_a_valid_12_word_mnemonic() {
        let phrase = MnemonicManager::generate_phrase();
        assert_eq!(phrase.split(' ').count(), 12);
        assert!(Mnemonic::parse(phrase.as_str()).is_ok());

        // Fresh entropy every time.
        assert_ne!(*phrase, *MnemonicManager::generate_phrase());
    }

    #[test]
    fn import_reprompts_only_the_invalid_word() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);

        let mut inputs: Vec<String> = vec!["notaword".to_string()];
        inputs.extend(DEFAULT_DEV_MNEMONIC.split(' ').map(str::to_string));
        inputs.push(String::new()); // label
        let mut prompt = ScriptedPrompt::new()
            .with_selections([1, 1])
            .with_inputs(inputs);

        mgr.add_mnemonic(&mut prompt).unwrap();
        assert_eq!(mgr.store().entries()[0].secret, DEFAULT_DEV_MNEMONIC);
        // 1 rejected word + 12 accepted + label
        assert_eq!(prompt.input_requests, 14);
        assert!(prompt.notices.iter().any(|n| n.contains("notaword")));
    }

    #[test]
    fn encrypted_add_round_trips_through_decryption() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);

        let mut inputs: Vec<String> =
            DEFAULT_DEV_MNEMONIC.split(' ').map(str::to_string).collect();
        inputs.push("cold storage".to_string()); // label
        let mut prompt = ScriptedPrompt::new()
            .with_selections([0, 1])
            .with_inputs(inputs)
            .with_passwords(["hunter2"]);
        mgr.add_mnemonic(&mut prompt).unwrap();

        let entry = &mgr.store().entries()[0];
        assert_eq!(entry.kind, SecretKind::Encrypted);
        assert_eq!(entry.label, "cold storage");
        assert_ne!(entry.secret, DEFAULT_DEV_MNEMONIC);
        assert_eq!(
            decrypt_secret(&entry.secret, "hunter2").unwrap(),
            DEFAULT_DEV_MNEMONIC
        );
    }

    #[test]
    fn failed_encryption_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);

        // Password queue is empty, so the encryption prompt fails after the
        // phrase and label were already collected.
        let mut prompt = ScriptedPrompt::new()
            .with_selections([0, 0])
            .with_inputs([String::new()]);
        assert!(mgr.add_mnemonic(&mut prompt).is_err());

        assert!(mgr.store().entries().is_empty());
        assert!(mgr.store().read().unwrap().is_none());
    }

    #[test]
    fn resolve_active_decrypts_encrypted_entries() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        let blob = encrypt_secret(DEFAULT_DEV_MNEMONIC, "hunter2").unwrap();
        mgr.store_mut()
            .push_entry(KeystoreEntry::encrypted("Mnemonic 1", blob));
        mgr.store_mut().set_active_index(Some(0));

        let mut prompt = ScriptedPrompt::new().with_passwords(["hunter2"]);
        let phrase = mgr.resolve_active_mnemonic(&mut prompt).unwrap();
        assert_eq!(phrase.as_str(), DEFAULT_DEV_MNEMONIC);
    }

    #[test]
    fn resolve_without_selection_fails() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        mgr.store_mut()
            .push_entry(KeystoreEntry::plaintext("Mnemonic 1", DEFAULT_DEV_MNEMONIC));

        let mut prompt = ScriptedPrompt::new();
        assert!(matches!(
            mgr.resolve_active_mnemonic(&mut prompt),
            Err(WalletError::NoActiveMnemonic)
        ));
        assert!(matches!(
            mgr.active_label(),
            Err(WalletError::NoActiveMnemonic)
        ));
    }

    #[test]
    fn select_active_validates_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        mgr.store_mut()
            .push_entry(KeystoreEntry::plaintext("Mnemonic 1", DEFAULT_DEV_MNEMONIC));

        assert!(matches!(
            mgr.select_active(1),
            Err(WalletError::OutOfRange { index: 1, len: 1 })
        ));

        mgr.select_active(0).unwrap();
        assert_eq!(mgr.active_label().unwrap(), "Mnemonic 1");
        let file = mgr.store().read().unwrap().unwrap();
        assert_eq!(file.active_index, Some(0));
    }

    #[test]
    fn ensure_initialized_seeds_once() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        assert!(mgr.ensure_initialized().unwrap());
        assert_eq!(mgr.active_label().unwrap(), "Default Keystore");

        // Second run loads the existing file instead of reseeding.
        let mut again = manager_in(&dir);
        assert!(!again.ensure_initialized().unwrap());
        assert_eq!(again.store().entries().len(), 1);
    }

    #[test]
    fn delete_persists_and_clears_active() {
        let dir = TempDir::new().unwrap();
        let mut mgr = manager_in(&dir);
        mgr.ensure_initialized().unwrap();

        let removed = mgr.delete_entry(0).unwrap();
        assert_eq!(removed.label, "Default Keystore");
        let file = mgr.store().read().unwrap().unwrap();
        assert!(file.entries.is_empty());
        assert_eq!(file.active_index, None);

        assert!(matches!(
            mgr.delete_entry(0),
            Err(WalletError::OutOfRange { .. })
        ));
    }
}
