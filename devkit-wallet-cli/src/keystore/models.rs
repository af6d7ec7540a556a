//! Data models for the keystore module.
//!
//! The canonical on-disk layout is a single JSON object:
//!
//! ```json
//! {
//!   "keystore": [
//!     { "type": "plaintext", "label": "Mnemonic 1", "mnemonic": "..." }
//!   ],
//!   "activeIndex": 0
//! }
//! ```
//!
//! Two historical layouts are still recognized on read and rewritten into the
//! canonical form: a bare mnemonic phrase, and a bare JSON array of entries.

/// Mnemonic seeded into a fresh keystore on first run. This is the well-known
/// development phrase shared with most EVM tooling; its accounts are funded by
/// the dev node's genesis and must never hold real value.
pub const DEFAULT_DEV_MNEMONIC: &str =
    "test test test test test test test test test test test junk";

/// Storage mode of a keystore entry's secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SecretKind {
    /// The raw mnemonic phrase
    #[serde(rename = "plaintext")]
    Plaintext,

    /// A base64 blob produced by [`crate::keystore::encrypt_secret`]
    #[serde(rename = "encoded")]
    Encrypted,
}

/// A single labeled secret in the keystore
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeystoreEntry {
    /// Storage mode of `secret`
    #[serde(rename = "type")]
    pub kind: SecretKind,

    /// Human-readable label, not required to be unique
    pub label: String,

    /// The mnemonic phrase itself, or an opaque encrypted blob
    #[serde(rename = "mnemonic")]
    pub secret: String,
}

impl KeystoreEntry {
    /// Creates a plaintext entry
    pub fn plaintext(label: impl Into<String>, mnemonic: impl Into<String>) -> Self {
        Self {
            kind: SecretKind::Plaintext,
            label: label.into(),
            secret: mnemonic.into(),
        }
    }

    /// Creates an entry holding an already-encrypted blob
    pub fn encrypted(label: impl Into<String>, blob: impl Into<String>) -> Self {
        Self {
            kind: SecretKind::Encrypted,
            label: label.into(),
            secret: blob.into(),
        }
    }

    /// Short storage-mode tag for listings
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            SecretKind::Plaintext => "plaintext",
            SecretKind::Encrypted => "encrypted",
        }
    }
}

/// The persisted aggregate: ordered entries plus an optional active selector
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeystoreFile {
    /// Entries in insertion order; the order is the indexing basis for
    /// selection and default labels
    #[serde(rename = "keystore")]
    pub entries: Vec<KeystoreEntry>,

    /// Index of the active entry, `null` when nothing is selected
    #[serde(rename = "activeIndex", default)]
    pub active_index: Option<usize>,
}

impl KeystoreFile {
    /// Creates an empty keystore file
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            active_index: None,
        }
    }

    /// The entry seeded into a fresh keystore on first run, pre-selected as
    /// active so derivation works out of the box
    pub fn seeded_default() -> Self {
        Self {
            entries: vec![KeystoreEntry::plaintext(
                "Default Keystore",
                DEFAULT_DEV_MNEMONIC,
            )],
            active_index: Some(0),
        }
    }
}

impl Default for KeystoreFile {
    fn default() -> Self {
        Self::new()
    }
}

/// Attempts to interpret file contents as one of the legacy keystore layouts.
///
/// Returns `None` when the contents match neither layout, in which case the
/// caller must treat the file as corrupt rather than absent.
pub(crate) fn from_legacy(raw: &str) -> Option<KeystoreFile> {
    // Older builds wrote the entry array without the aggregate wrapper, so
    // there was no persisted active selection.
    if let Ok(entries) = serde_json::from_str::<Vec<KeystoreEntry>>(raw) {
        return Some(KeystoreFile {
            entries,
            active_index: None,
        });
    }

    // The oldest layout was a single bare mnemonic phrase.
    let trimmed = raw.trim();
    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let looks_like_phrase = matches!(words.len(), 12 | 24)
        && words
            .iter()
            .all(|w| !w.is_empty() && w.chars().all(|c| c.is_ascii_lowercase()));
    if looks_like_phrase {
        return Some(KeystoreFile {
            entries: vec![KeystoreEntry::plaintext(
                "Imported Keystore",
                words.join(" "),
            )],
            active_index: Some(0),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_field_names() {
        let file = KeystoreFile {
            entries: vec![
                KeystoreEntry::plaintext("Mnemonic 1", DEFAULT_DEV_MNEMONIC),
                KeystoreEntry::encrypted("Mnemonic 2", "AAAA"),
            ],
            active_index: Some(1),
        };

        let json: serde_json::Value = serde_json::to_value(&file).unwrap();
        assert_eq!(json["activeIndex"], 1);
        assert_eq!(json["keystore"][0]["type"], "plaintext");
        assert_eq!(json["keystore"][0]["label"], "Mnemonic 1");
        assert_eq!(json["keystore"][0]["mnemonic"], DEFAULT_DEV_MNEMONIC);
        assert_eq!(json["keystore"][1]["type"], "encoded");
    }

    #[test]
    fn null_active_index_round_trips() {
        let file = KeystoreFile::new();
        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains("\"activeIndex\":null"));

        let back: KeystoreFile = serde_json::from_str(&json).unwrap();
        assert!(back.active_index.is_none());
        assert!(back.entries.is_empty());
    }

    #[test]
    fn legacy_bare_phrase_migrates_to_active_plaintext_entry() {
        let file = from_legacy(&format!("{DEFAULT_DEV_MNEMONIC}\n")).unwrap();
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].kind, SecretKind::Plaintext);
        assert_eq!(file.entries[0].secret, DEFAULT_DEV_MNEMONIC);
        assert_eq!(file.active_index, Some(0));
    }

    #[test]
    fn legacy_entry_array_migrates_without_selection() {
        let raw = r#"[{"type":"plaintext","label":"old","mnemonic":"abandon ability"}]"#;
        let file = from_legacy(raw).unwrap();
        assert_eq!(file.entries.len(), 1);
        assert_eq!(file.entries[0].label, "old");
        assert!(file.active_index.is_none());
    }

    #[test]
    fn garbage_is_not_a_legacy_layout() {
        assert!(from_legacy("{\"keystore\": oops").is_none());
        assert!(from_legacy("not a mnemonic at all").is_none());
        assert!(from_legacy("TEST TEST TEST TEST TEST TEST TEST TEST TEST TEST TEST JUNK").is_none());
    }

    #[test]
    fn seeded_default_is_active_dev_phrase() {
        let file = KeystoreFile::seeded_default();
        assert_eq!(file.active_index, Some(0));
        assert_eq!(file.entries[0].secret, DEFAULT_DEV_MNEMONIC);
        assert_eq!(file.entries[0].label, "Default Keystore");
    }
}
