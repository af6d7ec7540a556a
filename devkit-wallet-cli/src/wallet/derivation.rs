//! Deterministic key derivation from a resolved mnemonic.
//!
//! Keys are pure functions of `(mnemonic, derivation path)`: the BIP-39 seed
//! (empty passphrase) is fed through BIP-32, with one coin type per chain.
//! Nothing derived here is ever cached to disk.

use std::str::FromStr;

use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::{Chain, Result, WalletError, address};

/// BIP-44 coin type for Conflux Core space
pub const CORE_COIN_TYPE: u32 = 503;

/// BIP-44 coin type for eSpace (shared with Ethereum)
pub const ESPACE_COIN_TYPE: u32 = 60;

/// Builds the BIP-44 account path for `chain` at `index`.
pub fn derivation_path(chain: Chain, index: u32) -> String {
    let coin_type = match chain {
        Chain::Core => CORE_COIN_TYPE,
        Chain::Espace => ESPACE_COIN_TYPE,
    };
    format!("m/44'/{coin_type}'/0'/0/{index}")
}

/// One derived account: secret key plus its chain-specific address.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedAccount {
    pub index: u32,
    pub secret_key: [u8; 32],
    pub address: String,
}

impl DerivedAccount {
    pub fn secret_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret_key))
    }
}

/// HD wallet over one resolved mnemonic.
pub struct HdWallet {
    seed: Zeroizing<[u8; 64]>,
    /// Network id used for Core space address prefixes
    core_network_id: u32,
}

impl HdWallet {
    /// Builds a wallet from a mnemonic phrase. The phrase must be a valid
    /// BIP-39 English mnemonic (word list and checksum).
    pub fn from_phrase(phrase: &str, core_network_id: u32) -> Result<Self> {
        let mnemonic =
            Mnemonic::parse(phrase).map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(Self {
            seed: Zeroizing::new(mnemonic.to_seed("")),
            core_network_id,
        })
    }

    /// Derives the secret key at an explicit BIP-32 path.
    pub fn private_key_for(&self, path: &str) -> Result<Zeroizing<[u8; 32]>> {
        let path = DerivationPath::from_str(path)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;
        let child = XPrv::derive_from_path(&self.seed[..], &path)
            .map_err(|e| WalletError::Derivation(e.to_string()))?;
        Ok(Zeroizing::new(child.private_key().to_bytes().into()))
    }

    /// Secret key for the Core space account at `index`.
    pub fn core_private_key(&self, index: u32) -> Result<Zeroizing<[u8; 32]>> {
        self.private_key_for(&derivation_path(Chain::Core, index))
    }

    /// Secret key for the eSpace account at `index`.
    pub fn espace_private_key(&self, index: u32) -> Result<Zeroizing<[u8; 32]>> {
        self.private_key_for(&derivation_path(Chain::Espace, index))
    }

    /// Address for a secret key in the given chain's encoding.
    pub fn address_for(&self, secret: &[u8; 32], chain: Chain) -> Result<String> {
        match chain {
            Chain::Core => address::core_address(secret, self.core_network_id),
            Chain::Espace => address::espace_address(secret),
        }
    }

    /// Derives the account (key and address) for `chain` at `index`.
    pub fn account(&self, chain: Chain, index: u32) -> Result<DerivedAccount> {
        let secret = self.private_key_for(&derivation_path(chain, index))?;
        let address = self.address_for(&secret, chain)?;
        Ok(DerivedAccount {
            index,
            secret_key: *secret,
            address,
        })
    }

    /// Derives accounts for the inclusive index range `from..=to`.
    ///
    /// Fails with [`WalletError::InvalidRange`] before any derivation when
    /// `from > to`.
    pub fn derive_batch(&self, chain: Chain, from: u32, to: u32) -> Result<Vec<DerivedAccount>> {
        if from > to {
            return Err(WalletError::InvalidRange { from, to });
        }
        (from..=to).map(|index| self.account(chain, index)).collect()
    }
}
