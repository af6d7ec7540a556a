//! Address encoding for the two supported chains.
//!
//! Both spaces start from the same 20-byte account hash (Keccak-256 of the
//! uncompressed secp256k1 public key, last 20 bytes). eSpace renders it as a
//! hex address with the EIP-55 mixed-case checksum; Core space forces the
//! account-type nibble to `0x1` and encodes per CIP-37 (network prefix,
//! 5-bit base32 payload, 8-symbol BCH checksum).

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use super::{Result, WalletError};

/// CIP-37 base32 alphabet (no `i`, `l`, `o`, `q`)
const CHARSET: &[u8; 32] = b"abcdefghjkmnprstuvwxyz0123456789";

/// CIP-37 version byte for a plain account address
const VERSION_BYTE: u8 = 0x00;

/// Computes the 20-byte account hash for a secp256k1 secret key.
fn account_hash(secret: &[u8; 32]) -> Result<[u8; 20]> {
    let key_bytes: k256::FieldBytes = (*secret).into();
    let signing_key =
        SigningKey::from_bytes(&key_bytes).map_err(|e| WalletError::Derivation(e.to_string()))?;
    let point = signing_key.verifying_key().to_encoded_point(false);

    // Skip the 0x04 SEC1 tag; hash the raw 64-byte public key.
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Ok(out)
}

/// eSpace address for a secret key: 20-byte hex with EIP-55 checksum.
pub fn espace_address(secret: &[u8; 32]) -> Result<String> {
    Ok(eip55_checksum(&account_hash(secret)?))
}

/// Core space address for a secret key, CIP-37 encoded for `network_id`.
pub fn core_address(secret: &[u8; 32], network_id: u32) -> Result<String> {
    let mut hash = account_hash(secret)?;
    // Core space account addresses carry type nibble 0x1.
    hash[0] = (hash[0] & 0x0f) | 0x10;
    Ok(cip37_encode(&hash, network_id))
}

/// Applies the EIP-55 mixed-case checksum to a 20-byte address.
pub(crate) fn eip55_checksum(address: &[u8; 20]) -> String {
    let hex_addr = hex::encode(address);
    let hash = Keccak256::digest(hex_addr.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in hex_addr.chars().enumerate() {
        let nibble = (hash[i / 2] >> (4 * (1 - (i % 2)))) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Network prefix per CIP-37: reserved names for mainnet and testnet,
/// `net{id}` for everything else (dev nodes included).
pub(crate) fn network_prefix(network_id: u32) -> String {
    match network_id {
        1029 => "cfx".to_string(),
        1 => "cfxtest".to_string(),
        id => format!("net{id}"),
    }
}

/// Encodes a 20-byte address as a CIP-37 base32 string for `network_id`.
pub(crate) fn cip37_encode(address: &[u8; 20], network_id: u32) -> String {
    let prefix = network_prefix(network_id);

    let mut payload = Vec::with_capacity(1 + address.len());
    payload.push(VERSION_BYTE);
    payload.extend_from_slice(address);
    let payload5 = to_five_bit_groups(&payload);

    // Checksum covers the lowered prefix, a zero separator, the payload and
    // eight zero placeholder symbols.
    let mut checksum_input: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    checksum_input.push(0);
    checksum_input.extend_from_slice(&payload5);
    checksum_input.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_input);

    let mut out = String::with_capacity(prefix.len() + 1 + payload5.len() + 8);
    out.push_str(&prefix);
    out.push(':');
    for &group in &payload5 {
        out.push(CHARSET[group as usize] as char);
    }
    for i in (0..8).rev() {
        out.push(CHARSET[((checksum >> (i * 5)) & 0x1f) as usize] as char);
    }
    out
}

/// Regroups bytes into 5-bit groups, zero-padding the final group.
fn to_five_bit_groups(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((data.len() * 8).div_ceil(5));
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

/// BCH checksum over 5-bit groups, as specified by CIP-37.
fn polymod(data: &[u8]) -> u64 {
    let mut c: u64 = 1;
    for &d in data {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        if c0 & 0x01 != 0 {
            c ^= 0x98_f2bc_8e61;
        }
        if c0 & 0x02 != 0 {
            c ^= 0x79_b76d_99e2;
        }
        if c0 & 0x04 != 0 {
            c ^= 0xf3_3e5f_b3c4;
        }
        if c0 & 0x08 != 0 {
            c ^= 0xae_2eab_e2a8;
        }
        if c0 & 0x10 != 0 {
            c ^= 0x1e_4f43_e470;
        }
    }
    c ^ 1
}
