use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::crypto::PublicKey;

/// Size of an address hash in bytes (128-bit truncated SHA-256)
pub const ADDRESS_HASH_SIZE: usize = 16;
/// Length of an address hash written as hex
pub const ADDRESS_HEX_LEN: usize = ADDRESS_HASH_SIZE * 2;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address hash must be {ADDRESS_HEX_LEN} hex characters, got {0}")]
    Length(usize),
    #[error("address hash is not valid hex")]
    Hex,
}

/// Fixed-width identifier derived from an identity's public key.
///
/// This is the reference users share with each other: `rnid -i <hash>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressHash([u8; ADDRESS_HASH_SIZE]);

impl AddressHash {
    /// Derive the address of a public key
    pub fn from_public_key(key: &PublicKey) -> Self {
        let digest = Sha256::digest(key.to_bytes());
        let mut bytes = [0u8; ADDRESS_HASH_SIZE];
        bytes.copy_from_slice(&digest[..ADDRESS_HASH_SIZE]);
        Self(bytes)
    }

    /// Parse an address from exactly [`ADDRESS_HEX_LEN`] hex characters
    pub fn from_hex(hex: &str) -> Result<Self, AddressError> {
        if hex.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::Length(hex.len()));
        }
        let mut bytes = [0u8; ADDRESS_HASH_SIZE];
        hex::decode_to_slice(hex, &mut bytes).map_err(|_| AddressError::Hex)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_HASH_SIZE] {
        &self.0
    }
}

impl From<[u8; ADDRESS_HASH_SIZE]> for AddressHash {
    fn from(bytes: [u8; ADDRESS_HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl FromStr for AddressHash {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.to_hex())
    }
}

impl fmt::Debug for AddressHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AddressHash({})", self.to_hex())
    }
}
