//! Identity handles
//!
//! An [`Identity`] is a public key, an optional private key and the
//! [`AddressHash`] derived from the public key. Handles are created once per
//! invocation (from a file, or recalled from the known-identity cache) and
//! never change afterwards.
//!
//! A handle without a private key can still encrypt for the identity and
//! verify its signatures; decrypting and signing need the private key.

mod address;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::crypto::{
    PublicKey, Secret, SecretKey, SecretShare, Signature, PRIVATE_KEY_PEM_TAG, PRIVATE_KEY_SIZE,
    PUBLIC_KEY_PEM_TAG, SECRET_SHARE_SIZE,
};

pub use address::{AddressError, AddressHash, ADDRESS_HASH_SIZE, ADDRESS_HEX_LEN};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity does not hold a private key")]
    NoPrivateKey,

    #[error("encryption failed: {0}")]
    Encrypt(String),

    #[error("unit could not be decrypted: {0}")]
    Decrypt(String),

    #[error("signature is not valid for this identity")]
    InvalidSignature,

    #[error("could not decode identity: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct Identity {
    public_key: PublicKey,
    secret_key: Option<SecretKey>,
    address: AddressHash,
}

impl Identity {
    /// Create a fresh identity with a random private key
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate())
    }

    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public();
        Self {
            address: AddressHash::from_public_key(&public_key),
            public_key,
            secret_key: Some(secret_key),
        }
    }

    /// A handle that can only encrypt-for and verify-against this key
    pub fn from_public_key(public_key: PublicKey) -> Self {
        Self {
            address: AddressHash::from_public_key(&public_key),
            public_key,
            secret_key: None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.secret_key.is_some()
    }

    pub fn address_hash(&self) -> AddressHash {
        self.address
    }

    /// Drop the private key, keeping a handle that can still encrypt and verify
    pub fn to_public(&self) -> Self {
        Self::from_public_key(self.public_key)
    }

    /// Encrypt one buffer into a self-contained ciphertext unit
    ///
    /// A fresh symmetric secret seals the plaintext and is wrapped for this
    /// identity's public key, so the output length is
    /// `plaintext.len() + UNIT_OVERHEAD`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let secret = Secret::generate();
        let share = SecretShare::new(&secret, &self.public_key)
            .map_err(|e| IdentityError::Encrypt(e.to_string()))?;
        let sealed = secret
            .encrypt(plaintext)
            .map_err(|e| IdentityError::Encrypt(e.to_string()))?;

        let mut unit = Vec::with_capacity(SECRET_SHARE_SIZE + sealed.len());
        unit.extend_from_slice(share.bytes());
        unit.extend_from_slice(&sealed);
        Ok(unit)
    }

    /// Open a ciphertext unit produced by [`Identity::encrypt`]
    ///
    /// Never returns plaintext for a unit made for a different identity; the
    /// key unwrap fails first.
    pub fn decrypt(&self, unit: &[u8]) -> Result<Vec<u8>, IdentityError> {
        let secret_key = self.secret_key.as_ref().ok_or(IdentityError::NoPrivateKey)?;

        if unit.len() < SECRET_SHARE_SIZE {
            return Err(IdentityError::Decrypt(format!(
                "unit of {} bytes is shorter than its key share",
                unit.len()
            )));
        }

        let (share, sealed) = unit.split_at(SECRET_SHARE_SIZE);
        let share = SecretShare::try_from(share).map_err(|e| IdentityError::Decrypt(e.to_string()))?;
        let secret = share
            .recover(secret_key)
            .map_err(|e| IdentityError::Decrypt(e.to_string()))?;
        secret
            .decrypt(sealed)
            .map_err(|e| IdentityError::Decrypt(e.to_string()))
    }

    pub fn sign(&self, msg: &[u8]) -> Result<Signature, IdentityError> {
        let secret_key = self.secret_key.as_ref().ok_or(IdentityError::NoPrivateKey)?;
        Ok(secret_key.sign(msg))
    }

    pub fn verify(&self, msg: &[u8], signature: &Signature) -> Result<(), IdentityError> {
        self.public_key
            .verify(msg, signature)
            .map_err(|_| IdentityError::InvalidSignature)
    }

    /// Encode the identity as PEM
    ///
    /// Identities holding a private key are written under "PRIVATE KEY" (the
    /// public key is derived on load); public-only handles under "PUBLIC KEY".
    pub fn to_pem(&self) -> String {
        match &self.secret_key {
            Some(secret_key) => secret_key.to_pem(),
            None => self.public_key.to_pem(),
        }
    }

    /// Parse an identity from PEM
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Decode`] if:
    /// - The PEM string is malformed
    /// - The tag is neither "PRIVATE KEY" nor "PUBLIC KEY"
    /// - The key size is incorrect or the public key is not a curve point
    pub fn from_pem(pem_str: &str) -> Result<Self, IdentityError> {
        let pem = pem::parse(pem_str)
            .map_err(|e| IdentityError::Decode(format!("failed to parse PEM: {}", e)))?;
        let contents = pem.contents();

        match pem.tag() {
            PRIVATE_KEY_PEM_TAG => {
                let bytes: [u8; PRIVATE_KEY_SIZE] = contents.try_into().map_err(|_| {
                    IdentityError::Decode(format!(
                        "invalid private key size, expected {}, got {}",
                        PRIVATE_KEY_SIZE,
                        contents.len()
                    ))
                })?;
                Ok(Self::from_secret_key(SecretKey::from(bytes)))
            }
            PUBLIC_KEY_PEM_TAG => {
                let public_key = PublicKey::try_from(contents)
                    .map_err(|e| IdentityError::Decode(e.to_string()))?;
                Ok(Self::from_public_key(public_key))
            }
            other => Err(IdentityError::Decode(format!(
                "unexpected PEM tag {:?}",
                other
            ))),
        }
    }

    /// Load an identity file
    ///
    /// I/O failures surface as [`IdentityError::Io`], bad contents as
    /// [`IdentityError::Decode`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, IdentityError> {
        let bytes = fs::read(path)?;
        let pem_str = std::str::from_utf8(&bytes)
            .map_err(|_| IdentityError::Decode("identity file is not PEM text".to_string()))?;
        Self::from_pem(pem_str)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), IdentityError> {
        fs::write(path, self.to_pem())?;
        Ok(())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address)
            .field("public_key", &self.public_key.to_hex())
            .field("private", &self.has_private_key())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::UNIT_OVERHEAD;

    #[test]
    fn test_unit_roundtrip() {
        let identity = Identity::generate();
        let plaintext = b"one chunk of plaintext";

        let unit = identity.encrypt(plaintext).unwrap();
        assert_eq!(unit.len(), plaintext.len() + UNIT_OVERHEAD);
        assert_eq!(identity.decrypt(&unit).unwrap(), plaintext);
    }

    #[test]
    fn test_units_are_not_deterministic() {
        let identity = Identity::generate();
        let a = identity.encrypt(b"same").unwrap();
        let b = identity.encrypt(b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_identity_cannot_decrypt() {
        let alice = Identity::generate();
        let bob = Identity::generate();

        let unit = alice.encrypt(b"for alice only").unwrap();
        assert!(matches!(bob.decrypt(&unit), Err(IdentityError::Decrypt(_))));
    }

    #[test]
    fn test_public_only_handle() {
        let identity = Identity::generate();
        let public = identity.to_public();

        assert!(!public.has_private_key());
        assert_eq!(public.address_hash(), identity.address_hash());

        let unit = public.encrypt(b"still encryptable").unwrap();
        assert!(matches!(public.decrypt(&unit), Err(IdentityError::NoPrivateKey)));
        assert!(matches!(public.sign(b"msg"), Err(IdentityError::NoPrivateKey)));
        assert_eq!(identity.decrypt(&unit).unwrap(), b"still encryptable");
    }

    #[test]
    fn test_truncated_unit_rejected() {
        let identity = Identity::generate();
        let unit = identity.encrypt(b"abc").unwrap();

        assert!(identity.decrypt(&unit[..10]).is_err());
        assert!(identity.decrypt(&unit[..unit.len() - 1]).is_err());
    }

    #[test]
    fn test_sign_verify() {
        let identity = Identity::generate();
        let signature = identity.sign(b"message").unwrap();

        assert!(identity.to_public().verify(b"message", &signature).is_ok());
        assert!(matches!(
            identity.verify(b"massage", &signature),
            Err(IdentityError::InvalidSignature)
        ));
    }

    #[test]
    fn test_pem_roundtrip() {
        let identity = Identity::generate();

        let loaded = Identity::from_pem(&identity.to_pem()).unwrap();
        assert!(loaded.has_private_key());
        assert_eq!(loaded.address_hash(), identity.address_hash());

        let public = Identity::from_pem(&identity.to_public().to_pem()).unwrap();
        assert!(!public.has_private_key());
        assert_eq!(public.public_key(), identity.public_key());
    }

    #[test]
    fn test_pem_rejects_garbage() {
        assert!(matches!(
            Identity::from_pem("not a pem"),
            Err(IdentityError::Decode(_))
        ));

        let wrong_tag = pem::encode(&pem::Pem::new("CERTIFICATE", vec![0u8; 32]));
        assert!(matches!(
            Identity::from_pem(&wrong_tag),
            Err(IdentityError::Decode(_))
        ));

        let short = pem::encode(&pem::Pem::new(PRIVATE_KEY_PEM_TAG, vec![0u8; 12]));
        assert!(matches!(
            Identity::from_pem(&short),
            Err(IdentityError::Decode(_))
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.pem");

        let identity = Identity::generate();
        identity.to_file(&path).unwrap();

        let loaded = Identity::from_file(&path).unwrap();
        assert_eq!(loaded.address_hash(), identity.address_hash());

        std::fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            Identity::from_file(&path),
            Err(IdentityError::Decode(_))
        ));
    }
}
