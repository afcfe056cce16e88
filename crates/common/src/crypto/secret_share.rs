//! Key wrapping for a single recipient
//!
//! A throwaway keypair agrees on a shared point with the recipient over
//! X25519, and that point is the AES-256 key-encryption key (RFC 3394) for
//! the unit secret. The share carries the throwaway public key in front of
//! the wrapped secret:
//!
//! ```text
//! [ ephemeral public key: 32 ][ wrapped secret: 40 ]
//! ```
//!
//! Key wrap has its own integrity check, so unwrapping with any other
//! private key fails instead of producing a wrong secret.

use aes_kw::KekAes256;
use x25519_dalek::SharedSecret;

use super::keys::{KeyError, PublicKey, SecretKey, PUBLIC_KEY_SIZE};
use super::secret::{Secret, SECRET_SIZE};

/// Integrity block AES-KW prepends to the wrapped key
const KW_BLOCK_SIZE: usize = 8;
const WRAPPED_SIZE: usize = SECRET_SIZE + KW_BLOCK_SIZE;
pub const SECRET_SHARE_SIZE: usize = PUBLIC_KEY_SIZE + WRAPPED_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum SecretShareError {
    #[error("share must be {SECRET_SHARE_SIZE} bytes, got {0}")]
    Length(usize),

    #[error("ephemeral key: {0}")]
    EphemeralKey(#[from] KeyError),

    #[error("could not wrap secret")]
    Wrap,

    #[error("share was not made for this key")]
    Unwrap,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SecretShare([u8; SECRET_SHARE_SIZE]);

impl Default for SecretShare {
    fn default() -> Self {
        Self([0; SECRET_SHARE_SIZE])
    }
}

impl std::fmt::Debug for SecretShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretShare({})", hex::encode(self.ephemeral_bytes()))
    }
}

impl TryFrom<&[u8]> for SecretShare {
    type Error = SecretShareError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| SecretShareError::Length(bytes.len()))
    }
}

fn kek(shared: SharedSecret) -> KekAes256 {
    KekAes256::from(*shared.as_bytes())
}

impl SecretShare {
    /// Wrap `secret` so only the holder of `recipient`'s private key can
    /// recover it.
    pub fn new(secret: &Secret, recipient: &PublicKey) -> Result<Self, SecretShareError> {
        let ephemeral = SecretKey::generate();
        let shared = ephemeral
            .agreement_key()
            .diffie_hellman(&recipient.agreement_key());

        let mut share = Self::default();
        let (head, wrapped) = share.0.split_at_mut(PUBLIC_KEY_SIZE);
        head.copy_from_slice(&ephemeral.public().to_bytes());
        kek(shared)
            .wrap(secret.bytes(), wrapped)
            .map_err(|_| SecretShareError::Wrap)?;
        Ok(share)
    }

    pub fn recover(&self, recipient: &SecretKey) -> Result<Secret, SecretShareError> {
        let ephemeral = PublicKey::try_from(self.ephemeral_bytes())?;
        let shared = recipient
            .agreement_key()
            .diffie_hellman(&ephemeral.agreement_key());

        let mut unwrapped = [0u8; SECRET_SIZE];
        kek(shared)
            .unwrap(&self.0[PUBLIC_KEY_SIZE..], &mut unwrapped)
            .map_err(|_| SecretShareError::Unwrap)?;
        Ok(Secret::from(unwrapped))
    }

    fn ephemeral_bytes(&self) -> &[u8] {
        &self.0[..PUBLIC_KEY_SIZE]
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
