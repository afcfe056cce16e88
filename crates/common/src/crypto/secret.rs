//! Per-unit symmetric sealing
//!
//! A [`Secret`] is used for exactly one unit. It seals
//! `blake3(plaintext) || plaintext` with ChaCha20-Poly1305, so a unit that
//! authenticates but carries the wrong digest is still refused.

use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce, Tag};

pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;
pub const SECRET_SIZE: usize = 32;
pub const BLAKE3_HASH_SIZE: usize = blake3::OUT_LEN;
/// Growth of a sealed buffer over its plaintext
pub const SECRET_OVERHEAD: usize = NONCE_SIZE + BLAKE3_HASH_SIZE + TAG_SIZE;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("secret must be {SECRET_SIZE} bytes, got {0}")]
    Length(usize),

    #[error("could not draw a nonce: {0}")]
    Nonce(getrandom::Error),

    #[error("sealing failed")]
    Seal,

    #[error("sealed data is {0} bytes, too short to hold a nonce, digest and tag")]
    Truncated(usize),

    #[error("authentication failed")]
    Authentication,

    #[error("plaintext digest mismatch")]
    Digest,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Secret([u8; SECRET_SIZE]);

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl Secret {
    pub fn generate() -> Self {
        let mut key = [0u8; SECRET_SIZE];
        getrandom::getrandom(&mut key).expect("operating system RNG unavailable");
        Self(key)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SecretError> {
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| SecretError::Length(bytes.len()))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.0))
    }

    /// Seal `data` into `nonce || ciphertext || tag`.
    ///
    /// The buffer is laid out once and encrypted in place; the output is
    /// always `data.len() + SECRET_OVERHEAD` bytes.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let mut out = vec![0u8; NONCE_SIZE];
        getrandom::getrandom(&mut out).map_err(SecretError::Nonce)?;
        out.reserve(BLAKE3_HASH_SIZE + data.len() + TAG_SIZE);
        out.extend_from_slice(blake3::hash(data).as_bytes());
        out.extend_from_slice(data);

        let (nonce, body) = out.split_at_mut(NONCE_SIZE);
        let tag = self
            .cipher()
            .encrypt_in_place_detached(Nonce::from_slice(nonce), &[], body)
            .map_err(|_| SecretError::Seal)?;
        out.extend_from_slice(&tag);
        Ok(out)
    }

    /// Open a buffer produced by [`Secret::encrypt`] and return the plaintext.
    pub fn decrypt(&self, sealed: &[u8]) -> Result<Vec<u8>, SecretError> {
        if sealed.len() < SECRET_OVERHEAD {
            return Err(SecretError::Truncated(sealed.len()));
        }
        let (nonce, rest) = sealed.split_at(NONCE_SIZE);
        let (body, tag) = rest.split_at(rest.len() - TAG_SIZE);

        let mut opened = body.to_vec();
        self.cipher()
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                &[],
                &mut opened,
                Tag::from_slice(tag),
            )
            .map_err(|_| SecretError::Authentication)?;

        let plaintext = opened.split_off(BLAKE3_HASH_SIZE);
        if blake3::hash(&plaintext).as_bytes()[..] != opened[..] {
            return Err(SecretError::Digest);
        }
        Ok(plaintext)
    }
}
