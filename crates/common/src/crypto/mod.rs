//! Cryptographic primitives behind an rnid identity
//!
//! - **Identity keys**: Ed25519 keypairs (`SecretKey`/`PublicKey`) used for
//!   signatures and, after conversion to X25519, for key agreement
//! - **Unit encryption**: ChaCha20-Poly1305 under a fresh `Secret` per unit
//! - **Key wrapping**: ECDH with an ephemeral key plus AES-KW (`SecretShare`)
//!
//! # Ciphertext unit
//!
//! Encrypting a buffer for an identity produces one self-contained unit:
//!
//! ```text
//! [ share: 72 ][ nonce: 12 ][ sealed(blake3(plaintext) || plaintext) ][ tag: 16 ]
//! ```
//!
//! Any unit can be opened on its own by the holder of the matching private key.

mod keys;
mod secret;
mod secret_share;

pub use ed25519_dalek::{Signature, SIGNATURE_LENGTH};
pub use keys::{
    KeyError, PublicKey, SecretKey, PRIVATE_KEY_PEM_TAG, PRIVATE_KEY_SIZE, PUBLIC_KEY_PEM_TAG,
    PUBLIC_KEY_SIZE,
};
pub use secret::{Secret, SecretError, BLAKE3_HASH_SIZE, SECRET_OVERHEAD};
pub use secret_share::{SecretShare, SecretShareError, SECRET_SHARE_SIZE};

/// Bytes a ciphertext unit adds on top of its plaintext chunk
pub const UNIT_OVERHEAD: usize = SECRET_SHARE_SIZE + SECRET_OVERHEAD;
