//! Streaming encryption, decryption and signing of arbitrary-size inputs
//!
//! Plaintext is cut into chunks of at most `chunk_size` bytes and each chunk
//! becomes one ciphertext unit (see [`crate::crypto`]). Units vary in length,
//! so every unit is framed on the way out and read back frame by frame:
//!
//! ```text
//! binary: [ len: u32 BE ][ unit ] [ len: u32 BE ][ unit ] ...
//! base64: <base64(unit)>\n<base64(unit)>\n ...
//! ```
//!
//! There is no file header: empty plaintext encrypts to an empty stream, and
//! an empty stream decrypts to empty plaintext.

mod cipher;
mod frame;
mod signature;

use crate::crypto::UNIT_OVERHEAD;

pub use cipher::{CipherStream, StreamError};
pub use frame::FrameError;
pub use signature::{sign_stream, stream_digest, verify_stream};

/// Default, and largest, plaintext chunk size
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024 * 1024;
/// Largest unit a reader will accept
pub const MAX_UNIT_SIZE: usize = DEFAULT_CHUNK_SIZE + UNIT_OVERHEAD;

/// How units are laid out in the ciphertext stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Length-prefixed raw units
    #[default]
    Binary,
    /// One base64 line per unit
    Base64,
}
