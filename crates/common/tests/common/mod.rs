//! Shared test utilities for identity and stream integration tests
#![allow(dead_code)]

use common::identity::Identity;
use common::stream::{CipherStream, Encoding};
use tempfile::TempDir;

/// Small chunks so multi-unit streams stay cheap to build
pub const TEST_CHUNK_SIZE: usize = 64;

/// Deterministic, non-repeating-looking plaintext
pub fn plaintext(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

pub fn cipher(identity: &Identity, encoding: Encoding) -> CipherStream<'_> {
    CipherStream::new(identity)
        .with_chunk_size(TEST_CHUNK_SIZE)
        .with_encoding(encoding)
}

pub fn encrypt(identity: &Identity, data: &[u8], encoding: Encoding) -> Vec<u8> {
    let mut out = Vec::new();
    cipher(identity, encoding).encrypt(data, &mut out).unwrap();
    out
}

/// A scratch directory holding a freshly generated identity file
pub fn setup_identity_file() -> (Identity, std::path::PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let identity = Identity::generate();
    let path = temp_dir.path().join("identity.pem");
    identity.to_file(&path).unwrap();
    (identity, path, temp_dir)
}
