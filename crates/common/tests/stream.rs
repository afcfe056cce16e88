//! Integration tests for chunked encryption and decryption

mod common;

use std::io::{self, Read};

use ::common::crypto::UNIT_OVERHEAD;
use ::common::identity::Identity;
use ::common::stream::{CipherStream, Encoding, StreamError};

use common::{cipher, encrypt, plaintext, TEST_CHUNK_SIZE};

const CS: usize = TEST_CHUNK_SIZE;

#[test]
fn test_round_trip_binary() {
    let identity = Identity::generate();
    for len in [0, 1, CS - 1, CS, CS + 1, 3 * CS] {
        let data = plaintext(len);
        let ciphertext = encrypt(&identity, &data, Encoding::Binary);

        let mut recovered = Vec::new();
        let written = cipher(&identity, Encoding::Binary)
            .decrypt(ciphertext.as_slice(), &mut recovered)
            .unwrap();
        assert_eq!(written, len as u64);
        assert_eq!(recovered, data, "length {len}");
    }
}

#[test]
fn test_round_trip_base64() {
    let identity = Identity::generate();
    for len in [0, 1, CS - 1, CS, CS + 1, 3 * CS] {
        let data = plaintext(len);
        let ciphertext = encrypt(&identity, &data, Encoding::Base64);
        assert!(ciphertext.is_ascii());

        let mut recovered = Vec::new();
        cipher(&identity, Encoding::Base64)
            .decrypt(ciphertext.as_slice(), &mut recovered)
            .unwrap();
        assert_eq!(recovered, data, "length {len}");
    }
}

#[test]
fn test_one_unit_per_chunk() {
    let identity = Identity::generate();

    let exact = encrypt(&identity, &plaintext(3 * CS), Encoding::Base64);
    assert_eq!(String::from_utf8(exact).unwrap().lines().count(), 3);

    let spill = encrypt(&identity, &plaintext(3 * CS + 1), Encoding::Base64);
    assert_eq!(String::from_utf8(spill).unwrap().lines().count(), 4);
}

#[test]
fn test_binary_size_accounts_for_framing() {
    let identity = Identity::generate();
    let mut out = Vec::new();
    let written = cipher(&identity, Encoding::Binary)
        .encrypt(plaintext(CS + 1).as_slice(), &mut out)
        .unwrap();

    assert_eq!(written, out.len() as u64);
    assert_eq!(out.len(), 2 * (4 + UNIT_OVERHEAD) + CS + 1);
}

#[test]
fn test_empty_input_is_empty_output() {
    let identity = Identity::generate();
    assert!(encrypt(&identity, b"", Encoding::Binary).is_empty());

    let mut recovered = Vec::new();
    let written = CipherStream::new(&identity)
        .decrypt(io::empty(), &mut recovered)
        .unwrap();
    assert_eq!(written, 0);
    assert!(recovered.is_empty());
}

#[test]
fn test_wrong_key_fails() {
    let alice = Identity::generate();
    let mallory = Identity::generate();
    let ciphertext = encrypt(&alice, &plaintext(2 * CS), Encoding::Binary);

    let mut recovered = Vec::new();
    let result = cipher(&mallory, Encoding::Binary).decrypt(ciphertext.as_slice(), &mut recovered);
    assert!(matches!(
        result,
        Err(StreamError::DecryptionFailed { index: 0, .. })
    ));
    assert!(recovered.is_empty());
}

#[test]
fn test_encrypt_for_public_only_identity() {
    let recipient = Identity::generate();
    let ciphertext = encrypt(&recipient.to_public(), &plaintext(CS + 5), Encoding::Binary);

    let mut recovered = Vec::new();
    cipher(&recipient, Encoding::Binary)
        .decrypt(ciphertext.as_slice(), &mut recovered)
        .unwrap();
    assert_eq!(recovered, plaintext(CS + 5));
}

/// Panics if anything reads from it
struct Untouchable;

impl Read for Untouchable {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        panic!("input was read");
    }
}

#[test]
fn test_no_private_key_before_any_read() {
    let public = Identity::generate().to_public();
    let mut out = Vec::new();
    let result = CipherStream::new(&public).decrypt(Untouchable, &mut out);
    assert!(matches!(result, Err(StreamError::NoPrivateKey)));
}

#[test]
fn test_truncation_keeps_whole_units() {
    let identity = Identity::generate();
    let data = plaintext(3 * CS);
    let ciphertext = encrypt(&identity, &data, Encoding::Binary);

    // Cut into the third unit
    let unit_len = 4 + UNIT_OVERHEAD + CS;
    let truncated = &ciphertext[..2 * unit_len + 10];

    let mut recovered = Vec::new();
    let result = cipher(&identity, Encoding::Binary).decrypt(truncated, &mut recovered);
    assert!(matches!(
        result,
        Err(StreamError::DecryptionFailed { index: 2, .. })
    ));
    assert_eq!(recovered, &data[..2 * CS]);
}

#[test]
fn test_corrupted_unit_reports_its_index() {
    let identity = Identity::generate();
    let mut ciphertext = encrypt(&identity, &plaintext(2 * CS), Encoding::Binary);

    let unit_len = 4 + UNIT_OVERHEAD + CS;
    ciphertext[unit_len + 100] ^= 0xff;

    let mut recovered = Vec::new();
    let result = cipher(&identity, Encoding::Binary).decrypt(ciphertext.as_slice(), &mut recovered);
    assert!(matches!(
        result,
        Err(StreamError::DecryptionFailed { index: 1, .. })
    ));
    assert_eq!(recovered.len(), CS);
}

#[test]
fn test_encoding_mismatch_fails() {
    let identity = Identity::generate();
    let ciphertext = encrypt(&identity, &plaintext(10), Encoding::Binary);

    let mut recovered = Vec::new();
    let result = cipher(&identity, Encoding::Base64).decrypt(ciphertext.as_slice(), &mut recovered);
    assert!(matches!(result, Err(StreamError::DecryptionFailed { .. })));
}

#[test]
fn test_chunk_size_is_clamped() {
    let identity = Identity::generate();
    assert_eq!(CipherStream::new(&identity).with_chunk_size(0).chunk_size(), 1);
    assert_eq!(
        CipherStream::new(&identity)
            .with_chunk_size(usize::MAX)
            .chunk_size(),
        ::common::stream::DEFAULT_CHUNK_SIZE
    );
}
