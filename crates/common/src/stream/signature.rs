use std::io::{self, Read};

use crate::crypto::{Signature, BLAKE3_HASH_SIZE};
use crate::identity::{Identity, IdentityError};

use super::StreamError;

/// BLAKE3 digest of everything `reader` yields
pub fn stream_digest<R: Read>(mut reader: R) -> io::Result<[u8; BLAKE3_HASH_SIZE]> {
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(*hasher.finalize().as_bytes())
}

/// Sign a stream of any length
///
/// The input is hashed incrementally and the Ed25519 signature covers the
/// 32-byte digest, so memory use does not grow with the input.
pub fn sign_stream<R: Read>(identity: &Identity, reader: R) -> Result<Signature, StreamError> {
    if !identity.has_private_key() {
        return Err(StreamError::NoPrivateKey);
    }
    let digest = stream_digest(reader)?;
    identity.sign(&digest).map_err(|_| StreamError::NoPrivateKey)
}

/// Check a signature made by [`sign_stream`]
///
/// Returns `Ok(false)` for a signature that does not match; I/O problems are
/// errors.
pub fn verify_stream<R: Read>(
    identity: &Identity,
    reader: R,
    signature: &Signature,
) -> Result<bool, StreamError> {
    let digest = stream_digest(reader)?;
    match identity.verify(&digest, signature) {
        Ok(()) => Ok(true),
        Err(IdentityError::InvalidSignature) => Ok(false),
        Err(e) => Err(io::Error::other(e).into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sign_and_verify_stream() {
        let identity = Identity::generate();
        let data = vec![7u8; 100_000];

        let signature = sign_stream(&identity, data.as_slice()).unwrap();
        assert!(verify_stream(&identity.to_public(), data.as_slice(), &signature).unwrap());

        let mut tampered = data.clone();
        tampered[99_999] ^= 1;
        assert!(!verify_stream(&identity, tampered.as_slice(), &signature).unwrap());
    }

    #[test]
    fn test_signing_needs_private_key() {
        let public = Identity::generate().to_public();
        assert!(matches!(
            sign_stream(&public, &b"data"[..]),
            Err(StreamError::NoPrivateKey)
        ));
    }

    #[test]
    fn test_other_identity_rejects_signature() {
        let alice = Identity::generate();
        let bob = Identity::generate();
        let signature = sign_stream(&alice, &b"data"[..]).unwrap();
        assert!(!verify_stream(&bob, &b"data"[..], &signature).unwrap());
    }
}
