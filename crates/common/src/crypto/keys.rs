use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use x25519_dalek::{PublicKey as AgreementPublic, StaticSecret as AgreementSecret};

pub const PRIVATE_KEY_SIZE: usize = 32;
pub const PUBLIC_KEY_SIZE: usize = 32;

/// PEM tag of an identity file that carries the Ed25519 seed
pub const PRIVATE_KEY_PEM_TAG: &str = "PRIVATE KEY";
/// PEM tag of an identity file that carries only the verifying key
pub const PUBLIC_KEY_PEM_TAG: &str = "PUBLIC KEY";

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("expected {expected} key bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("public key is not a point on the curve")]
    NotOnCurve,
}

/// Copy `bytes` into a fixed-size key buffer, rejecting any other length
fn key_bytes<const N: usize>(bytes: &[u8]) -> Result<[u8; N], KeyError> {
    bytes.try_into().map_err(|_| KeyError::Length {
        expected: N,
        actual: bytes.len(),
    })
}

fn pem_string(tag: &str, contents: [u8; 32]) -> String {
    pem::encode(&pem::Pem::new(tag, contents))
}

/// Public half of an identity.
///
/// Verifies the identity's signatures and, mapped onto Curve25519, is the
/// recipient side of the key agreement every ciphertext unit starts with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(VerifyingKey);

impl TryFrom<[u8; PUBLIC_KEY_SIZE]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: [u8; PUBLIC_KEY_SIZE]) -> Result<Self, Self::Error> {
        VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| KeyError::NotOnCurve)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::try_from(key_bytes::<PUBLIC_KEY_SIZE>(bytes)?)
    }
}

impl FromStr for PublicKey {
    type Err = KeyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl PublicKey {
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        Self::try_from(hex::decode(hex.trim())?.as_slice())
    }

    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn to_pem(&self) -> String {
        pem_string(PUBLIC_KEY_PEM_TAG, self.to_bytes())
    }

    /// The same point in Montgomery form, for X25519
    pub(crate) fn agreement_key(&self) -> AgreementPublic {
        AgreementPublic::from(self.0.to_montgomery().to_bytes())
    }

    /// Check a detached signature over `msg`.
    ///
    /// Uses strict verification, so small-order keys and non-canonical
    /// signatures are refused.
    pub fn verify(
        &self,
        msg: &[u8],
        signature: &ed25519_dalek::Signature,
    ) -> Result<(), ed25519_dalek::SignatureError> {
        self.0.verify_strict(msg, signature)
    }
}

/// Private half of an identity: the 32-byte Ed25519 seed.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl From<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    fn from(seed: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }
}

impl TryFrom<&[u8]> for SecretKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        key_bytes::<PRIVATE_KEY_SIZE>(bytes).map(Self::from)
    }
}

// Never print the seed
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(public: {})", self.public().to_hex())
    }
}

impl SecretKey {
    pub fn generate() -> Self {
        let mut seed = [0u8; PRIVATE_KEY_SIZE];
        getrandom::getrandom(&mut seed).expect("operating system RNG unavailable");
        Self::from(seed)
    }

    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        Self::try_from(hex::decode(hex.trim())?.as_slice())
    }

    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_SIZE] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn to_pem(&self) -> String {
        pem_string(PRIVATE_KEY_PEM_TAG, self.to_bytes())
    }

    /// The clamped signing scalar as an X25519 secret.
    ///
    /// Pairs with [`PublicKey::agreement_key`] of the same identity.
    pub(crate) fn agreement_key(&self) -> AgreementSecret {
        AgreementSecret::from(self.0.to_scalar_bytes())
    }

    pub fn sign(&self, msg: &[u8]) -> ed25519_dalek::Signature {
        self.0.sign(msg)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_hex_and_pem_encodings() {
        let secret = SecretKey::generate();
        let public = secret.public();

        let restored = SecretKey::from_hex(&secret.to_hex()).unwrap();
        assert_eq!(restored.to_bytes(), secret.to_bytes());
        assert_eq!(public.to_string().parse::<PublicKey>().unwrap(), public);

        let pem = pem::parse(public.to_pem()).unwrap();
        assert_eq!(pem.tag(), PUBLIC_KEY_PEM_TAG);
        assert_eq!(pem.contents(), public.to_bytes());
        assert!(secret.to_pem().contains(PRIVATE_KEY_PEM_TAG));
    }

    #[test]
    fn test_malformed_keys() {
        assert!(matches!(
            PublicKey::try_from(&[7u8; 31][..]),
            Err(KeyError::Length {
                expected: 32,
                actual: 31
            })
        ));
        assert!(matches!(PublicKey::from_hex("xyz"), Err(KeyError::Hex(_))));
        assert!(SecretKey::from_hex("00").is_err());
    }

    #[test]
    fn test_debug_hides_seed() {
        let secret = SecretKey::generate();
        assert!(!format!("{:?}", secret).contains(&secret.to_hex()));
    }

    #[test]
    fn test_agreement_keys_match() {
        let a = SecretKey::generate();
        let b = SecretKey::generate();

        let ab = a.agreement_key().diffie_hellman(&b.public().agreement_key());
        let ba = b.agreement_key().diffie_hellman(&a.public().agreement_key());

        assert_eq!(ab.as_bytes(), ba.as_bytes());
    }

    #[test]
    fn test_signatures() {
        let secret = SecretKey::generate();
        let signature = secret.sign(b"payload");

        assert!(secret.public().verify(b"payload", &signature).is_ok());
        assert!(secret.public().verify(b"payl0ad", &signature).is_err());
        assert!(SecretKey::generate()
            .public()
            .verify(b"payload", &signature)
            .is_err());
    }
}
