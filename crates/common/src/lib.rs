/**
 * Cryptographic types and operations.
 *  - Ed25519 identity keys, convertible to X25519
 *  - Key-to-key secret sharing
 *  - Authenticated chunk encryption
 */
pub mod crypto;
/**
 * Identity handles: a public key, maybe its
 *  private half, and the address hash the
 *  network knows it by.
 */
pub mod identity;
/**
 * Where identities come from when we only
 *  know an address hash: a local cache and a
 *  client for the local shared instance.
 */
pub mod transport;
/**
 * Turns a file path or address hash into an
 *  identity, waiting on the network if allowed.
 */
pub mod resolver;
/**
 * Streaming encryption, decryption and
 *  signatures over arbitrary-size inputs.
 */
pub mod stream;
/**
 * Output naming and overwrite-safe writes.
 */
pub mod output;
/**
 * Test doubles for the transport layer.
 */
pub mod testkit;

pub mod prelude {
    pub use crate::crypto::{PublicKey, SecretKey, Signature};
    pub use crate::identity::{AddressHash, Identity, IdentityError};
    pub use crate::output::{GuardedOutput, OutputError};
    pub use crate::resolver::{ResolutionRequest, ResolveError, Resolver};
    pub use crate::stream::{CipherStream, Encoding, StreamError};
    pub use crate::transport::{IdentityTransport, KnownIdentities, LocalTransport};
}
