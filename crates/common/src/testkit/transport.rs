use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::identity::{AddressHash, Identity};
use crate::transport::{IdentityTransport, KnownIdentities, TransportError};

/// Transport backed by an in-memory cache
///
/// Counts path requests, and can be told to "announce" one identity a fixed
/// delay after it is requested.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    known: KnownIdentities,
    responder: Option<(Identity, Duration)>,
    requests: AtomicUsize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate the cache
    pub fn with_known(self, identity: &Identity) -> Self {
        self.known
            .remember(*identity.public_key())
            .expect("in-memory cache never touches disk");
        self
    }

    /// Announce `identity` `delay` after a request for its address
    pub fn answering(mut self, identity: Identity, delay: Duration) -> Self {
        self.responder = Some((identity, delay));
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityTransport for MemoryTransport {
    fn recall(&self, address: &AddressHash) -> Option<Identity> {
        self.known.recall(address)
    }

    async fn request_path(&self, address: &AddressHash) -> Result<(), TransportError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        if let Some((identity, delay)) = &self.responder {
            if identity.address_hash() == *address {
                let known = self.known.clone();
                let public_key = *identity.public_key();
                let delay = *delay;
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = known.remember(public_key);
                });
            }
        }
        Ok(())
    }
}
