//! The resolver's view of the network
//!
//! The resolver only needs two capabilities from the outside world: a
//! non-blocking look into the local identity cache, and a way to ask the
//! network about an address it does not know. [`IdentityTransport`] captures
//! exactly that; [`LocalTransport`] implements it on top of a shared instance
//! listening on loopback.

mod hdlc;
mod known;
mod local;
mod packet;

use async_trait::async_trait;

use crate::identity::{AddressHash, Identity};

pub use hdlc::{frame, FrameDecoder, MAX_FRAME_SIZE};
pub use known::KnownIdentities;
pub use local::{LocalTransport, DEFAULT_SHARED_INSTANCE_PORT};
pub use packet::{Packet, PacketError};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("not connected to a shared instance")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("known identity cache could not be read: {0}")]
    CacheDecode(#[from] toml::de::Error),

    #[error("known identity cache could not be written: {0}")]
    CacheEncode(#[from] toml::ser::Error),
}

#[async_trait]
pub trait IdentityTransport: Send + Sync {
    /// Look up an identity in the local cache without blocking
    fn recall(&self, address: &AddressHash) -> Option<Identity>;

    /// Ask the network for an identity; answers surface later through `recall`
    async fn request_path(&self, address: &AddressHash) -> Result<(), TransportError>;
}
