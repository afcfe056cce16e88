use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::identity::{AddressHash, Identity};

use super::hdlc::{frame, FrameDecoder};
use super::known::KnownIdentities;
use super::packet::Packet;
use super::{IdentityTransport, TransportError};

/// Port a shared instance listens on by default
pub const DEFAULT_SHARED_INSTANCE_PORT: u16 = 37428;

const READ_BUFFER_SIZE: usize = 4096;

/// Client for a shared instance running on this machine
///
/// Path requests are written to the instance as HDLC frames. A background task
/// reads the instance's frames and adds every valid announce to the
/// [`KnownIdentities`] cache, where `recall` picks it up.
pub struct LocalTransport {
    known: KnownIdentities,
    writer: Option<Mutex<OwnedWriteHalf>>,
    reader: Option<JoinHandle<()>>,
}

impl LocalTransport {
    /// Connect to a shared instance
    pub async fn connect(addr: SocketAddr, known: KnownIdentities) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        tracing::debug!(%addr, "connected to shared instance");

        let (read_half, write_half) = stream.into_split();
        let reader = tokio::spawn(read_loop(read_half, known.clone()));

        Ok(Self {
            known,
            writer: Some(Mutex::new(write_half)),
            reader: Some(reader),
        })
    }

    /// A transport that can only answer from the cache
    pub fn offline(known: KnownIdentities) -> Self {
        Self {
            known,
            writer: None,
            reader: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    pub fn known(&self) -> &KnownIdentities {
        &self.known
    }
}

impl Drop for LocalTransport {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

#[async_trait]
impl IdentityTransport for LocalTransport {
    fn recall(&self, address: &AddressHash) -> Option<Identity> {
        self.known.recall(address)
    }

    async fn request_path(&self, address: &AddressHash) -> Result<(), TransportError> {
        let writer = self.writer.as_ref().ok_or(TransportError::NotConnected)?;

        let packet = Packet::PathRequest { address: *address };
        let mut writer = writer.lock().await;
        writer.write_all(&frame(&packet.encode())).await?;
        writer.flush().await?;

        tracing::debug!(%address, "sent path request");
        Ok(())
    }
}

async fn read_loop(mut socket: OwnedReadHalf, known: KnownIdentities) {
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) => {
                tracing::debug!("shared instance closed the connection");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("lost connection to shared instance: {}", e);
                return;
            }
        };

        for payload in decoder.push(&buf[..n]) {
            match Packet::decode(&payload) {
                Ok(Packet::Announce { public_key, .. }) => {
                    if let Err(e) = known.remember(public_key) {
                        tracing::warn!("failed to store announced identity: {}", e);
                    }
                }
                Ok(Packet::PathRequest { address }) => {
                    tracing::trace!(%address, "ignoring path request from shared instance");
                }
                Err(e) => tracing::debug!("dropping malformed packet: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;

    /// Minimal shared instance: answers every path request for `identity`
    async fn spawn_instance(identity: Identity) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut decoder = FrameDecoder::new();
            let mut buf = [0u8; 256];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                for payload in decoder.push(&buf[..n]) {
                    if let Ok(Packet::PathRequest { address }) = Packet::decode(&payload) {
                        if address == identity.address_hash() {
                            let announce = Packet::Announce {
                                address,
                                public_key: *identity.public_key(),
                            };
                            socket.write_all(&frame(&announce.encode())).await.unwrap();
                        }
                    }
                }
            }
        });

        addr
    }

    #[tokio::test]
    async fn test_announce_populates_cache() {
        let remote = Identity::generate();
        let addr = spawn_instance(remote.clone()).await;

        let transport = LocalTransport::connect(addr, KnownIdentities::in_memory())
            .await
            .unwrap();
        assert!(transport.recall(&remote.address_hash()).is_none());

        transport.request_path(&remote.address_hash()).await.unwrap();

        let mut recalled = None;
        for _ in 0..100 {
            recalled = transport.recall(&remote.address_hash());
            if recalled.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(recalled.unwrap().public_key(), remote.public_key());
    }

    #[tokio::test]
    async fn test_resolver_learns_and_persists_announce() {
        use crate::resolver::{ResolutionRequest, Resolver};

        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("known_identities.toml");
        let remote = Identity::generate();
        let addr = spawn_instance(remote.clone()).await;

        let known = KnownIdentities::load(&cache_path).unwrap();
        let transport = LocalTransport::connect(addr, known).await.unwrap();

        let request = ResolutionRequest::new(remote.address_hash().to_hex())
            .allow_network_request(true)
            .timeout(Duration::from_secs(5));
        let resolved = Resolver::new(&transport)
            .with_poll_interval(Duration::from_millis(10))
            .resolve(&request)
            .await
            .unwrap();
        assert_eq!(resolved.public_key(), remote.public_key());
        assert!(!resolved.has_private_key());

        let reloaded = KnownIdentities::load(&cache_path).unwrap();
        let recalled = reloaded.recall(&remote.address_hash()).unwrap();
        assert_eq!(recalled.public_key(), remote.public_key());
    }

    #[tokio::test]
    async fn test_offline_request_fails() {
        let transport = LocalTransport::offline(KnownIdentities::in_memory());
        let address = Identity::generate().address_hash();

        assert!(!transport.is_connected());
        assert!(matches!(
            transport.request_path(&address).await,
            Err(TransportError::NotConnected)
        ));
    }
}
