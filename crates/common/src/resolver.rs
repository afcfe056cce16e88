//! Turning a user-supplied reference into an [`Identity`]
//!
//! A reference is either a path to an identity file or the hex address hash of
//! an identity. Addresses are answered from the local cache when possible;
//! otherwise, if the caller allows it, the network is asked and the cache is
//! polled until the answer lands or the timeout runs out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::identity::{AddressHash, Identity, IdentityError, ADDRESS_HEX_LEN};
use crate::transport::IdentityTransport;

/// How long to wait for an identity requested from the network
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// How often the cache is re-checked while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Cap on how far ahead a wait deadline is placed; longer timeouts wait this long
pub const MAX_WAIT: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("could not recall identity for {0}")]
    IdentityNotFound(AddressHash),

    #[error("identity request for {address} timed out after {timeout:?}")]
    RequestTimeout {
        address: AddressHash,
        timeout: Duration,
    },

    #[error("invalid hexadecimal address hash {0:?}")]
    InvalidReference(String),

    #[error("identity file {0} not found")]
    FileNotFound(PathBuf),

    #[error("could not load identity from {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: IdentityError,
    },
}

/// What the user pointed at with `-i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityReference {
    File(PathBuf),
    Address(AddressHash),
}

impl IdentityReference {
    /// Classify a raw reference
    ///
    /// An existing file always wins, even if its name is also valid hex.
    /// Strings of address length are otherwise treated as hex; anything else
    /// is taken to be a file path.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let path = Path::new(reference);
        if path.is_file() {
            return Ok(Self::File(path.to_path_buf()));
        }

        if reference.len() == ADDRESS_HEX_LEN {
            return AddressHash::from_hex(reference)
                .map(Self::Address)
                .map_err(|_| ResolveError::InvalidReference(reference.to_string()));
        }

        Err(ResolveError::FileNotFound(path.to_path_buf()))
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub reference: String,
    pub allow_network_request: bool,
    pub timeout: Duration,
}

impl ResolutionRequest {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            allow_network_request: false,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn allow_network_request(mut self, allow: bool) -> Self {
        self.allow_network_request = allow;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Check `ready` every `interval` until it holds or `timeout` has passed
///
/// `ready` is always evaluated once more at the deadline, so an entry that
/// arrives during the last interval is not missed. Returns within
/// `timeout + interval`. Timeouts beyond [`MAX_WAIT`] are clamped to it.
pub async fn poll_until<F>(mut ready: F, interval: Duration, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let deadline = start
        .checked_add(timeout.min(MAX_WAIT))
        .unwrap_or_else(|| start + Duration::from_secs(60 * 60 * 24));
    loop {
        if ready() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

pub struct Resolver<'a> {
    transport: &'a dyn IdentityTransport,
    poll_interval: Duration,
}

impl<'a> Resolver<'a> {
    pub fn new(transport: &'a dyn IdentityTransport) -> Self {
        Self {
            transport,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub async fn resolve(&self, request: &ResolutionRequest) -> Result<Identity, ResolveError> {
        match IdentityReference::parse(&request.reference)? {
            IdentityReference::File(path) => {
                let identity =
                    Identity::from_file(&path).map_err(|source| ResolveError::FileRead {
                        path: path.clone(),
                        source,
                    })?;
                tracing::info!("loaded identity {} from {}", identity, path.display());
                Ok(identity)
            }
            IdentityReference::Address(address) => self.resolve_address(address, request).await,
        }
    }

    async fn resolve_address(
        &self,
        address: AddressHash,
        request: &ResolutionRequest,
    ) -> Result<Identity, ResolveError> {
        if let Some(identity) = self.transport.recall(&address) {
            tracing::info!("recalled identity {} for destination {}", identity, address);
            return Ok(identity);
        }

        if !request.allow_network_request {
            return Err(ResolveError::IdentityNotFound(address));
        }

        tracing::info!("requesting unknown identity for {}", address);
        if let Err(e) = self.transport.request_path(&address).await {
            tracing::warn!("path request for {} could not be sent: {}", address, e);
        }

        let transport = self.transport;
        let arrived = poll_until(
            || transport.recall(&address).is_some(),
            self.poll_interval,
            request.timeout,
        )
        .await;

        match transport.recall(&address) {
            Some(identity) if arrived => {
                tracing::info!(
                    "received identity {} for destination {} from the network",
                    identity,
                    address
                );
                Ok(identity)
            }
            _ => Err(ResolveError::RequestTimeout {
                address,
                timeout: request.timeout,
            }),
        }
    }
}
