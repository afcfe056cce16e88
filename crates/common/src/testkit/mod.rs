/// In-process stand-in for the network side of identity resolution
///
/// # Example
///
/// ```rust,ignore
/// use common::testkit::MemoryTransport;
///
/// let remote = Identity::generate();
/// let transport = MemoryTransport::new()
///     .answering(remote.to_public(), Duration::from_millis(300));
///
/// let resolver = Resolver::new(&transport);
/// ```
mod transport;

pub use transport::MemoryTransport;
