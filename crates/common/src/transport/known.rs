use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::crypto::PublicKey;
use crate::identity::{AddressHash, Identity};

use super::TransportError;

/// On-disk form: `[identities]` table of address hex -> public key hex
#[derive(Debug, Default, Serialize, Deserialize)]
struct KnownIdentitiesFile {
    #[serde(default)]
    identities: BTreeMap<String, String>,
}

/// Cache of identities learned from the network
///
/// Cloning is cheap and every clone sees the same entries, which is how the
/// shared-instance reader task hands announces to the resolver.
#[derive(Debug, Clone, Default)]
pub struct KnownIdentities {
    inner: Arc<RwLock<BTreeMap<AddressHash, PublicKey>>>,
    storage: Option<PathBuf>,
}

impl KnownIdentities {
    /// A cache that lives only in memory
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache stored at `path`
    ///
    /// A missing file is an empty cache. Entries whose key does not hash to
    /// their address are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let mut entries = BTreeMap::new();

        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let file: KnownIdentitiesFile = toml::from_str(&contents)?;

            for (address_hex, key_hex) in file.identities {
                let parsed = AddressHash::from_hex(&address_hex)
                    .ok()
                    .zip(PublicKey::from_hex(&key_hex).ok());
                match parsed {
                    Some((address, key)) if AddressHash::from_public_key(&key) == address => {
                        entries.insert(address, key);
                    }
                    _ => tracing::warn!(
                        entry = %address_hex,
                        path = %path.display(),
                        "skipping invalid known identity entry"
                    ),
                }
            }
        }

        Ok(Self {
            inner: Arc::new(RwLock::new(entries)),
            storage: Some(path.to_path_buf()),
        })
    }

    /// Look up an identity without blocking
    pub fn recall(&self, address: &AddressHash) -> Option<Identity> {
        self.inner
            .read()
            .get(address)
            .copied()
            .map(Identity::from_public_key)
    }

    /// Add an identity and write the cache back to disk (if it has a file)
    pub fn remember(&self, public_key: PublicKey) -> Result<AddressHash, TransportError> {
        let address = AddressHash::from_public_key(&public_key);
        let inserted = self.inner.write().insert(address, public_key).is_none();

        if inserted {
            tracing::debug!(%address, "remembered identity");
            self.save()?;
        }
        Ok(address)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    fn save(&self) -> Result<(), TransportError> {
        let Some(path) = &self.storage else {
            return Ok(());
        };

        let file = KnownIdentitiesFile {
            identities: self
                .inner
                .read()
                .iter()
                .map(|(address, key)| (address.to_hex(), key.to_hex()))
                .collect(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }
}
