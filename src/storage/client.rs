//! Container client lifecycle.
//!
//! Connection parameters come from the environment at call time, not at
//! process start: production injects credentials through the CLI's
//! `--env_vars` bootstrap after launch. Two backends are supported, picked
//! per call:
//! - `STORAGE_LOCAL_ROOT` set: a local filesystem root with one directory
//!   per container (development and tests).
//! - otherwise: Azure blob storage from the `AZURE_STORAGE_*` variables.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::debug;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::{ClientOptions, ObjectStore};

use crate::error_handling::types::StorageError;
use crate::storage::types::AccessOptions;

pub const ACCOUNT_NAME_VAR: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const ACCOUNT_KEY_VAR: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const CONTAINER_NAME_VAR: &str = "AZURE_STORAGE_CONTAINER_NAME";
pub const LOCAL_ROOT_VAR: &str = "STORAGE_LOCAL_ROOT";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection parameters, resolved from the environment per call.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    account_name: String,
    account_key: String,
    local_root: Option<PathBuf>,
    default_container: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        StoreConfig {
            account_name: std::env::var(ACCOUNT_NAME_VAR).unwrap_or_default(),
            account_key: std::env::var(ACCOUNT_KEY_VAR).unwrap_or_default(),
            local_root: std::env::var(LOCAL_ROOT_VAR).ok().map(PathBuf::from),
            default_container: std::env::var(CONTAINER_NAME_VAR).unwrap_or_default(),
        }
    }

    pub fn default_container(&self) -> &str {
        &self.default_container
    }

    /// Builds a client for `container`. Credential problems surface as
    /// transfer faults and propagate un-wrapped to the retry layer.
    pub fn connect(
        &self,
        container: &str,
        create_container: bool,
    ) -> Result<Arc<dyn ObjectStore>, StorageError> {
        if let Some(root) = &self.local_root {
            let prefix = root.join(container);
            if create_container {
                // Idempotent: nothing to suppress, creation of an existing
                // directory succeeds.
                std::fs::create_dir_all(&prefix)?;
            }
            let store = LocalFileSystem::new_with_prefix(prefix)?;
            return Ok(Arc::new(store));
        }

        // object_store exposes no create-container call for Azure; the
        // container is assumed provisioned there.
        let store = MicrosoftAzureBuilder::new()
            .with_account(&self.account_name)
            .with_access_key(&self.account_key)
            .with_container_name(container)
            .with_client_options(ClientOptions::new().with_timeout(REQUEST_TIMEOUT))
            .build()?;
        Ok(Arc::new(store))
    }
}

struct CachedClient {
    store: Arc<dyn ObjectStore>,
    container: String,
}

/// Process-wide client cache, one slot, lock-guarded.
#[derive(Default)]
pub struct ClientCache {
    slot: Mutex<Option<CachedClient>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<CachedClient>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Acquires a container handle for one call. With `cache_client` the
    /// cached client is reused when it targets the same container; without
    /// it a dedicated client is built and the cache is cleared when the
    /// lease drops.
    pub fn lease(&self, options: &AccessOptions) -> Result<Lease<'_>, StorageError> {
        let config = StoreConfig::from_env();
        let container = options
            .container_name
            .clone()
            .unwrap_or_else(|| config.default_container().to_string());

        let store = if options.cache_client {
            let mut slot = self.slot();
            match slot.as_ref() {
                Some(cached) if cached.container == container => cached.store.clone(),
                _ => {
                    let store = config.connect(&container, options.create_container)?;
                    debug!("caching storage client for container {:?}", container);
                    *slot = Some(CachedClient {
                        store: store.clone(),
                        container: container.clone(),
                    });
                    store
                }
            }
        } else {
            config.connect(&container, options.create_container)?
        };

        Ok(Lease {
            store,
            container,
            cache: self,
            keep: options.cache_client,
        })
    }

    pub fn invalidate(&self) {
        // The cached Arc is dropped under the lock, so a cleared slot can
        // only be repopulated after the old client is released.
        *self.slot() = None;
    }
}

/// Container handle held for the duration of one storage call.
pub struct Lease<'a> {
    store: Arc<dyn ObjectStore>,
    container: String,
    cache: &'a ClientCache,
    keep: bool,
}

impl Lease<'_> {
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn container(&self) -> &str {
        &self.container
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if !self.keep {
            self.cache.invalidate();
        }
    }
}
