//! Blob storage operations.
//!
//! Every operation composes the same pipeline: call tracing on the outside,
//! the retry policy around the transfer (writes only; reads are not retried),
//! and a container lease acquired inside each attempt so reconnects pick up
//! freshly injected credentials.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use object_store::path::Path as BlobPath;
use object_store::ObjectStore;

use crate::error_handling::types::StorageError;
use crate::fsutil;
use crate::instrument::call_trace::traced_async;
use crate::instrument::retry::RetryPolicy;
use crate::storage::client::ClientCache;
use crate::storage::types::{AccessOptions, Payload};

/// Blob storage facade over a cached or ephemeral container client.
pub struct BlobStore {
    cache: ClientCache,
    retry: RetryPolicy<StorageError>,
}

impl Default for BlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore {
    pub fn new() -> Self {
        BlobStore {
            cache: ClientCache::new(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(retry: RetryPolicy<StorageError>) -> Self {
        BlobStore {
            cache: ClientCache::new(),
            retry,
        }
    }

    /// Saves a JSON payload to a `.json` path or a text payload to any other
    /// path; overwrites unconditionally. A payload/path mismatch faults
    /// before the retry loop and before any network call.
    pub async fn save_file(
        &self,
        path: &str,
        data: &Payload,
        options: &AccessOptions,
    ) -> Result<(), StorageError> {
        traced_async("save_file", (path, data.kind()), || async {
            let body = encode(path, data)?;
            self.retry
                .run("save_file", || {
                    let body = body.clone();
                    async move {
                        let lease = self.cache.lease(options)?;
                        lease.store().put(&BlobPath::from(path), body.into()).await?;
                        Ok(())
                    }
                })
                .await
                .map(|_| ())
        })
        .await
    }

    /// Downloads and decodes a blob; parses JSON iff the path has a `.json`
    /// suffix. Not retried.
    pub async fn read_file(
        &self,
        path: &str,
        options: &AccessOptions,
    ) -> Result<Payload, StorageError> {
        traced_async("read_file", path, || async {
            let lease = self.cache.lease(options)?;
            let bytes = lease.store().get(&BlobPath::from(path)).await?.bytes().await?;
            let content = String::from_utf8(bytes.to_vec())?;
            if fsutil::is_json(path) {
                Ok(Payload::Json(serde_json::from_str(&content)?))
            } else {
                Ok(Payload::Text(content))
            }
        })
        .await
    }

    /// True iff a blob exists at exactly `path`.
    pub async fn check_file(
        &self,
        path: &str,
        options: &AccessOptions,
    ) -> Result<bool, StorageError> {
        traced_async("check_file", path, || async {
            let lease = self.cache.lease(options)?;
            match lease.store().head(&BlobPath::from(path)).await {
                Ok(_) => Ok(true),
                Err(object_store::Error::NotFound { .. }) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// True iff at least one blob exists under `path` as a prefix.
    pub async fn check_folder(
        &self,
        path: &str,
        options: &AccessOptions,
    ) -> Result<bool, StorageError> {
        traced_async("check_folder", path, || async {
            let lease = self.cache.lease(options)?;
            let prefix = BlobPath::from(path);
            let mut stream = lease.store().list(Some(&prefix));
            match stream.next().await {
                None => Ok(false),
                Some(Ok(_)) => Ok(true),
                Some(Err(e)) => Err(e.into()),
            }
        })
        .await
    }

    /// Copies a local file to `storage_path` (default: the same relative
    /// path). Silently no-ops when the local file is absent. Retried.
    pub async fn upload_file(
        &self,
        file_path: &Path,
        storage_path: Option<&str>,
        options: &AccessOptions,
    ) -> Result<(), StorageError> {
        let key = match storage_path {
            Some(path) => path.to_string(),
            None => storage_key_for(file_path),
        };
        traced_async("upload_file", (file_path, &key), || async {
            self.retry
                .run("upload_file", || {
                    let key = key.clone();
                    async move {
                        let body = match tokio::fs::read(file_path).await {
                            Ok(bytes) => Bytes::from(bytes),
                            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
                            Err(e) => return Err(StorageError::from(e)),
                        };
                        let lease = self.cache.lease(options)?;
                        lease.store().put(&BlobPath::from(key.as_str()), body.into()).await?;
                        Ok(())
                    }
                })
                .await
                .map(|_| ())
        })
        .await
    }

    /// Fetches a blob to `file_path` (default: the storage path), creating
    /// intermediate directories. Retried.
    pub async fn download_file(
        &self,
        storage_path: &str,
        file_path: Option<&Path>,
        options: &AccessOptions,
    ) -> Result<(), StorageError> {
        let target = match file_path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(storage_path),
        };
        traced_async("download_file", (storage_path, &target), || async {
            self.retry
                .run("download_file", || {
                    let target = target.clone();
                    async move {
                        let lease = self.cache.lease(options)?;
                        let bytes = lease
                            .store()
                            .get(&BlobPath::from(storage_path))
                            .await?
                            .bytes()
                            .await?;
                        if let Some(parent) = target.parent() {
                            if !parent.as_os_str().is_empty() {
                                tokio::fs::create_dir_all(parent).await?;
                            }
                        }
                        tokio::fs::write(&target, bytes).await?;
                        Ok(())
                    }
                })
                .await
                .map(|_| ())
        })
        .await
    }

    /// Recursively mirrors a local directory tree under `storage_path`
    /// (default: the local path), preserving relative nested structure. A
    /// missing local folder is a no-op, matching `upload_file`.
    pub async fn upload_folder(
        &self,
        folder_path: &Path,
        storage_path: Option<&str>,
        options: &AccessOptions,
    ) -> Result<(), StorageError> {
        let base = match storage_path {
            Some(path) => path.trim_end_matches('/').to_string(),
            None => storage_key_for(folder_path),
        };
        traced_async("upload_folder", (folder_path, &base), || async {
            let files = walk_files(folder_path)?;
            for (local, relative) in files {
                let key = format!("{}/{}", base, relative);
                self.upload_file(&local, Some(&key), options).await?;
            }
            Ok(())
        })
        .await
    }

    /// Mirrors every blob under `storage_path` into `folder_root`, keeping
    /// the structure below the shared prefix.
    pub async fn download_folder(
        &self,
        storage_path: &str,
        folder_root: &Path,
        options: &AccessOptions,
    ) -> Result<(), StorageError> {
        traced_async("download_folder", (storage_path, folder_root), || async {
            let keys = {
                let lease = self.cache.lease(options)?;
                list_keys(lease.store(), storage_path).await?
            };
            for key in keys {
                let relative = key
                    .strip_prefix(storage_path)
                    .unwrap_or(key.as_str())
                    .trim_start_matches('/');
                let target = folder_root.join(relative);
                self.download_file(&key, Some(&target), options).await?;
            }
            Ok(())
        })
        .await
    }

    /// Deletes the blob at `path`, or every blob under it when the path
    /// matches as a folder prefix. NotFound is a successful no-op.
    pub async fn remove(&self, path: &str, options: &AccessOptions) -> Result<(), StorageError> {
        traced_async("remove", path, || async {
            let lease = self.cache.lease(options)?;
            let keys = list_keys(lease.store(), path).await?;

            if keys.is_empty() {
                return match lease.store().delete(&BlobPath::from(path)).await {
                    Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                    Err(e) => Err(e.into()),
                };
            }

            for key in keys {
                match lease.store().delete(&BlobPath::from(key.as_str())).await {
                    Ok(()) | Err(object_store::Error::NotFound { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(())
        })
        .await
    }
}

fn encode(path: &str, data: &Payload) -> Result<Bytes, StorageError> {
    match (fsutil::is_json(path), data) {
        (true, Payload::Json(value)) => Ok(Bytes::from(serde_json::to_string(value)?)),
        (false, Payload::Text(text)) => Ok(Bytes::from(text.clone())),
        _ => Err(StorageError::TypeMismatch {
            path: path.to_string(),
            data: data.kind(),
        }),
    }
}

fn storage_key_for(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").trim_end_matches('/').to_string()
}

async fn list_keys(
    store: &Arc<dyn ObjectStore>,
    prefix: &str,
) -> Result<Vec<String>, StorageError> {
    let prefix_path = if prefix.is_empty() {
        None
    } else {
        Some(BlobPath::from(prefix))
    };
    let mut stream = store.list(prefix_path.as_ref());
    let mut keys = Vec::new();
    while let Some(meta) = stream.next().await {
        keys.push(meta?.location.to_string());
    }
    Ok(keys)
}

/// Collects regular files under `dir` with their forward-slash relative
/// paths. A missing directory yields no entries.
fn walk_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, StorageError> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Ok(files);
    }

    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path
                    .strip_prefix(dir)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                files.push((path, relative));
            }
        }
    }

    files.sort();
    Ok(files)
}
