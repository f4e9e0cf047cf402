//! Blob storage for pipeline artifacts
//!
//! Stages exchange source code, pseudocode, UML source and SVG output as
//! named blobs. The [`BlobStore`] trait is the only thing the orchestrator
//! knows about storage; two implementations ship with the crate.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::core::PipelineError;

/// Key-addressed blob storage with time-limited retrieval links
pub trait BlobStore: Send + Sync {
    /// Fetch the bytes stored under `key`
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError>;

    /// Store `bytes` under `key`, replacing any previous value, and return the key
    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, PipelineError>;

    /// Produce a retrieval link for `key` that expires after `ttl`
    ///
    /// Signing does not check that the blob exists; fetching a link to a
    /// missing blob fails at retrieval time.
    fn presign(&self, key: &str, ttl: Duration) -> Result<String, PipelineError>;

    /// Name of the bucket this store writes into
    fn bucket(&self) -> &str;
}

/// Reject keys that could escape the bucket
pub fn validate_key(key: &str) -> Result<(), PipelineError> {
    if key.trim().is_empty() {
        return Err(PipelineError::invalid_key(key, "key is empty"));
    }
    let path = Path::new(key);
    if path.is_absolute() || key.starts_with('/') || key.starts_with('\\') {
        return Err(PipelineError::invalid_key(key, "key must be relative"));
    }
    if path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(PipelineError::invalid_key(key, "key must not leave the bucket"));
    }
    Ok(())
}

fn expires_at(ttl: Duration) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now + ttl).as_secs()
}

/// In-process blob store, mainly for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    bucket: String,
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    pub fn contains(&self, key: &str) -> Result<bool, PipelineError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| PipelineError::storage("contains", key, e))?;
        Ok(blobs.contains_key(key))
    }

    pub fn len(&self) -> Result<usize, PipelineError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| PipelineError::storage("len", &self.bucket, e))?;
        Ok(blobs.len())
    }

    pub fn is_empty(&self) -> Result<bool, PipelineError> {
        Ok(self.len()? == 0)
    }
}

impl BlobStore for MemoryBlobStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        validate_key(key)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|e| PipelineError::storage("get", key, e))?;
        let bytes = blobs
            .get(key)
            .cloned()
            .ok_or_else(|| PipelineError::not_found(key))?;
        debug!(key, bytes = bytes.len(), "Downloaded blob");
        Ok(bytes)
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, PipelineError> {
        validate_key(key)?;
        self.blobs
            .write()
            .map_err(|e| PipelineError::storage("put", key, e))?
            .insert(key.to_string(), bytes.to_vec());
        info!(key, bucket = %self.bucket, "Uploaded blob");
        Ok(key.to_string())
    }

    fn presign(&self, key: &str, ttl: Duration) -> Result<String, PipelineError> {
        validate_key(key)?;
        Ok(format!(
            "memory://{}/{}?expires={}",
            self.bucket,
            key,
            expires_at(ttl)
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Blob store backed by a directory: blobs live at `<root>/<bucket>/<key>`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    bucket: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    /// Directory holding this store's blobs
    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn blob_path(&self, key: &str) -> Result<PathBuf, PipelineError> {
        validate_key(key)?;
        Ok(self.bucket_dir().join(key))
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, key: &str) -> Result<Vec<u8>, PipelineError> {
        let path = self.blob_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "Downloaded blob");
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(PipelineError::not_found(key)),
            Err(e) => Err(PipelineError::storage("get", key, e)),
        }
    }

    fn put(&self, key: &str, bytes: &[u8]) -> Result<String, PipelineError> {
        let path = self.blob_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::storage("put", key, e))?;
        }
        fs::write(&path, bytes).map_err(|e| PipelineError::storage("put", key, e))?;
        info!(key, bucket = %self.bucket, "Uploaded blob");
        Ok(key.to_string())
    }

    fn presign(&self, key: &str, ttl: Duration) -> Result<String, PipelineError> {
        let path = self.blob_path(key)?;
        let absolute = std::path::absolute(&path)
            .map_err(|e| PipelineError::storage("presign", key, e))?;
        Ok(format!(
            "file://{}?expires={}",
            absolute.display(),
            expires_at(ttl)
        ))
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
