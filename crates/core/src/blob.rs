//! Session-scoped blob registry.
//!
//! Frame previews and downloaded videos are handed to the presentation
//! layer as opaque `blob:` URLs. A URL stays resolvable for as long as at
//! least one clone of its [`BlobHandle`] is alive; dropping the last clone
//! revokes it, so the lifetime of the underlying bytes follows the
//! lifetime of whatever owns the handle (a frame, a generated video).

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use uuid::Uuid;

/// URL scheme prefix for every registered blob.
pub const BLOB_URL_PREFIX: &str = "blob:framecast/";

type Registry = Mutex<HashMap<BlobUrl, Blob>>;

/// Address of a registered blob, e.g. `blob:framecast/0190…`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    fn mint() -> Self {
        Self(format!("{BLOB_URL_PREFIX}{}", Uuid::now_v7()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the bytes behind a blob live.
///
/// File-backed sources are read lazily, mirroring how a browser blob
/// wraps a selected file without copying it up front.
#[derive(Debug, Clone)]
pub enum BlobSource {
    Memory(Arc<[u8]>),
    File(PathBuf),
}

impl BlobSource {
    /// Load the full contents of the source.
    pub async fn read(&self) -> std::io::Result<Arc<[u8]>> {
        match self {
            BlobSource::Memory(bytes) => Ok(Arc::clone(bytes)),
            BlobSource::File(path) => Ok(tokio::fs::read(path).await?.into()),
        }
    }
}

/// A resolved blob: its source plus the declared content type.
#[derive(Debug, Clone)]
pub struct Blob {
    pub source: BlobSource,
    pub mime_type: Option<String>,
}

/// Registry of live blobs, cheap to clone and share.
#[derive(Clone, Default)]
pub struct BlobStore {
    inner: Arc<Registry>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and return the handle that keeps it alive.
    pub fn register(&self, source: BlobSource, mime_type: Option<String>) -> BlobHandle {
        let url = BlobUrl::mint();
        lock(&self.inner).insert(url.clone(), Blob { source, mime_type });
        tracing::trace!(url = %url, "Registered blob");

        BlobHandle {
            inner: Arc::new(HandleInner {
                url,
                registry: Arc::downgrade(&self.inner),
            }),
        }
    }

    /// Look up a blob by URL. Returns `None` once the URL is revoked.
    pub fn resolve(&self, url: &BlobUrl) -> Option<Blob> {
        lock(&self.inner).get(url).cloned()
    }

    /// Resolve and read the bytes behind `url`.
    pub async fn read(&self, url: &BlobUrl) -> std::io::Result<Arc<[u8]>> {
        let blob = self.resolve(url).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("blob {url} has been revoked"),
            )
        })?;
        blob.source.read().await
    }

    pub fn contains(&self, url: &BlobUrl) -> bool {
        lock(&self.inner).contains_key(url)
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        lock(&self.inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for BlobStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStore")
            .field("live", &self.len())
            .finish()
    }
}

/// Owning reference to a registered blob.
///
/// Clones share ownership; the URL is revoked when the last clone drops.
#[derive(Clone)]
pub struct BlobHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    url: BlobUrl,
    registry: Weak<Registry>,
}

impl BlobHandle {
    pub fn url(&self) -> &BlobUrl {
        &self.inner.url
    }
}

impl PartialEq for BlobHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.url == other.inner.url
    }
}

impl Eq for BlobHandle {}

impl fmt::Debug for BlobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlobHandle").field(&self.inner.url.0).finish()
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        // The store may already be gone at session teardown.
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).remove(&self.url);
            tracing::trace!(url = %self.url, "Revoked blob");
        }
    }
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<BlobUrl, Blob>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
