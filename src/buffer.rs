//! URL-addressable blob storage for cropped buffers

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::Dimensions;

/// Handle to a blob in a [`BlobStore`]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Blob {
    bytes: Arc<[u8]>,
    mime: &'static str,
}

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    blobs: HashMap<BlobUrl, Blob>,
}

/// Shared store of revocable blobs
#[derive(Clone, Debug, Default)]
pub struct BlobStore {
    inner: Arc<Mutex<Registry>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` and return a fresh handle to them
    pub fn create(&self, bytes: Vec<u8>, mime: &'static str) -> BlobUrl {
        let mut registry = self.inner.lock();
        registry.next_id += 1;
        let url = BlobUrl(format!("blob:cropscan/{}", registry.next_id));
        registry.blobs.insert(
            url.clone(),
            Blob {
                bytes: bytes.into(),
                mime,
            },
        );
        url
    }

    /// Free the blob behind `url`. Returns false if it was not live.
    pub fn revoke(&self, url: &BlobUrl) -> bool {
        self.inner.lock().blobs.remove(url).is_some()
    }

    pub fn fetch(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.inner.lock().blobs.get(url).map(|b| Arc::clone(&b.bytes))
    }

    pub fn mime(&self, url: &BlobUrl) -> Option<&'static str> {
        self.inner.lock().blobs.get(url).map(|b| b.mime)
    }

    #[cfg(test)]
    pub fn is_live(&self, url: &BlobUrl) -> bool {
        self.inner.lock().blobs.contains_key(url)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.inner.lock().blobs.len()
    }
}

/// A cropped JPEG published in the blob store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CroppedBuffer {
    pub url: BlobUrl,
    pub size: Dimensions,
}

/// Owned slot holding at most one live [`CroppedBuffer`]
#[derive(Debug)]
pub struct BufferSlot {
    store: BlobStore,
    current: Option<CroppedBuffer>,
}

impl BufferSlot {
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Revoke the previous buffer, then publish `jpeg` as the new one
    pub fn replace(&mut self, jpeg: Vec<u8>, size: Dimensions) -> CroppedBuffer {
        self.clear();
        let url = self.store.create(jpeg, "image/jpeg");
        log::debug!("Created {} ({}x{})", url, size.width, size.height);
        let buffer = CroppedBuffer { url, size };
        self.current = Some(buffer.clone());
        buffer
    }

    /// Revoke the current buffer, if any
    pub fn clear(&mut self) {
        if let Some(previous) = self.current.take() {
            log::debug!("Revoking {}", previous.url);
            self.store.revoke(&previous.url);
        }
    }

    pub fn current(&self) -> Option<&CroppedBuffer> {
        self.current.as_ref()
    }
}

impl Drop for BufferSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
