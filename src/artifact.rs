//! Downloadable merge results.
//!
//! A finished merge is published into a [`ResourceRegistry`], which hands out
//! a `blob:` style URL for it, much like an object URL in a browser. The URL
//! stays valid exactly as long as the owning [`ResourceHandle`] lives: the
//! handle releases the blob when it is dropped, so a superseded or abandoned
//! result never lingers in memory.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Weak};
use uuid::Uuid;

use crate::error::Result;
use crate::io::{PdfWriter, WriteStatistics};
use crate::merge::{MergeStatistics, MergedPdf};

/// Content type of every published artifact.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const URL_PREFIX: &str = "blob:pdfmerge/";

type BlobTable = Mutex<HashMap<Uuid, Arc<[u8]>>>;

/// Table of live downloadable blobs.
///
/// Cloning a registry yields another handle to the same table.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    blobs: Arc<BlobTable>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` and return the handle that keeps them alive.
    pub fn register(&self, bytes: Arc<[u8]>) -> ResourceHandle {
        let id = Uuid::new_v4();
        self.blobs.lock().insert(id, bytes);
        tracing::debug!(%id, "registered download resource");

        ResourceHandle {
            id,
            blobs: Arc::downgrade(&self.blobs),
        }
    }

    /// Look up a published blob by its URL.
    ///
    /// Returns `None` once the handle for the URL has been released.
    pub fn fetch(&self, url: &str) -> Option<Arc<[u8]>> {
        let id = url.strip_prefix(URL_PREFIX)?.parse::<Uuid>().ok()?;
        self.blobs.lock().get(&id).cloned()
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    /// True when no blob is published.
    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

/// Ownership of one published blob; releases it on drop.
#[derive(Debug)]
pub struct ResourceHandle {
    id: Uuid,
    blobs: Weak<BlobTable>,
}

impl ResourceHandle {
    /// URL the blob can be fetched under.
    pub fn url(&self) -> String {
        format!("{URL_PREFIX}{}", self.id)
    }

    /// Release the blob now rather than at end of scope.
    pub fn release(self) {}
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        if let Some(blobs) = self.blobs.upgrade()
            && blobs.lock().remove(&self.id).is_some()
        {
            tracing::debug!(id = %self.id, "released download resource");
        }
    }
}

/// A published merge: the merged bytes under a fixed file name.
///
/// Owns the resource handle, so dropping the result revokes its URL.
#[derive(Debug)]
pub struct MergeResult {
    file_name: String,
    bytes: Arc<[u8]>,
    statistics: MergeStatistics,
    handle: ResourceHandle,
}

impl MergeResult {
    /// Publish a merged PDF into `registry` under `file_name`.
    pub fn publish(merged: MergedPdf, registry: &ResourceRegistry, file_name: &str) -> Self {
        let bytes: Arc<[u8]> = merged.bytes.into();
        let handle = registry.register(Arc::clone(&bytes));

        Self {
            file_name: file_name.to_string(),
            bytes,
            statistics: merged.statistics,
            handle,
        }
    }

    /// File name the download is offered under.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Merged PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// URL of the published blob.
    pub fn url(&self) -> String {
        self.handle.url()
    }

    /// Statistics of the merge that produced this result.
    pub fn statistics(&self) -> &MergeStatistics {
        &self.statistics
    }

    /// Snapshot for handing out to callers.
    ///
    /// The snapshot does not keep the resource alive; its URL stops
    /// resolving once this result is released.
    pub fn download(&self) -> Download {
        Download {
            url: self.url(),
            file_name: self.file_name.clone(),
            bytes: Arc::clone(&self.bytes),
            statistics: self.statistics.clone(),
        }
    }
}

/// Cheap, clonable view of a [`MergeResult`].
#[derive(Debug, Clone)]
pub struct Download {
    /// URL of the published blob.
    pub url: String,
    /// File name the download is offered under.
    pub file_name: String,
    /// Merged PDF bytes.
    pub bytes: Arc<[u8]>,
    /// Statistics of the merge.
    pub statistics: MergeStatistics,
}

impl Download {
    /// Content type of the download.
    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    /// Write the merged PDF into `dir` under the download's file name.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::OutputExists`](crate::MergeError::OutputExists)
    /// if the target exists and `writer` does not overwrite, and
    /// [`MergeError::InvalidConfig`](crate::MergeError::InvalidConfig) if
    /// `dir` does not exist.
    pub async fn save_to_dir(&self, dir: &Path, writer: &PdfWriter) -> Result<WriteStatistics> {
        let path = dir.join(&self.file_name);
        writer.can_write(&path).await?;
        writer.save_with_stats(&self.bytes, &path).await
    }
}
