//! Reading user-selected files into [`InputFile`]s.
//!
//! Files are read concurrently but always returned in the order they were
//! requested, since that order is the page order of the merge.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::reader::PdfReader;
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let paths = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let inputs = reader.read_all(&paths).await?;
//! # Ok(())
//! # }
//! ```

use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};

use crate::error::{MergeError, Result};
use crate::input::InputFile;

/// Default number of files read at the same time.
const DEFAULT_WORKERS: usize = 4;

/// Reads PDF files from disk.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Maximum number of concurrent reads.
    workers: usize,
}

impl PdfReader {
    /// Create a new reader with default settings.
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }

    /// Create a reader with a custom number of concurrent reads.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Read a single file.
    ///
    /// The display name is the file name component of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ReadFailed`] if the file cannot be read.
    pub async fn read(&self, path: &Path) -> Result<InputFile> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| MergeError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        tracing::debug!(path = %path.display(), size = bytes.len(), "read input file");
        Ok(InputFile::new(name, bytes))
    }

    /// Read several files, preserving their order.
    ///
    /// Stops at the first file that cannot be read.
    pub async fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<InputFile>> {
        stream::iter(paths)
            .map(|path| self.read(path))
            .buffered(self.workers)
            .try_collect()
            .await
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
