//! Writing merged PDFs to disk.
//!
//! This module provides safe PDF writing with:
//! - Atomic writes (write to temp file, then rename)
//! - Overwrite protection
//! - Write statistics
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&bytes, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{MergeError, Result};
use crate::utils::format_file_size;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Replace an existing file at the destination.
    pub overwrite: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            overwrite: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer that replaces existing files.
    pub fn overwriting() -> Self {
        Self {
            options: WriteOptions {
                overwrite: true,
                ..Default::default()
            },
        }
    }

    /// Save PDF bytes to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists and overwriting is disabled
    /// - Insufficient permissions
    /// - Disk full
    pub async fn save(&self, bytes: &[u8], path: &Path) -> Result<()> {
        let _stats = self.save_with_stats(bytes, path).await?;
        Ok(())
    }

    /// Save PDF bytes and return statistics about the operation.
    pub async fn save_with_stats(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        if !self.options.overwrite && self.exists(path).await {
            return Err(MergeError::OutputExists {
                path: path.to_path_buf(),
            });
        }

        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let data = bytes.to_vec();

        task::spawn_blocking(move || write_file(&data, &path_buf, &options))
            .await
            .map_err(|e| MergeError::other(format!("Write task failed: {e}")))?
    }

    /// Check if a file can be written to the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory doesn't exist or is not
    /// writable.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
                MergeError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ))
            })?;

            if !metadata.is_dir() {
                return Err(MergeError::invalid_config(format!(
                    "Output path is not a directory: {}",
                    parent.display()
                )));
            }

            if metadata.permissions().readonly() {
                return Err(MergeError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn write_file(data: &[u8], path: &Path, options: &WriteOptions) -> Result<WriteStatistics> {
    let start = Instant::now();

    let write_path = if options.atomic {
        path.with_extension("tmp")
    } else {
        path.to_path_buf()
    };

    let file = std::fs::File::create(&write_path).map_err(|e| MergeError::WriteFailed {
        path: write_path.clone(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
    writer
        .write_all(data)
        .and_then(|_| writer.flush())
        .map_err(|e| MergeError::WriteFailed {
            path: write_path.clone(),
            source: e,
        })?;
    drop(writer);

    if options.atomic {
        std::fs::rename(&write_path, path).map_err(|e| {
            // Leave nothing half-written behind.
            let _ = std::fs::remove_file(&write_path);
            MergeError::WriteFailed {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
    }

    Ok(WriteStatistics {
        write_time: start.elapsed(),
        file_size: data.len() as u64,
        output_path: path.to_path_buf(),
    })
}
