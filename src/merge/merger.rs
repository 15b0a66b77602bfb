//! Core PDF merging implementation.
//!
//! The merger is a linear reducer over the input list: every input is
//! decoded, all of its pages are copied into one output document in their
//! original order, and the result is serialized once all inputs are done.
//! Any failure aborts the whole merge and nothing partial is returned.

use std::time::{Duration, Instant};
use tokio::task;

use crate::config::{DEFAULT_PDF_VERSION, MIN_INPUTS};
use crate::error::{MergeError, Result};
use crate::input::InputFile;
use crate::merge::document::{OutputDocument, SourceDocument};
use crate::utils::format_file_size;

/// Statistics about a merge operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in merged document.
    pub total_pages: usize,

    /// Pages contributed by each input, in input order.
    pub pages_per_file: Vec<usize>,

    /// Total size of input files.
    pub input_size: u64,

    /// Size of the merged PDF.
    pub output_size: u64,

    /// Total time taken for merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Bytes of a successfully merged PDF.
#[derive(Debug, Clone)]
pub struct MergedPdf {
    /// The encoded PDF.
    pub bytes: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// PDF merger that combines multiple documents.
#[derive(Debug, Clone)]
pub struct Merger {
    /// Header version of the output document.
    pdf_version: String,
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::with_version(DEFAULT_PDF_VERSION)
    }

    /// Create a merger writing the given PDF header version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
        }
    }

    /// Merge `inputs` in list order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two inputs are given
    /// - Any input cannot be decoded
    /// - The merged document cannot be encoded
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pdfmerge::{InputFile, merge::Merger};
    /// # fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = Merger::new();
    /// let merged = merger.merge(&[InputFile::new("a.pdf", a), InputFile::new("b.pdf", b)])?;
    /// println!("Merged {} pages", merged.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge(&self, inputs: &[InputFile]) -> Result<MergedPdf> {
        if inputs.len() < MIN_INPUTS {
            return Err(MergeError::NotEnoughInputs {
                count: inputs.len(),
            });
        }

        let start = Instant::now();
        let mut output = OutputDocument::new(&self.pdf_version);
        let mut pages_per_file = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.iter().enumerate() {
            let source = SourceDocument::from_input(index, input)?;
            let indices: Vec<usize> = source.page_indices().collect();

            for handle in output.copy_pages(&source, &indices)? {
                output.add_page(handle)?;
            }

            tracing::debug!(
                index,
                name = input.name(),
                pages = indices.len(),
                version = source.version(),
                "appended input"
            );
            pages_per_file.push(indices.len());
        }

        let total_pages = output.page_count();
        let bytes = output.save()?;

        let statistics = MergeStatistics {
            files_merged: inputs.len(),
            total_pages,
            pages_per_file,
            input_size: inputs.iter().map(InputFile::size).sum(),
            output_size: bytes.len() as u64,
            merge_time: start.elapsed(),
        };

        Ok(MergedPdf { bytes, statistics })
    }

    /// Merge on the blocking thread pool.
    ///
    /// Decoding and encoding are CPU-bound; this keeps the async runtime
    /// responsive while a large merge runs.
    pub async fn merge_async(&self, inputs: Vec<InputFile>) -> Result<MergedPdf> {
        let merger = self.clone();
        task::spawn_blocking(move || merger.merge(&inputs))
            .await
            .map_err(|e| MergeError::other(format!("Merge task failed: {e}")))?
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}
