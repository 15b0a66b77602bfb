//! PDF merge pipeline.
//!
//! - [`document`]: decoded sources, the output document and page handles
//! - [`merger`]: the ordered merge over a list of inputs

pub mod document;
pub mod merger;

pub use document::{OutputDocument, PageHandle, SourceDocument};
pub use merger::{MergeStatistics, MergedPdf, Merger};

use crate::error::Result;
use crate::input::InputFile;

/// Merge `inputs` in order with default settings and return the PDF bytes.
///
/// This is a pure function of the ordered inputs; no state is kept between
/// calls.
pub fn merge_pdfs(inputs: &[InputFile]) -> Result<Vec<u8>> {
    Merger::new().merge(inputs).map(|merged| merged.bytes)
}
