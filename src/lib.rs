//! pdfmerge - Combine PDF files into a single document.
//!
//! The merge runs entirely in-process: each input is decoded, its pages are
//! copied into a fresh document in input order, and the result is encoded
//! back to bytes. Nothing leaves the process unless the caller writes it out.
//!
//! - [`merge`]: the pure pipeline, `(ordered inputs) -> bytes`
//! - [`session`]: the selected file list, busy flag and last result
//! - [`artifact`]: downloadable results and their release
//! - [`config`], [`error`]: settings and failure reporting
//! - [`cli`], [`output`]: the command line host
//!
//! # Examples
//!
//! ## Pipeline only
//!
//! ```no_run
//! use pdfmerge::InputFile;
//! use pdfmerge::merge::merge_pdfs;
//!
//! # fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let bytes = merge_pdfs(&[InputFile::new("a.pdf", a), InputFile::new("b.pdf", b)])?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Session
//!
//! ```no_run
//! use pdfmerge::{MergeConfig, MergeSession};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = MergeSession::new(MergeConfig::default())?;
//! session
//!     .add_paths(&[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")])
//!     .await?;
//!
//! let download = session.merge().await?;
//! println!("{} pages", download.statistics.total_pages);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod io;
pub mod merge;
pub mod output;
pub mod session;
pub mod utils;


// Re-export commonly used types
pub use artifact::{Download, MergeResult, ResourceRegistry};
pub use config::{MergeConfig, SizeLimit};
pub use error::{MergeError, Result};
pub use input::InputFile;
pub use session::MergeSession;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
