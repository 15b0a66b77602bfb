//! Error types for pdfmerge.
//!
//! Every failure inside a merge invocation is reported as one [`MergeError`].
//! The merge is all-or-nothing, so callers only ever see a single error and
//! never a half-built result. [`MergeError::user_message`] gives the one
//! generic notification a user is shown, while the `Display` text carries the
//! diagnostic detail that goes to the log.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmerge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Message shown to the user for any failed merge.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error merging PDFs, try again.";

/// Main error type for pdfmerge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Fewer than two inputs were supplied.
    #[error("At least 2 PDF files are required to merge, got {count}")]
    NotEnoughInputs {
        /// Number of inputs that were supplied.
        count: usize,
    },

    /// A merge is already running for this session.
    #[error("A merge is already in progress")]
    Busy,

    /// The input list changed while a merge was running.
    #[error("Input list changed while merging; run the merge again")]
    InputsChanged,

    /// An input file could not be read from disk.
    #[error("Failed to read input file: {}\n  Reason: {source}", .path.display())]
    ReadFailed {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An input could not be decoded as a PDF.
    #[error("Failed to decode PDF #{} ({name})\n  Reason: {reason}", .index + 1)]
    Decode {
        /// Position of the input in the list.
        index: usize,
        /// Display name of the input.
        name: String,
        /// Parser message.
        reason: String,
    },

    /// An input is encrypted and cannot be processed.
    #[error(
        "PDF #{} ({name}) is encrypted and cannot be merged\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .index + 1
    )]
    Encrypted {
        /// Position of the input in the list.
        index: usize,
        /// Display name of the input.
        name: String,
    },

    /// A requested page does not exist in the source document.
    #[error("Page index {page} does not exist in source document ({total} page(s))")]
    PageNotFound {
        /// Zero-based page index that was requested.
        page: usize,
        /// Number of pages in the source.
        total: usize,
    },

    /// A page handle was added to a document it was not copied into.
    #[error("Page handle belongs to a different output document")]
    ForeignPage,

    /// The output page tree could not be updated.
    #[error("Failed to assemble merged document: {reason}")]
    Assemble {
        /// What went wrong.
        reason: String,
    },

    /// The merged document could not be serialized.
    #[error("Failed to encode merged PDF: {reason}")]
    Encode {
        /// Serializer message.
        reason: String,
    },

    /// An input exceeds the enforced size limit.
    #[error("{name} is {size} bytes, which exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Display name of the input.
        name: String,
        /// Size of the input in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Removal of an entry that is not in the list.
    #[error("No input at position {index} (list has {len} file(s))")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Current list length.
        len: usize,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output directory",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the merged PDF to disk.
    #[error("Failed to write output file: {}\n  Reason: {source}", .path.display())]
    WriteFailed {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl MergeError {
    /// Create a Decode error.
    pub fn decode(index: usize, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            index,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an Assemble error.
    pub fn assemble(reason: impl Into<String>) -> Self {
        Self::Assemble {
            reason: reason.into(),
        }
    }

    /// Create an Encode error.
    pub fn encode(reason: impl Into<String>) -> Self {
        Self::Encode {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// True for failures caused by input content that could not be parsed.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::Encrypted { .. })
    }

    /// The single user-visible notification for this failure.
    ///
    /// Pipeline failures collapse into one generic message. Session guards
    /// keep their own wording since they are not merge failures.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotEnoughInputs { .. }
            | Self::Busy
            | Self::InputsChanged
            | Self::FileTooLarge { .. }
            | Self::OutputExists { .. }
            | Self::InvalidConfig { .. } => self.to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotEnoughInputs { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::IndexOutOfRange { .. } => 1,
            Self::ReadFailed { .. } => 2,
            Self::Decode { .. } => 3,
            Self::Encrypted { .. } => 3,
            Self::FileTooLarge { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::WriteFailed { .. } => 5,
            Self::Io(_) => 5,
            Self::PageNotFound { .. } => 6,
            Self::ForeignPage => 6,
            Self::Assemble { .. } => 6,
            Self::Encode { .. } => 6,
            Self::Busy => 7,
            Self::InputsChanged => 7,
            Self::Other { .. } => 1,
        }
    }
}
