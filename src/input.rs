//! User-supplied PDF inputs.

use std::fmt;
use std::sync::Arc;

/// One PDF as handed over by the user: a display name and its raw bytes.
///
/// The content is shared and immutable, so cloning an `InputFile` (for
/// example to snapshot the list before a merge) never copies the bytes.
/// Nothing about the content is validated here; a file that is not a PDF
/// is only rejected when a merge tries to decode it.
#[derive(Clone, PartialEq, Eq)]
pub struct InputFile {
    name: String,
    bytes: Arc<[u8]>,
}

impl InputFile {
    /// Create an input from a display name and its content.
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name as shown in the selection list.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full byte content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}
