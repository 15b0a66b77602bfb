//! File I/O for merge inputs and the merged output.

pub mod reader;
pub mod writer;

pub use reader::PdfReader;
pub use writer::{PdfWriter, WriteOptions, WriteStatistics};
