//! Output formatting and display for pdfmerge.
//!
//! This module handles the user-facing side of the command line host:
//! - Formatted status messages in quiet and verbose modes
//! - The selected file list
//! - Merge summaries
//!
//! Diagnostics for developers go through `tracing` instead.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::input::InputFile;
use crate::io::WriteStatistics;
use crate::merge::MergeStatistics;
use crate::utils::format_file_size;

/// Display the selected files in merge order.
pub fn display_file_list(formatter: &OutputFormatter, files: &[InputFile]) {
    if !formatter.should_print() {
        return;
    }

    formatter.section(&format!("{} file(s) selected", files.len()));
    for (i, file) in files.iter().enumerate() {
        formatter.list_item(
            i + 1,
            &format!("{} ({})", file.name(), format_file_size(file.size())),
        );
    }
}

/// Display statistics about a finished merge and the written file.
pub fn display_merge_summary(
    formatter: &OutputFormatter,
    statistics: &MergeStatistics,
    write_stats: &WriteStatistics,
) {
    formatter.success(&format!(
        "Created {} ({})",
        write_stats.output_path.display(),
        write_stats.format_file_size()
    ));

    if !formatter.is_verbose() {
        return;
    }

    formatter.section("Statistics");
    formatter.detail("Input files", &statistics.files_merged.to_string());
    formatter.detail("Total pages", &statistics.total_pages.to_string());
    let per_file = statistics
        .pages_per_file
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    formatter.detail("Pages per file", &per_file);
    formatter.detail("Input size", &statistics.format_input_size());
    formatter.detail("Output size", &statistics.format_output_size());
    formatter.detail(
        "Merge time",
        &format!("{:.2}s", statistics.merge_time.as_secs_f64()),
    );
    formatter.detail(
        "Write time",
        &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
    );
}
