//! CLI argument parsing for pdfmerge.
//!
//! This module defines the command-line interface using `clap`. The command
//! line plays the role of a file picker: every argument is appended to the
//! selection in the order given, and the merged document is "downloaded" into
//! the output directory under the configured file name.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Selected {} argument(s)", cli.inputs.len());
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::config::{MIN_INPUTS, MergeConfig};
use crate::error::{MergeError, Result};
use crate::utils::collect_paths_for_patterns;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Combine PDF files into a single document.
///
/// Pages are copied in the order the files are given, each file's own page
/// order preserved. The result is written as one PDF into the output
/// directory.
#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version)]
#[command(about = "Combine PDF files into a single document", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// PDF files to merge, in order
    ///
    /// Glob patterns are expanded in place, so their matches keep the
    /// position of the pattern among the other arguments.
    ///
    /// Examples:
    ///   pdfmerge cover.pdf body.pdf
    ///   pdfmerge 'chapters/*.pdf' -o out/
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Directory the merged PDF is written to
    #[arg(
        short,
        long,
        value_name = "DIR",
        env = "PDFMERGE_OUTPUT_DIR",
        default_value = "."
    )]
    pub output_dir: PathBuf,

    /// File name of the merged PDF (default: merged.pdf)
    #[arg(long, value_name = "NAME")]
    pub file_name: Option<String>,

    /// Per-file size limit in megabytes (default: 10)
    #[arg(long, value_name = "MB", env = "PDFMERGE_MAX_FILE_SIZE")]
    pub max_file_size: Option<u64>,

    /// How the size limit is applied
    ///
    /// - off: no check
    /// - advisory: warn about oversized files but merge them (default)
    /// - enforce: refuse to merge oversized files
    #[arg(long, value_name = "POLICY", env = "PDFMERGE_SIZE_LIMIT")]
    #[arg(value_parser = ["off", "advisory", "enforce"])]
    pub size_limit: Option<String>,

    /// Read settings from a JSON file
    ///
    /// Flags and environment variables take precedence over the file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    pub force: bool,

    /// Show statistics and log progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Build the session configuration.
    ///
    /// Sources are applied in order of precedence: defaults, then the JSON
    /// file given with `--config`, then flags and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// the resulting configuration is invalid.
    pub async fn resolve_config(&self) -> Result<MergeConfig> {
        let mut config = match &self.config {
            Some(path) => MergeConfig::load(path).await?,
            None => MergeConfig::default(),
        };

        if let Some(name) = &self.file_name {
            config.file_name = name.clone();
        }

        if let Some(mb) = self.max_file_size {
            config.max_file_size = mb.saturating_mul(BYTES_PER_MB);
        }

        if let Some(policy) = &self.size_limit {
            config.size_limit = policy.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Expand the input arguments into paths, keeping argument order.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::NotEnoughInputs`] if fewer than two paths
    /// remain after expansion, or an error for a malformed pattern.
    pub fn input_paths(&self) -> Result<Vec<PathBuf>> {
        let paths = collect_paths_for_patterns(&self.inputs)?;
        if paths.len() < MIN_INPUTS {
            return Err(MergeError::NotEnoughInputs { count: paths.len() });
        }
        Ok(paths)
    }
}
