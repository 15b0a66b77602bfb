//! Session state around the merge pipeline.
//!
//! A [`MergeSession`] owns what a user interacts with between merges: the
//! ordered list of selected files, a busy flag, and the last successful
//! result. The pipeline itself stays a pure function of the ordered inputs;
//! the session only decides when it may run and what happens to its output.
//!
//! Rules enforced here:
//! - Files are always appended, never re-sorted.
//! - Any change to the list drops the previous result, so a stale download is
//!   never offered.
//! - Only one merge runs at a time; a second request fails fast.
//! - A failed merge leaves the list untouched and keeps no partial result.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::{InputFile, MergeConfig, MergeSession};
//!
//! # async fn example(a: Vec<u8>, b: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let session = MergeSession::new(MergeConfig::default())?;
//! session.add_files([InputFile::new("a.pdf", a), InputFile::new("b.pdf", b)]);
//!
//! let download = session.merge().await?;
//! println!("{} is ready at {}", download.file_name, download.url);
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::artifact::{Download, MergeResult, ResourceRegistry};
use crate::config::{MIN_INPUTS, MergeConfig, SizeLimit};
use crate::error::{MergeError, Result};
use crate::input::InputFile;
use crate::io::PdfReader;
use crate::merge::{MergedPdf, Merger};

#[derive(Debug, Default)]
struct SessionState {
    files: Vec<InputFile>,
    /// Bumped on every list mutation.
    generation: u64,
    result: Option<MergeResult>,
}

impl SessionState {
    /// Record a list change and hand back the result it invalidated.
    fn invalidate(&mut self) -> Option<MergeResult> {
        self.generation += 1;
        self.result.take()
    }
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Selected files, busy flag and last result of one user session.
///
/// All methods take `&self`; the session can be shared between tasks
/// behind an `Arc`.
#[derive(Debug)]
pub struct MergeSession {
    config: MergeConfig,
    merger: Merger,
    reader: PdfReader,
    registry: ResourceRegistry,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl MergeSession {
    /// Create a session with its own resource registry.
    pub fn new(config: MergeConfig) -> Result<Self> {
        Self::with_registry(config, ResourceRegistry::new())
    }

    /// Create a session publishing results into `registry`.
    pub fn with_registry(config: MergeConfig, registry: ResourceRegistry) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            merger: Merger::with_version(config.pdf_version.clone()),
            config,
            reader: PdfReader::new(),
            registry,
            state: Mutex::new(SessionState::default()),
            busy: AtomicBool::new(false),
        })
    }

    /// Configuration of this session.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Registry results are published into.
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Append files to the end of the list.
    ///
    /// Returns the number of files added. Adding at least one file drops the
    /// current result.
    pub fn add_files<I>(&self, files: I) -> usize
    where
        I: IntoIterator<Item = InputFile>,
    {
        let mut state = self.state.lock();
        let before = state.files.len();
        state.files.extend(files);
        let added = state.files.len() - before;

        let released = if added > 0 { state.invalidate() } else { None };
        let total = state.files.len();
        drop(state);
        drop(released);

        tracing::debug!(added, total, "files added to session");
        added
    }

    /// Read files from disk and append them in the given order.
    ///
    /// Nothing is added if any file cannot be read.
    pub async fn add_paths(&self, paths: &[PathBuf]) -> Result<usize> {
        let files = self.reader.read_all(paths).await?;
        Ok(self.add_files(files))
    }

    /// Remove the file at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::IndexOutOfRange`] if there is no such entry.
    pub fn remove_file(&self, index: usize) -> Result<InputFile> {
        let mut state = self.state.lock();
        let len = state.files.len();
        if index >= len {
            return Err(MergeError::IndexOutOfRange { index, len });
        }

        let removed = state.files.remove(index);
        let released = state.invalidate();
        drop(state);
        drop(released);

        tracing::debug!(index, name = removed.name(), "file removed from session");
        Ok(removed)
    }

    /// Remove every file and drop the current result.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.files.clear();
        let released = state.invalidate();
        drop(state);
        drop(released);
    }

    /// Drop the current result without touching the list.
    pub fn clear_result(&self) {
        let released = self.state.lock().result.take();
        drop(released);
    }

    /// Snapshot of the selected files, in merge order.
    pub fn files(&self) -> Vec<InputFile> {
        self.state.lock().files.clone()
    }

    /// Number of selected files.
    pub fn len(&self) -> usize {
        self.state.lock().files.len()
    }

    /// True when no file is selected.
    pub fn is_empty(&self) -> bool {
        self.state.lock().files.is_empty()
    }

    /// True while a merge is running.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// True when a merge may be started right now.
    pub fn can_merge(&self) -> bool {
        !self.is_busy() && self.len() >= MIN_INPUTS
    }

    /// The current result, if the last merge succeeded and the list has not
    /// changed since.
    pub fn result(&self) -> Option<Download> {
        self.state.lock().result.as_ref().map(MergeResult::download)
    }

    /// Merge the selected files.
    ///
    /// On success the new result replaces (and releases) the previous one.
    /// On failure the previous result and the file list are left as they
    /// were, and the merge can be retried immediately.
    ///
    /// # Errors
    ///
    /// - [`MergeError::Busy`] if another merge is running
    /// - [`MergeError::NotEnoughInputs`] with fewer than two files
    /// - [`MergeError::FileTooLarge`] if the size limit is enforced
    /// - [`MergeError::InputsChanged`] if the list changed mid-merge
    /// - any decode or encode failure of the pipeline
    pub async fn merge(&self) -> Result<Download> {
        let _busy = BusyGuard::acquire(&self.busy).ok_or(MergeError::Busy)?;

        let (files, generation) = self.snapshot();

        if files.len() < MIN_INPUTS {
            return Err(MergeError::NotEnoughInputs { count: files.len() });
        }

        tracing::info!(files = files.len(), "merging");
        let merged = match self.run(files).await {
            Ok(merged) => merged,
            Err(err) => {
                tracing::error!(error = %err, "merge failed");
                return Err(err);
            }
        };

        let download = self.publish(merged, generation)?;
        tracing::info!(
            files = download.statistics.files_merged,
            pages = download.statistics.total_pages,
            size = download.statistics.output_size,
            elapsed_ms = download.statistics.merge_time.as_millis() as u64,
            "merge completed"
        );
        Ok(download)
    }

    fn snapshot(&self) -> (Vec<InputFile>, u64) {
        let state = self.state.lock();
        (state.files.clone(), state.generation)
    }

    /// Store `merged` as the current result unless the list changed since
    /// `generation` was read.
    fn publish(&self, merged: MergedPdf, generation: u64) -> Result<Download> {
        let result = MergeResult::publish(merged, &self.registry, &self.config.file_name);
        let download = result.download();

        let mut state = self.state.lock();
        if state.generation != generation {
            drop(state);
            drop(result);
            tracing::warn!("input list changed during merge, discarding result");
            return Err(MergeError::InputsChanged);
        }
        let previous = state.result.replace(result);
        drop(state);
        drop(previous);

        Ok(download)
    }

    async fn run(&self, files: Vec<InputFile>) -> Result<MergedPdf> {
        self.check_sizes(&files)?;
        self.merger.merge_async(files).await
    }

    fn check_sizes(&self, files: &[InputFile]) -> Result<()> {
        let Some(limit) = self.config.effective_limit() else {
            return Ok(());
        };

        for file in files.iter().filter(|file| file.size() > limit) {
            match self.config.size_limit {
                SizeLimit::Enforce => {
                    return Err(MergeError::FileTooLarge {
                        name: file.name().to_string(),
                        size: file.size(),
                        limit,
                    });
                }
                SizeLimit::Advisory => {
                    tracing::warn!(
                        name = file.name(),
                        size = file.size(),
                        limit,
                        "input exceeds advisory size limit"
                    );
                }
                SizeLimit::Off => {}
            }
        }

        Ok(())
    }
}
