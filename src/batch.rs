//! Batch processing of a directory of PDF files.
//!
//! Files are processed one after another. A failure in one file, whether an
//! error or a panic, is recorded in its [`FileOutcome`] and the batch moves
//! on to the next file.
//!
//! # Example
//!
//! ```no_run
//! use pdfreflow::batch::{run_batch, BatchConfig};
//! use pdfreflow::TextExtractor;
//!
//! fn main() -> pdfreflow::Result<()> {
//!     let config = BatchConfig::new("papers").with_output_dir("papers/txt");
//!     let report = run_batch(&config, &TextExtractor::new())?;
//!     println!("{} of {} files cleaned", report.succeeded().count(), report.len());
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::collections::HashSet;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::parser::TextExtractor;

/// Where to find input files and where to put the outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory scanned for inputs (not recursive)
    pub input_dir: PathBuf,

    /// Output directory; outputs go next to the inputs when unset
    pub output_dir: Option<PathBuf>,

    /// Input file extension, matched case-insensitively
    pub extension: String,

    /// Extension given to output files
    pub output_extension: String,
}

impl BatchConfig {
    /// Create a configuration for `input_dir` with default extensions.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            extension: "pdf".to_string(),
            output_extension: "txt".to_string(),
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the input extension (a leading dot is ignored).
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        self.extension = normalize_extension(ext.into());
        self
    }

    /// Set the output extension (a leading dot is ignored).
    pub fn with_output_extension(mut self, ext: impl Into<String>) -> Self {
        self.output_extension = normalize_extension(ext.into());
        self
    }

    /// Directory outputs are written to.
    pub fn effective_output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.input_dir)
    }

    /// Output path for an input: the matched input suffix is replaced by
    /// `.<output_extension>` and the result placed in the output directory.
    /// Names that do not carry the input suffix lose their last extension.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let stem = self.matched_stem(input).unwrap_or_else(|| {
            input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        });
        self.effective_output_dir()
            .join(format!("{}.{}", stem, self.output_extension))
    }

    fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            return Err(Error::Config("input extension is empty".to_string()));
        }
        if self.output_extension.is_empty() {
            return Err(Error::Config("output extension is empty".to_string()));
        }
        if self.extension.eq_ignore_ascii_case(&self.output_extension)
            && same_dir(&self.input_dir, self.effective_output_dir())
        {
            return Err(Error::Config(format!(
                "output extension .{} would overwrite the inputs in {}",
                self.output_extension,
                self.input_dir.display()
            )));
        }
        Ok(())
    }

    fn matches(&self, path: &Path) -> bool {
        self.matched_stem(path).is_some()
    }

    /// The file name with the input suffix removed, if the name ends in
    /// `.<extension>` (ASCII case-insensitive). `.pdf` itself has an empty stem.
    fn matched_stem(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        let suffix = format!(".{}", self.extension);
        let cut = name.len().checked_sub(suffix.len())?;
        let tail = name.get(cut..)?;
        tail.eq_ignore_ascii_case(&suffix)
            .then(|| name[..cut].to_string())
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn normalize_extension(ext: String) -> String {
    ext.trim_start_matches('.').to_string()
}

/// An input file paired with its output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Converts one input file into one output file.
pub trait DocumentProcessor {
    /// Process `input` and write the result to `output`.
    ///
    /// Returns the path actually written.
    fn process(&self, input: &Path, output: &Path) -> Result<PathBuf>;
}

impl DocumentProcessor for TextExtractor {
    fn process(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        self.parse(input, Some(output))
    }
}

/// Result of processing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Input file
    pub input: PathBuf,
    /// Intended output file
    pub output: PathBuf,
    /// Failure message, `None` on success
    pub error: Option<String>,
}

impl FileOutcome {
    /// Check whether the file was processed successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Outcomes of files that were processed successfully.
    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Outcomes of files that failed.
    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Check whether every file succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_success)
    }

    /// Number of files processed.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check whether no files were processed.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// List matching input files, sorted by path, with their output paths.
///
/// Only regular files directly inside `input_dir` are considered.
pub fn collect_inputs(config: &BatchConfig) -> Result<Vec<BatchItem>> {
    config.validate()?;

    if !config.input_dir.is_dir() {
        return Err(Error::InputNotFound(config.input_dir.clone()));
    }

    let mut inputs = Vec::new();
    for entry in fs::read_dir(&config.input_dir)? {
        let path = entry?.path();
        if path.is_file() && config.matches(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();

    let items: Vec<BatchItem> = inputs
        .iter()
        .map(|input| BatchItem {
            input: input.clone(),
            output: config.output_path_for(input),
        })
        .collect();

    let sources: HashSet<&PathBuf> = inputs.iter().collect();
    if let Some(item) = items.iter().find(|item| sources.contains(&item.output)) {
        return Err(Error::Config(format!(
            "output {} would overwrite an input file",
            item.output.display()
        )));
    }

    Ok(items)
}

/// Process every matching file in the input directory.
pub fn run_batch<P>(config: &BatchConfig, processor: &P) -> Result<BatchReport>
where
    P: DocumentProcessor + ?Sized,
{
    run_batch_with_progress(config, processor, |_, _| {})
}

/// Like [`run_batch`], calling `on_file` after each file with the outcome
/// and the total number of files.
pub fn run_batch_with_progress<P, F>(
    config: &BatchConfig,
    processor: &P,
    mut on_file: F,
) -> Result<BatchReport>
where
    P: DocumentProcessor + ?Sized,
    F: FnMut(&FileOutcome, usize),
{
    let items = collect_inputs(config)?;

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir).map_err(|source| Error::Write {
            path: dir.clone(),
            source,
        })?;
    }

    log::info!(
        "Processing {} .{} file(s) from {}",
        items.len(),
        config.extension,
        config.input_dir.display()
    );

    let total = items.len();
    let mut report = BatchReport::default();

    for item in items {
        let outcome = process_item(processor, item);
        on_file(&outcome, total);
        report.outcomes.push(outcome);
    }

    log::info!(
        "Batch finished: {} succeeded, {} failed",
        report.succeeded().count(),
        report.failed().count()
    );

    Ok(report)
}

fn process_item<P: DocumentProcessor + ?Sized>(processor: &P, item: BatchItem) -> FileOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        processor.process(&item.input, &item.output)
    }));

    let error = match result {
        Ok(Ok(written)) => {
            log::info!("{} -> {}", item.input.display(), written.display());
            None
        }
        Ok(Err(e)) => Some(e.to_string()),
        Err(payload) => Some(format!("processing panicked: {}", panic_message(&*payload))),
    };

    if let Some(msg) = &error {
        log::warn!("Failed to process {}: {}", item.input.display(), msg);
    }

    FileOutcome {
        input: item.input,
        output: item.output,
        error,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
