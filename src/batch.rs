//! Sequential batch normalization of SVG files
//!
//! Each file is read, normalized and written back before the next one is
//! opened. A failure is logged against the file that caused it and the batch
//! moves on; nothing is rolled back or retried.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::document::Document;
use crate::error::NormalizeError;
use crate::normalize::{normalize, BoundingBox, IdPrefix, NormalizeOptions, NormalizeReport};

/// Options for a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub normalize: NormalizeOptions,
    /// Normalize without writing anything back
    pub dry_run: bool,
}

impl BatchOptions {
    pub fn new(normalize: NormalizeOptions) -> Self {
        Self {
            normalize,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of processing one file
#[derive(Debug)]
pub enum FileOutcome {
    Normalized(NormalizeReport),
    Failed(NormalizeError),
}

/// Per-file outcomes of a batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<(PathBuf, FileOutcome)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    /// Files written without any warning
    pub fn normalized(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Normalized(r) if !r.has_warnings()))
    }

    /// Files written, but with warnings (typically no derivable viewBox)
    pub fn warned(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Normalized(r) if r.has_warnings()))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &NormalizeError)> {
        self.files.iter().filter_map(|(path, outcome)| match outcome {
            FileOutcome::Failed(e) => Some((path.as_path(), e)),
            FileOutcome::Normalized(_) => None,
        })
    }

    /// One-line summary, e.g. `Processed 3 files: 2 normalized, 0 warned, 1 failed.`
    pub fn summary(&self) -> String {
        format!(
            "Processed {} files: {} normalized, {} warned, {} failed.",
            self.total(),
            self.normalized(),
            self.warned(),
            self.failed()
        )
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Whether the path ends in `.svg`, ignoring ASCII case
pub fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// SVG files directly inside `dir` (not recursive), sorted by path
pub fn collect_svg_files(dir: &Path) -> Result<Vec<PathBuf>, NormalizeError> {
    let entries = fs::read_dir(dir).map_err(|e| NormalizeError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| NormalizeError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_svg_path(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Normalize SVG source text, returning the serialized result
///
/// The prefix for identifiers is passed in, since there is no file name.
pub fn normalize_str(
    source: &str,
    prefix: &IdPrefix,
    bbox: Option<&BoundingBox>,
    options: &NormalizeOptions,
) -> Result<(String, NormalizeReport), NormalizeError> {
    let mut doc = Document::parse(source)?;
    let report = normalize(&mut doc, prefix, bbox, options);
    Ok((doc.to_xml(), report))
}

/// Normalize one file, overwriting it in place unless `dry_run` is set
///
/// The identifier prefix comes from the file name.
pub fn normalize_file(
    path: &Path,
    bbox: Option<&BoundingBox>,
    options: &NormalizeOptions,
    dry_run: bool,
) -> Result<NormalizeReport, NormalizeError> {
    let source = fs::read_to_string(path).map_err(|e| NormalizeError::io(path, e))?;

    let mut doc = Document::parse(&source).inspect_err(|e| {
        debug!("\n{}", e.format(&source, &path.display().to_string()));
    })?;
    let report = normalize(&mut doc, &IdPrefix::from_path(path), bbox, options);

    if !dry_run {
        write_document(&doc, path)?;
    }
    Ok(report)
}

/// Write next to `path` and rename over it, so a failed write leaves the
/// original file intact
fn write_document(doc: &Document, path: &Path) -> Result<(), NormalizeError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |e: io::Error| NormalizeError::io(path, e);

    let permissions = fs::metadata(path).map_err(io_err)?.permissions();
    let tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.as_file().set_permissions(permissions).map_err(io_err)?;

    let mut out = BufWriter::new(tmp);
    doc.write_to(&mut out)
        .and_then(|()| out.flush())
        .map_err(io_err)?;
    let tmp = out.into_inner().map_err(|e| io_err(e.into_error()))?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Normalize every file in order; failures are isolated to their file
pub fn run_batch(files: &[PathBuf], options: &BatchOptions) -> BatchReport {
    let mut report = BatchReport::default();

    for path in files {
        let outcome = match normalize_file(path, None, &options.normalize, options.dry_run) {
            Ok(file_report) => {
                log_report(path, &file_report);
                FileOutcome::Normalized(file_report)
            }
            Err(e) => {
                error!(file = %path.display(), "{}", e);
                FileOutcome::Failed(e)
            }
        };
        report.files.push((path.clone(), outcome));
    }

    report
}

/// Normalize every SVG file directly inside `dir`
///
/// Only a failure to list the directory is returned as an error.
pub fn normalize_dir(dir: &Path, options: &BatchOptions) -> Result<BatchReport, NormalizeError> {
    let files = collect_svg_files(dir)?;
    info!(dir = %dir.display(), count = files.len(), "normalizing directory");
    Ok(run_batch(&files, options))
}

fn log_report(path: &Path, report: &NormalizeReport) {
    let file = path.display();
    for warning in &report.warnings {
        warn!(file = %file, "{}", warning);
    }
    info!(
        file = %file,
        viewbox = %report.viewbox,
        ids = report.renamed_ids,
        "normalized"
    );
}
