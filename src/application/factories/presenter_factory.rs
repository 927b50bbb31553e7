use crate::adapters::outbound::filesystem::{FileSystemWriter, StdoutPresenter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::OutputPresenter;
use std::path::{Path, PathBuf};

/// Where a rendered report ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterType {
    Stdout,
    File(PathBuf),
}

/// Factory for creating output presenters
///
/// JSON and CSV artifacts go to files; the console table goes to stdout.
pub struct PresenterFactory;

impl PresenterFactory {
    /// Creates a presenter instance for the specified type
    ///
    /// # Examples
    /// ```
    /// use cloud_audit::application::factories::{PresenterFactory, PresenterType};
    ///
    /// let presenter = PresenterFactory::create(PresenterType::Stdout);
    /// ```
    pub fn create(presenter_type: PresenterType) -> Box<dyn OutputPresenter> {
        match presenter_type {
            PresenterType::Stdout => Box::new(StdoutPresenter::new()),
            PresenterType::File(path) => Box::new(FileSystemWriter::new(path)),
        }
    }
}

/// Artifact path for a file-backed format: `{output_dir}/{report_name}.{ext}`
///
/// Returns `None` for formats that are printed to stdout.
pub fn artifact_path(
    output_dir: &Path,
    report_name: &str,
    format: OutputFormat,
) -> Option<PathBuf> {
    format
        .file_extension()
        .map(|ext| output_dir.join(format!("{}.{}", report_name, ext)))
}

/// Presenter target for a format
pub fn presenter_type_for(
    output_dir: &Path,
    report_name: &str,
    format: OutputFormat,
) -> PresenterType {
    match artifact_path(output_dir, report_name, format) {
        Some(path) => PresenterType::File(path),
        None => PresenterType::Stdout,
    }
}
