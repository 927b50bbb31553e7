/// ProgressReporter port for reporting progress during an audit run
///
/// This port abstracts progress reporting (e.g., to stderr)
/// so the use case can give feedback without touching the terminal.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress through the check catalog
    ///
    /// # Arguments
    /// * `current` - Checks completed so far
    /// * `total` - Checks in the catalog
    /// * `message` - Optional message to include
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports a warning, such as a locally recovered check failure
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
