use crate::audit::domain::Report;
use crate::shared::Result;

/// ReportFormatter port for rendering an audit report
///
/// Implementations render the same immutable report as JSON, CSV or a
/// console table.
pub trait ReportFormatter {
    /// Renders the report
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &Report) -> Result<String>;
}
