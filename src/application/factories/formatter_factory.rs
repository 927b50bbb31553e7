use crate::adapters::outbound::formatters::{CsvFormatter, JsonFormatter, TableFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::ReportFormatter;

/// Factory for creating report formatters
///
/// Selects the formatter adapter for each requested output format.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified output format
    ///
    /// # Examples
    /// ```
    /// use cloud_audit::application::dto::OutputFormat;
    /// use cloud_audit::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Csv);
    /// ```
    pub fn create(format: OutputFormat) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Csv => Box::new(CsvFormatter::new()),
            OutputFormat::Table => Box::new(TableFormatter::new()),
        }
    }

    /// Returns the progress message for the specified output format
    ///
    /// # Examples
    /// ```
    /// use cloud_audit::application::dto::OutputFormat;
    /// use cloud_audit::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Json);
    /// assert_eq!(message, "📝 Generating JSON report...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Json => "📝 Generating JSON report...",
            OutputFormat::Csv => "📝 Generating CSV report...",
            OutputFormat::Table => "📝 Rendering console summary...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::Report;
    use chrono::Utc;

    fn empty_report() -> Report {
        Report::new("us-east-1".to_string(), Utc::now(), vec![], 0, 0, vec![])
    }

    #[test]
    fn test_every_format_has_a_formatter() {
        let report = empty_report();
        for format in OutputFormat::ALL {
            let output = FormatterFactory::create(format).format(&report).unwrap();
            assert!(!output.is_empty(), "{} produced no output", format);
        }
    }

    #[test]
    fn test_csv_formatter_selected() {
        let output = FormatterFactory::create(OutputFormat::Csv)
            .format(&empty_report())
            .unwrap();
        assert!(output.starts_with("Resource Id,Resource Type"));
    }

    #[test]
    fn test_progress_messages() {
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Csv),
            "📝 Generating CSV report..."
        );
        assert_eq!(
            FormatterFactory::progress_message(OutputFormat::Table),
            "📝 Rendering console summary..."
        );
    }
}
