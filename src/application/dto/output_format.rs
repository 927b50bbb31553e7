/// Output format enumeration for audit reports
///
/// JSON and CSV are written as files; the table is printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Full machine-readable report
    Json,
    /// One row per finding
    Csv,
    /// Console grids
    Table,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Csv, OutputFormat::Table];

    /// File extension for formats written to disk; `None` for stdout formats
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Json => Some("json"),
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Table => None,
        }
    }

    /// Parses format names, dropping duplicates but keeping order
    pub fn parse_list<I, S>(names: I) -> Result<Vec<OutputFormat>, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut formats = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            let format: OutputFormat = name.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err("At least one output format is required".to_string());
        }
        Ok(formats)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "table" | "console" => Ok(OutputFormat::Table),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'json', 'csv' or 'table'",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str_case_insensitive() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("Csv").unwrap(), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str("console").unwrap(),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        let error = OutputFormat::from_str("markdown").unwrap_err();
        assert!(error.contains("Invalid format"));
        assert!(error.contains("table"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            OutputFormat::parse_list(["json", " table", "json"]).unwrap(),
            vec![OutputFormat::Json, OutputFormat::Table]
        );
        assert!(OutputFormat::parse_list([" ", ""]).is_err());
        assert!(OutputFormat::parse_list(vec!["json".to_string(), "xml".to_string()]).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(OutputFormat::Json.file_extension(), Some("json"));
        assert_eq!(OutputFormat::Csv.file_extension(), Some("csv"));
        assert_eq!(OutputFormat::Table.file_extension(), None);
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Table.to_string(), "table");
    }
}
