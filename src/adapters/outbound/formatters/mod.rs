/// Formatter adapters for the report output formats
mod csv_formatter;
mod json_formatter;
mod table_formatter;

pub use csv_formatter::CsvFormatter;
pub use json_formatter::JsonFormatter;
pub use table_formatter::TableFormatter;
