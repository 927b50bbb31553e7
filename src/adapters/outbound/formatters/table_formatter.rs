use crate::audit::domain::{Finding, Report, Severity};
use crate::audit::services::{truncate_for_console, CONSOLE_RESOURCE_LIMIT};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// TableFormatter adapter for console output
///
/// Renders a severity summary, a per-category summary and a detail grid
/// sorted by severity, followed by a totals line.
pub struct TableFormatter {
    colored: bool,
}

impl TableFormatter {
    /// Colours the lines outside the grids when stdout is a terminal
    pub fn new() -> Self {
        Self {
            colored: std::io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }

    fn severity_color(severity: Severity) -> Color {
        match severity {
            Severity::Critical => Color::Red,
            Severity::High => Color::Yellow,
            Severity::Medium => Color::Cyan,
            Severity::Low => Color::DarkGrey,
        }
    }

    fn new_table(headers: &[&str]) -> Table {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
        table
    }

    fn severity_table(report: &Report) -> Table {
        let mut table = Self::new_table(&["Severity", "Affected Resources"]);
        let counts = report.severity_counts();
        for severity in Severity::ALL {
            table.add_row(vec![
                Cell::new(severity.as_str()).fg(Self::severity_color(severity)),
                Cell::new(counts.get(severity)).set_alignment(CellAlignment::Right),
            ]);
        }
        table.add_row(vec![
            Cell::new("total"),
            Cell::new(counts.total()).set_alignment(CellAlignment::Right),
        ]);
        table
    }

    fn category_table(report: &Report) -> Table {
        let mut table =
            Self::new_table(&["Category", "Findings", "Affected Resources", "Potential Savings"]);
        for group in report.by_category() {
            table.add_row(vec![
                Cell::new(group.category.label()),
                Cell::new(group.findings.len()).set_alignment(CellAlignment::Right),
                Cell::new(group.resource_count()).set_alignment(CellAlignment::Right),
                Cell::new(format!("${:.2}", group.potential_savings()))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    fn detail_table(report: &Report) -> Table {
        let mut table = Self::new_table(&[
            "Severity",
            "Check",
            "Resource Type",
            "Affected Resources",
            "Action",
            "Savings",
        ]);
        for finding in report.sorted_by_severity() {
            table.add_row(vec![
                Cell::new(finding.severity().as_str())
                    .fg(Self::severity_color(finding.severity())),
                Cell::new(finding.check_id().as_str()),
                Cell::new(finding.resource_type()),
                Cell::new(Self::resource_listing(finding)),
                Cell::new(finding.action()),
                Cell::new(format!("${:.2}", finding.potential_savings()))
                    .set_alignment(CellAlignment::Right),
            ]);
        }
        table
    }

    /// One resource per line, truncated with a `+N more` marker
    fn resource_listing(finding: &Finding) -> String {
        let (shown, hidden) =
            truncate_for_console(finding.affected_resources(), CONSOLE_RESOURCE_LIMIT);
        let mut lines: Vec<String> = shown
            .iter()
            .map(|r| match r.message_count {
                Some(count) => format!("{} ({} msgs)", r.name, count),
                None => r.name.clone(),
            })
            .collect();
        if hidden > 0 {
            lines.push(format!("+{} more", hidden));
        }
        lines.join("\n")
    }

    fn title(&self, report: &Report) -> String {
        let title = format!(
            "Cloud audit report for {} ({} resources evaluated, {})",
            report.scope(),
            report.resources_evaluated(),
            report.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
        if self.colored {
            title.bold().to_string()
        } else {
            title
        }
    }

    fn totals_line(&self, report: &Report) -> String {
        let totals = format!(
            "Total: {} finding(s), ${:.2} potential monthly savings, {} message(s) at risk",
            report.findings().len(),
            report.total_potential_savings(),
            report.messages_at_risk()
        );
        if !self.colored {
            return totals;
        }
        if report.has_findings_at_or_above(Severity::Critical) {
            totals.red().bold().to_string()
        } else if report.is_empty() {
            totals.green().to_string()
        } else {
            totals.yellow().to_string()
        }
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for TableFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        output.push_str(&self.title(report));
        output.push_str("\n\n");

        output.push_str(&Self::severity_table(report).to_string());
        output.push_str("\n\n");

        if report.is_empty() {
            output.push_str("No findings.\n\n");
        } else {
            output.push_str(&Self::category_table(report).to_string());
            output.push_str("\n\n");
            output.push_str(&Self::detail_table(report).to_string());
            output.push_str("\n\n");
        }

        output.push_str(&self.totals_line(report));
        output.push('\n');
        Ok(output)
    }
}
