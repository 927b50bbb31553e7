use crate::audit::domain::{AffectedResource, Finding, Report, SkippedEvaluation};
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    report_id: String,
    generated_at: String,
    scope: &'a str,
    resources_evaluated: usize,
    total_potential_savings: f64,
    messages_at_risk: u64,
    severity_summary: SeveritySummary,
    findings_by_category: Vec<CategorySummary>,
    findings: Vec<JsonFinding<'a>>,
    #[serde(skip_serializing_if = "no_skips")]
    skipped_evaluations: &'a [SkippedEvaluation],
}

#[derive(Debug, Serialize)]
struct SeveritySummary {
    critical: usize,
    high: usize,
    medium: usize,
    low: usize,
    total: usize,
}

#[derive(Debug, Serialize)]
struct CategorySummary {
    category: String,
    findings: usize,
    affected_resources: usize,
    potential_savings: f64,
}

#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    category: String,
    check_id: &'static str,
    severity: &'static str,
    resource_type: &'a str,
    action: &'a str,
    details: &'a str,
    potential_savings: f64,
    created_at: String,
    affected_resources: &'a [AffectedResource],
}

/// JsonFormatter adapter for the machine-readable report
///
/// Always carries the full affected-resource lists and unrounded amounts;
/// only the CSV and console views round to cents.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let counts = report.severity_counts();
        let document = JsonReport {
            report_id: report.report_id().to_string(),
            generated_at: report.generated_at().to_rfc3339(),
            scope: report.scope(),
            resources_evaluated: report.resources_evaluated(),
            total_potential_savings: report.total_potential_savings(),
            messages_at_risk: report.messages_at_risk(),
            severity_summary: SeveritySummary {
                critical: counts.critical,
                high: counts.high,
                medium: counts.medium,
                low: counts.low,
                total: counts.total(),
            },
            findings_by_category: report
                .by_category()
                .iter()
                .map(|group| CategorySummary {
                    category: group.category.label().to_string(),
                    findings: group.findings.len(),
                    affected_resources: group.resource_count(),
                    potential_savings: group.potential_savings(),
                })
                .collect(),
            findings: report.findings().iter().map(build_finding).collect(),
            skipped_evaluations: report.skipped_evaluations(),
        };

        serde_json::to_string_pretty(&document).map_err(Into::into)
    }
}

fn build_finding(finding: &Finding) -> JsonFinding<'_> {
    JsonFinding {
        category: finding.category().label().to_string(),
        check_id: finding.check_id().as_str(),
        severity: finding.severity().as_str(),
        resource_type: finding.resource_type(),
        action: finding.action(),
        details: finding.details(),
        potential_savings: finding.potential_savings(),
        created_at: finding.created_at().to_rfc3339(),
        affected_resources: finding.affected_resources(),
    }
}

fn no_skips(skipped: &&[SkippedEvaluation]) -> bool {
    skipped.is_empty()
}
