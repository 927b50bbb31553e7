use crate::audit::domain::{Report, Severity};

/// AuditResponse - Internal response DTO from the audit use case
#[derive(Debug, Clone)]
pub struct AuditResponse {
    pub report: Report,
    /// Resources dropped by exclusion patterns
    pub excluded_resources: usize,
}

impl AuditResponse {
    pub fn new(report: Report, excluded_resources: usize) -> Self {
        Self {
            report,
            excluded_resources,
        }
    }

    /// Whether the run should fail CI for the given `--fail-on` severity
    pub fn should_fail(&self, fail_on: Option<Severity>) -> bool {
        fail_on.is_some_and(|threshold| self.report.has_findings_at_or_above(threshold))
    }
}
