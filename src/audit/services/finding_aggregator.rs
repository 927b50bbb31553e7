use crate::audit::domain::{AffectedResource, CheckId, Finding, Report, SkippedEvaluation};
use chrono::{DateTime, Utc};

/// Affected resources listed per finding in console output
pub const CONSOLE_RESOURCE_LIMIT: usize = 10;

/// Everything the aggregator folds into a report
#[derive(Debug)]
pub struct AggregationInput {
    pub scope: String,
    pub generated_at: DateTime<Utc>,
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedEvaluation>,
    pub resources_evaluated: usize,
}

/// FindingAggregator - Folds check output into an immutable [`Report`]
///
/// The report computes its own savings total and severity counts from the
/// findings; the aggregator adds domain counters such as messages at risk.
pub struct FindingAggregator;

impl FindingAggregator {
    pub fn aggregate(input: AggregationInput) -> Report {
        let messages_at_risk = Self::messages_at_risk(&input.findings);

        Report::new(
            input.scope,
            input.generated_at,
            input.findings,
            messages_at_risk,
            input.resources_evaluated,
            input.skipped,
        )
    }

    /// Messages sitting in dead-letter queues across all accumulation findings
    pub fn messages_at_risk(findings: &[Finding]) -> u64 {
        findings
            .iter()
            .filter(|f| f.check_id() == CheckId::DlqMessageAccumulation)
            .flat_map(|f| f.affected_resources())
            .filter_map(|r| r.message_count)
            .fold(0, u64::saturating_add)
    }
}

/// First `limit` resources plus the number left out
pub fn truncate_for_console(
    resources: &[AffectedResource],
    limit: usize,
) -> (&[AffectedResource], usize) {
    let shown = resources.len().min(limit);
    (&resources[..shown], resources.len() - shown)
}
