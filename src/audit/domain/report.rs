use super::evaluation::SkippedEvaluation;
use super::finding::{Category, Finding, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Number of affected resources per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            *counts.slot_mut(finding.severity()) += finding.affected_resources().len();
        }
        counts
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    fn slot_mut(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }
}

/// Findings sharing a category, in insertion order
#[derive(Debug, Clone)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub findings: Vec<&'a Finding>,
}

impl CategoryGroup<'_> {
    pub fn resource_count(&self) -> usize {
        self.findings
            .iter()
            .map(|f| f.affected_resources().len())
            .sum()
    }

    pub fn potential_savings(&self) -> f64 {
        self.findings
            .iter()
            .fold(0.0, |acc, f| acc + f.potential_savings())
    }
}

/// Immutable result of one audit run
///
/// Built once by the aggregator. Renderers only read it.
#[derive(Debug, Clone)]
pub struct Report {
    report_id: Uuid,
    scope: String,
    generated_at: DateTime<Utc>,
    findings: Vec<Finding>,
    total_potential_savings: f64,
    severity_counts: SeverityCounts,
    messages_at_risk: u64,
    resources_evaluated: usize,
    skipped_evaluations: Vec<SkippedEvaluation>,
}

impl Report {
    pub(crate) fn new(
        scope: String,
        generated_at: DateTime<Utc>,
        findings: Vec<Finding>,
        messages_at_risk: u64,
        resources_evaluated: usize,
        skipped_evaluations: Vec<SkippedEvaluation>,
    ) -> Self {
        let total_potential_savings = sum_savings(&findings);
        let severity_counts = SeverityCounts::from_findings(&findings);
        Self {
            report_id: Uuid::new_v4(),
            scope,
            generated_at,
            findings,
            total_potential_savings,
            severity_counts,
            messages_at_risk,
            resources_evaluated,
            skipped_evaluations,
        }
    }

    pub fn report_id(&self) -> Uuid {
        self.report_id
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn total_potential_savings(&self) -> f64 {
        self.total_potential_savings
    }

    pub fn severity_counts(&self) -> &SeverityCounts {
        &self.severity_counts
    }

    pub fn messages_at_risk(&self) -> u64 {
        self.messages_at_risk
    }

    pub fn resources_evaluated(&self) -> usize {
        self.resources_evaluated
    }

    pub fn skipped_evaluations(&self) -> &[SkippedEvaluation] {
        &self.skipped_evaluations
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Recomputes the savings total from the findings
    pub fn recompute_total_savings(&self) -> f64 {
        sum_savings(&self.findings)
    }

    /// Findings grouped by category, categories in first-seen order
    pub fn by_category(&self) -> Vec<CategoryGroup<'_>> {
        let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
        for finding in &self.findings {
            match groups.iter_mut().find(|g| g.category == finding.category()) {
                Some(group) => group.findings.push(finding),
                None => groups.push(CategoryGroup {
                    category: finding.category(),
                    findings: vec![finding],
                }),
            }
        }
        groups
    }

    /// Findings ordered critical first; ties keep their original order
    pub fn sorted_by_severity(&self) -> Vec<&Finding> {
        let mut sorted: Vec<&Finding> = self.findings.iter().collect();
        sorted.sort_by_key(|f| f.severity().rank());
        sorted
    }

    pub fn has_findings_at_or_above(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity().meets(threshold))
    }
}

// Folded from +0.0: an empty f64 `Sum` yields -0.0
fn sum_savings(findings: &[Finding]) -> f64 {
    findings
        .iter()
        .fold(0.0, |acc, f| acc + f.potential_savings())
}
