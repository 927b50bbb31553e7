//! Rule catalog: independent checks evaluated over one snapshot.
//!
//! Every check reads the snapshot through a [`CheckContext`] and returns a
//! [`CheckOutcome`]. Per-resource problems (missing metrics, failed
//! lookups) become [`SkippedEvaluation`] values in the outcome; a check
//! only returns `Err` when it cannot run at all.

pub mod compute;
pub mod notifications;
pub mod queues;
pub mod security;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;

use crate::audit::domain::{
    Finding, InstanceAttributes, MetricQuery, QueueAttributes, ResourceKind, ResourceRecord,
    SkippedEvaluation, SubscriptionAttributes, TopicAttributes, VolumeAttributes,
};
use crate::audit::policies::AuditPolicy;
use crate::audit::services::CostEstimator;
use crate::ports::outbound::MetricsProvider;
use crate::shared::error::AuditError;
use crate::shared::Result;
use chrono::{DateTime, Duration, Utc};

/// Aggregation period for metric lookups
pub const METRIC_PERIOD_SECONDS: u32 = 3600;

/// A single rule in the catalog
pub trait Check {
    /// Stable name, usable in `disabled_checks`
    fn name(&self) -> &'static str;

    /// Evaluates the rule over every resource in the context
    ///
    /// # Errors
    /// Returns an error only when the whole check cannot run.
    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome>;
}

/// Read-only view of one run's inputs
pub struct CheckContext<'a> {
    pub resources: &'a [ResourceRecord],
    pub metrics: &'a dyn MetricsProvider,
    pub policy: &'a AuditPolicy,
    pub costs: &'a CostEstimator,
    /// End of every metric window, and the reference for age-based rules
    pub evaluated_at: DateTime<Utc>,
}

/// Result of averaging one metric series
#[derive(Debug, Clone, PartialEq)]
pub enum MetricReading {
    Value(f64),
    /// Empty series, or every datapoint was empty
    NoData,
    Failed(String),
}

impl<'a> CheckContext<'a> {
    pub fn instances(&self) -> impl Iterator<Item = (&'a ResourceRecord, &'a InstanceAttributes)> {
        self.resources
            .iter()
            .filter_map(|r| r.as_instance().map(|attrs| (r, attrs)))
    }

    pub fn volumes(&self) -> impl Iterator<Item = (&'a ResourceRecord, &'a VolumeAttributes)> {
        self.resources
            .iter()
            .filter_map(|r| r.as_volume().map(|attrs| (r, attrs)))
    }

    pub fn queues(&self) -> impl Iterator<Item = (&'a ResourceRecord, &'a QueueAttributes)> {
        self.resources
            .iter()
            .filter_map(|r| r.as_queue().map(|attrs| (r, attrs)))
    }

    pub fn topics(&self) -> impl Iterator<Item = (&'a ResourceRecord, &'a TopicAttributes)> {
        self.resources
            .iter()
            .filter_map(|r| r.as_topic().map(|attrs| (r, attrs)))
    }

    pub fn subscriptions(
        &self,
    ) -> impl Iterator<Item = (&'a ResourceRecord, &'a SubscriptionAttributes)> {
        self.resources
            .iter()
            .filter_map(|r| r.as_subscription().map(|attrs| (r, attrs)))
    }

    pub fn find_queue_by_arn(
        &self,
        arn: &str,
    ) -> Option<(&'a ResourceRecord, &'a QueueAttributes)> {
        self.queues()
            .find(|(record, attrs)| attrs.queue_arn.as_deref() == Some(arn) || record.id() == arn)
    }

    pub fn find_volume(&self, volume_id: &str) -> Option<&'a VolumeAttributes> {
        self.volumes()
            .find(|(record, _)| record.id() == volume_id)
            .map(|(_, attrs)| attrs)
    }

    /// Start of the lookback window
    pub fn window_start(&self) -> DateTime<Utc> {
        self.evaluated_at - Duration::days(i64::from(self.policy.thresholds.lookback_days))
    }

    /// Mean of the non-empty datapoints over the lookback window
    pub fn average_metric(
        &self,
        resource_id: &str,
        metric_name: &str,
        statistic: &str,
    ) -> MetricReading {
        let query = MetricQuery::new(
            resource_id,
            metric_name,
            statistic,
            self.window_start(),
            self.evaluated_at,
            METRIC_PERIOD_SECONDS,
        );

        let samples = match self.metrics.fetch_metric(&query) {
            Ok(samples) => samples,
            Err(e) => return MetricReading::Failed(e.to_string()),
        };

        let values: Vec<f64> = samples.iter().filter_map(|s| s.value).collect();
        if values.is_empty() {
            return MetricReading::NoData;
        }
        MetricReading::Value(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Findings and skipped evaluations produced by one check
#[derive(Debug, Default)]
pub struct CheckOutcome {
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedEvaluation>,
}

impl CheckOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a built finding, or a skip if building it failed
    pub fn push(&mut self, check: &str, resource_id: Option<&str>, finding: Result<Finding>) {
        match finding {
            Ok(finding) => self.findings.push(finding),
            Err(e) => self
                .skipped
                .push(SkippedEvaluation::failed(check, resource_id, e.to_string())),
        }
    }

    /// Records why a metric reading could not be used
    ///
    /// Returns the value when the reading has one.
    pub fn take_value(
        &mut self,
        check: &str,
        resource_id: &str,
        metric_name: &str,
        reading: MetricReading,
    ) -> Option<f64> {
        match reading {
            MetricReading::Value(v) => Some(v),
            MetricReading::NoData => {
                self.skipped
                    .push(SkippedEvaluation::no_data(check, resource_id, metric_name));
                None
            }
            MetricReading::Failed(message) => {
                self.skipped
                    .push(SkippedEvaluation::failed(check, Some(resource_id), message));
                None
            }
        }
    }
}

/// Whether the resource should be evaluated at all
pub(crate) fn is_live(record: &ResourceRecord) -> bool {
    !record.is_in_state("terminated") && !record.is_in_state("shutting-down")
}

/// Resource type column for a finding over one resource kind
pub(crate) fn resource_type(kind: ResourceKind) -> &'static str {
    kind.label()
}

/// Ordered, fixed set of checks
pub struct RuleCatalog {
    checks: Vec<Box<dyn Check>>,
}

impl RuleCatalog {
    /// The full catalog in evaluation order
    pub fn standard() -> Self {
        let checks: Vec<Box<dyn Check>> = vec![
            Box::new(compute::ZombieInstanceCheck),
            Box::new(compute::OversizedMemoryCheck),
            Box::new(compute::OldGenerationCheck),
            Box::new(compute::StoppedWithEbsCheck),
            Box::new(compute::MissingRiCoverageCheck),
            Box::new(compute::UntaggedInstanceCheck),
            Box::new(storage::InefficientStorageCheck),
            Box::new(compute::BurstableCreditAbuseCheck),
            Box::new(queues::MissingDlqCheck),
            Box::new(queues::DlqMessageAccumulationCheck),
            Box::new(queues::HighDlqDepthCheck),
            Box::new(queues::ExcessiveRetryCheck),
            Box::new(queues::VisibilityTimeoutCheck),
            Box::new(queues::DlqRetentionGapCheck),
            Box::new(queues::ShortPollingCheck),
            Box::new(queues::StaleQueueCheck),
            Box::new(security::UnencryptedSensitiveResourceCheck),
            Box::new(queues::FifoDedupDisabledCheck),
            Box::new(notifications::SnsSubscriptionHygieneCheck),
        ];
        Self { checks }
    }

    /// Catalog of custom checks, evaluated in the given order
    pub fn from_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Names of every check in the standard catalog
    pub fn standard_names() -> Vec<&'static str> {
        Self::standard().names()
    }

    /// Removes the named checks
    ///
    /// # Errors
    /// Returns a validation error if a name is not in the catalog
    pub fn without(mut self, disabled: &[String]) -> Result<Self> {
        let known = self.names();
        if let Some(unknown) = disabled.iter().find(|name| !known.contains(&name.as_str())) {
            return Err(AuditError::Validation {
                message: format!(
                    "Unknown check '{}' in disabled_checks. Available checks: {}",
                    unknown,
                    known.join(", ")
                ),
            }
            .into());
        }

        self.checks
            .retain(|check| !disabled.iter().any(|name| name == check.name()));
        Ok(self)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::audit::domain::MetricFailure;

    #[test]
    fn test_standard_catalog_order() {
        let names = RuleCatalog::standard_names();
        assert_eq!(names.len(), 19);
        assert_eq!(names[0], "zombie_instance");
        assert_eq!(names[5], "untagged_instance");
        assert_eq!(names[8], "missing_dlq");
        assert_eq!(names[18], "sns_subscription_hygiene");
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names = RuleCatalog::standard_names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), RuleCatalog::standard().len());
    }

    #[test]
    fn test_without_removes_checks() {
        let catalog = RuleCatalog::standard()
            .without(&["short_polling".to_string(), "stale_queue".to_string()])
            .unwrap();
        assert_eq!(catalog.len(), 17);
        assert!(!catalog.names().contains(&"short_polling"));
    }

    #[test]
    fn test_without_rejects_unknown_name() {
        let result = RuleCatalog::standard().without(&["no_such_check".to_string()]);
        let err = result.err().unwrap().to_string();
        assert!(err.contains("Unknown check 'no_such_check'"));
    }

    #[test]
    fn test_average_metric_ignores_empty_datapoints() {
        let store = store(vec![
            cpu_sample("i-1", 1, Some(2.0)),
            cpu_sample("i-1", 2, None),
            cpu_sample("i-1", 3, Some(4.0)),
        ]);
        let resources = vec![];
        let policy = AuditPolicy::default();
        let costs = CostEstimator::new();
        let ctx = context(&resources, &store, &policy, &costs);
        assert_eq!(
            ctx.average_metric("i-1", "CPUUtilization", "Average"),
            MetricReading::Value(3.0)
        );
    }

    #[test]
    fn test_average_metric_no_data_and_failure() {
        let store = crate::audit::domain::MetricStore::new(
            vec![cpu_sample("i-1", 1, None)],
            vec![MetricFailure {
                resource_id: "i-2".to_string(),
                metric_name: "CPUUtilization".to_string(),
                message: "AccessDenied".to_string(),
            }],
        );
        let resources = vec![];
        let policy = AuditPolicy::default();
        let costs = CostEstimator::new();
        let ctx = context(&resources, &store, &policy, &costs);

        assert_eq!(
            ctx.average_metric("i-1", "CPUUtilization", "Average"),
            MetricReading::NoData
        );
        assert!(matches!(
            ctx.average_metric("i-2", "CPUUtilization", "Average"),
            MetricReading::Failed(msg) if msg.contains("AccessDenied")
        ));
    }

    #[test]
    fn test_outcome_records_build_failure_as_skip() {
        let mut outcome = CheckOutcome::new();
        outcome.push(
            "zombie_instance",
            Some("i-1"),
            Err(anyhow::anyhow!("bad savings")),
        );
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.is_failure());
    }
}
