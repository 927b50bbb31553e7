use crate::application::dto::{AuditRequest, AuditResponse};
use crate::audit::checks::{CheckContext, RuleCatalog};
use crate::audit::domain::{ResourceKind, ResourceRecord, SkippedEvaluation, Snapshot};
use crate::audit::services::{
    AggregationInput, CheckExecutor, CostEstimator, FindingAggregator, ResourceFilter,
};
use crate::ports::outbound::{InventoryCollector, ProgressReporter};
use crate::shared::error::AuditError;
use crate::shared::Result;
use chrono::Utc;

/// RunAuditUseCase - Core use case for an audit run
///
/// Orchestrates one run end to end: collect the inventory, filter it,
/// evaluate the rule catalog and fold the results into a report.
///
/// # Type Parameters
/// * `IC` - InventoryCollector implementation
/// * `PR` - ProgressReporter implementation
pub struct RunAuditUseCase<IC, PR> {
    inventory_collector: IC,
    progress_reporter: PR,
}

impl<IC, PR> RunAuditUseCase<IC, PR>
where
    IC: InventoryCollector,
    PR: ProgressReporter,
{
    /// Creates a new RunAuditUseCase with injected dependencies
    pub fn new(inventory_collector: IC, progress_reporter: PR) -> Self {
        Self {
            inventory_collector,
            progress_reporter,
        }
    }

    /// Executes the audit
    ///
    /// # Errors
    /// Returns an error if:
    /// - The request names an unknown check or an invalid exclusion pattern
    /// - Inventory collection fails
    pub async fn execute(&self, request: AuditRequest) -> Result<AuditResponse> {
        // Step 1: Validate configuration before touching the inventory
        request.policy.validate()?;
        let catalog = RuleCatalog::standard().without(&request.disabled_checks)?;
        let filter = ResourceFilter::new(request.exclude_patterns.clone())?;

        // Step 2: Collect inventory (fatal on failure)
        let snapshot = self.collect_inventory(&request.scope).await?;
        let evaluated_at = snapshot.evaluation_instant();
        let Snapshot {
            resources, metrics, ..
        } = snapshot;

        // Step 3: Apply exclusion filters
        let original_count = resources.len();
        let resources = self.apply_exclusion_filters(&filter, resources);
        let excluded = original_count - resources.len();

        if resources.is_empty() {
            self.progress_reporter
                .report("ℹ️  No resources to audit; reports will be empty.");
        }

        // Step 4: Evaluate the catalog
        self.progress_reporter.report(&format!(
            "🔎 Running {} check(s) against {} resource(s)...",
            catalog.len(),
            resources.len()
        ));
        let costs = CostEstimator::new();
        let ctx = CheckContext {
            resources: &resources,
            metrics: &metrics,
            policy: &request.policy,
            costs: &costs,
            evaluated_at,
        };
        let execution = CheckExecutor::run_with_progress(&catalog, &ctx, |done, total, name| {
            self.progress_reporter
                .report_progress(done, total, Some(name));
        });

        // Step 5: Surface locally recovered failures
        self.report_skipped(&execution.skipped);

        // Step 6: Aggregate
        let report = FindingAggregator::aggregate(AggregationInput {
            scope: request.scope,
            generated_at: Utc::now(),
            findings: execution.findings,
            skipped: execution.skipped,
            resources_evaluated: resources.len(),
        });

        self.progress_reporter.report_completion(&format!(
            "Audit complete: {} finding(s), ${:.2} potential monthly savings",
            report.findings().len(),
            report.total_potential_savings()
        ));

        Ok(AuditResponse::new(report, excluded))
    }

    async fn collect_inventory(&self, scope: &str) -> Result<Snapshot> {
        self.progress_reporter
            .report(&format!("📦 Collecting inventory for scope: {}", scope));

        let snapshot = self
            .inventory_collector
            .collect(scope)
            .await
            .map_err(|e| {
                // Keep typed errors (and their hints) intact
                if e.downcast_ref::<AuditError>().is_some() {
                    e
                } else {
                    AuditError::InventoryCollection {
                        scope: scope.to_string(),
                        details: format!("{:#}", e),
                    }
                    .into()
                }
            })?;

        self.progress_reporter.report(&format!(
            "✅ Collected {} resource(s) and {} metric sample(s)",
            snapshot.resources.len(),
            snapshot.metrics.sample_count()
        ));
        tracing::debug!(
            scope,
            instances = snapshot.count_of(ResourceKind::Instance),
            volumes = snapshot.count_of(ResourceKind::Volume),
            queues = snapshot.count_of(ResourceKind::Queue),
            topics = snapshot.count_of(ResourceKind::Topic),
            subscriptions = snapshot.count_of(ResourceKind::Subscription),
            samples = snapshot.metrics.sample_count(),
            "inventory collected"
        );

        Ok(snapshot)
    }

    fn apply_exclusion_filters(
        &self,
        filter: &ResourceFilter,
        resources: Vec<ResourceRecord>,
    ) -> Vec<ResourceRecord> {
        if filter.is_empty() {
            return resources;
        }

        let original_count = resources.len();
        let filtered = filter.filter_resources(resources);

        let excluded_count = original_count - filtered.len();
        if excluded_count > 0 {
            self.progress_reporter.report(&format!(
                "🚫 Excluded {} resource(s) based on filters",
                excluded_count
            ));
        }

        for pattern in filter.unmatched_patterns() {
            self.progress_reporter.report_error(&format!(
                "⚠️  Warning: Exclude pattern '{}' did not match any resources.",
                pattern
            ));
        }

        filtered
    }

    fn report_skipped(&self, skipped: &[SkippedEvaluation]) {
        let mut no_data = 0;
        for entry in skipped {
            if entry.reason.is_failure() {
                tracing::warn!(
                    check = %entry.check,
                    resource = ?entry.resource_id,
                    "{}",
                    entry.reason
                );
                self.progress_reporter
                    .report_error(&format!("⚠️  Warning: {}", entry));
            } else {
                tracing::info!(
                    check = %entry.check,
                    resource = ?entry.resource_id,
                    "{}",
                    entry.reason
                );
                no_data += 1;
            }
        }

        if no_data > 0 {
            self.progress_reporter.report(&format!(
                "ℹ️  {} evaluation(s) skipped for missing metric data",
                no_data
            ));
        }
    }
}
