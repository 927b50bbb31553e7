use super::{resource_type, Check, CheckContext, CheckOutcome};
use crate::audit::domain::{AffectedResource, CheckId, Finding, ResourceKind, Severity};
use crate::shared::Result;

/// Share of the gp2 price saved by moving to gp3
pub const GP3_SAVINGS_RATIO: f64 = 0.20;

/// gp2 volume that could be migrated to gp3
pub struct InefficientStorageCheck;

impl Check for InefficientStorageCheck {
    fn name(&self) -> &'static str {
        "inefficient_storage"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        for (record, attrs) in ctx
            .volumes()
            .filter(|(_, a)| a.volume_type.eq_ignore_ascii_case("gp2"))
        {
            let monthly = ctx.costs.storage_monthly_cost(attrs.size_gb);
            let finding = Finding::builder(
                CheckId::InefficientStorage,
                Severity::Medium,
                ctx.evaluated_at,
            )
            .resource_type(resource_type(ResourceKind::Volume))
            .action("Migrate volume from gp2 to gp3")
            .affected(
                AffectedResource::from_record(record)
                    .with_detail("volume_type", &attrs.volume_type)
                    .with_detail("size_gb", attrs.size_gb),
            )
            .details(format!(
                "{} is a {} GB gp2 volume; gp3 costs less for the same baseline",
                record.id(),
                attrs.size_gb
            ))
            .potential_savings(monthly * GP3_SAVINGS_RATIO)
            .build();
            outcome.push(self.name(), Some(record.id()), finding);
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::audit::domain::MetricStore;
    use crate::audit::policies::AuditPolicy;
    use crate::audit::services::CostEstimator;

    #[test]
    fn test_gp2_volume_flagged_with_savings() {
        let resources = vec![volume("vol-gp2", "gp2", 500), volume("vol-gp3", "gp3", 500)];
        let metrics = MetricStore::empty();
        let policy = AuditPolicy::default();
        let costs = CostEstimator::new();

        let outcome = InefficientStorageCheck
            .evaluate(&context(&resources, &metrics, &policy, &costs))
            .unwrap();

        assert_eq!(outcome.findings.len(), 1);
        let finding = &outcome.findings[0];
        assert_eq!(finding.affected_resources()[0].resource_id, "vol-gp2");
        assert!((finding.potential_savings() - 500.0 * 0.10 * 0.20).abs() < 1e-9);
        assert_eq!(finding.resource_type(), "EBS Volume");
    }
}
