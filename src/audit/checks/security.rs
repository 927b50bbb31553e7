use super::{Check, CheckContext, CheckOutcome};
use crate::audit::domain::{AffectedResource, CheckId, Finding, ResourceRecord, Severity};
use crate::shared::Result;

const CLASSIFICATION_TAG: &str = "DataClassification";
const CONFIDENTIAL: &str = "confidential";

fn is_confidential(record: &ResourceRecord) -> bool {
    record
        .tag(CLASSIFICATION_TAG)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case(CONFIDENTIAL))
}

/// Confidential queue or topic without a KMS key
pub struct UnencryptedSensitiveResourceCheck;

impl Check for UnencryptedSensitiveResourceCheck {
    fn name(&self) -> &'static str {
        "unencrypted_sensitive_resource"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        let queues = ctx
            .queues()
            .filter(|(r, a)| is_confidential(r) && !a.has_kms_key())
            .map(|(r, _)| r);
        let topics = ctx
            .topics()
            .filter(|(r, a)| is_confidential(r) && !a.has_kms_key())
            .map(|(r, _)| r);
        let affected: Vec<AffectedResource> = queues
            .chain(topics)
            .map(|r| AffectedResource::from_record(r).with_detail("kms_master_key_id", "none"))
            .collect();

        if affected.is_empty() {
            return Ok(outcome);
        }

        let resource_type = {
            let mut kinds: Vec<&str> = affected.iter().map(|r| r.kind.label()).collect();
            kinds.dedup();
            kinds.join(", ")
        };
        let finding = Finding::builder(
            CheckId::UnencryptedSensitiveResource,
            Severity::Critical,
            ctx.evaluated_at,
        )
        .resource_type(resource_type)
        .action("Enable server-side encryption with a KMS key")
        .details(format!(
            "{} resource(s) tagged {}={} are not encrypted with KMS",
            affected.len(),
            CLASSIFICATION_TAG,
            CONFIDENTIAL
        ))
        .affected_resources(affected)
        .build();
        outcome.push(self.name(), None, finding);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::audit::domain::{MetricStore, ResourceKind};
    use crate::audit::policies::AuditPolicy;
    use crate::audit::services::CostEstimator;
    use serde_json::json;

    #[test]
    fn test_confidential_resources_without_kms_flagged() {
        let confidential = tags(&[("DataClassification", "Confidential")]);
        let resources = vec![
            queue_tagged("payments", json!({}), confidential.clone()),
            queue_tagged(
                "ledger",
                json!({"KmsMasterKeyId": "alias/aws/sqs"}),
                confidential.clone(),
            ),
            queue("public", json!({})),
            record(
                "arn:aws:sns:us-east-1:123456789012:alerts",
                ResourceKind::Topic,
                "active",
                confidential,
                json!({}),
            ),
        ];
        let metrics = MetricStore::empty();
        let policy = AuditPolicy::default();
        let costs = CostEstimator::new();

        let outcome = UnencryptedSensitiveResourceCheck
            .evaluate(&context(&resources, &metrics, &policy, &costs))
            .unwrap();

        assert_eq!(outcome.findings.len(), 1);
        let finding = &outcome.findings[0];
        assert_eq!(finding.severity(), Severity::Critical);
        let names: Vec<&str> = finding
            .affected_resources()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["payments", "alerts"]);
        assert_eq!(finding.resource_type(), "SQS Queue, SNS Topic");
    }
}
