use super::{resource_type, Check, CheckContext, CheckOutcome};
use crate::audit::domain::{
    AffectedResource, CheckId, Finding, ResourceKind, ResourceRecord, Severity,
    SubscriptionAttributes,
};
use crate::shared::Result;

const PENDING_CONFIRMATION: &str = "PendingConfirmation";
const CONFIRMED: &str = "Confirmed";

fn is_pending(record: &ResourceRecord, attrs: &SubscriptionAttributes) -> bool {
    record.is_in_state(PENDING_CONFIRMATION)
        || attrs.subscription_arn.as_deref() == Some(PENDING_CONFIRMATION)
}

/// Deleted or otherwise inactive subscriptions are neither pending nor confirmed
fn is_confirmed(record: &ResourceRecord, attrs: &SubscriptionAttributes) -> bool {
    record.is_in_state(CONFIRMED) && !is_pending(record, attrs)
}

fn subscription_resource(
    record: &ResourceRecord,
    attrs: &SubscriptionAttributes,
) -> AffectedResource {
    let mut resource = AffectedResource::from_record(record)
        .with_detail("topic_arn", &attrs.topic_arn)
        .with_detail("protocol", &attrs.protocol);
    if let Some(endpoint) = &attrs.endpoint {
        resource = resource.with_detail("endpoint", endpoint);
    }
    resource
}

/// Subscription hygiene: unconfirmed subscriptions and unfiltered fan-out
pub struct SnsSubscriptionHygieneCheck;

impl Check for SnsSubscriptionHygieneCheck {
    fn name(&self) -> &'static str {
        "sns_subscription_hygiene"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        let unconfirmed: Vec<_> = ctx
            .subscriptions()
            .filter(|(r, a)| is_pending(r, a))
            .map(|(r, a)| subscription_resource(r, a))
            .collect();
        if !unconfirmed.is_empty() {
            let finding = Finding::builder(
                CheckId::SnsSubscriptionUnconfirmed,
                Severity::High,
                ctx.evaluated_at,
            )
            .resource_type(resource_type(ResourceKind::Subscription))
            .action("Confirm the subscription or remove it")
            .details(format!(
                "{} subscription(s) are pending confirmation and receive no messages",
                unconfirmed.len()
            ))
            .affected_resources(unconfirmed)
            .build();
            outcome.push(self.name(), None, finding);
        }

        let unfiltered: Vec<_> = ctx
            .subscriptions()
            .filter(|(r, a)| is_confirmed(r, a) && !a.has_filter_policy())
            .map(|(r, a)| subscription_resource(r, a))
            .collect();
        if !unfiltered.is_empty() {
            let finding = Finding::builder(
                CheckId::SnsSubscriptionMissingFilter,
                Severity::Low,
                ctx.evaluated_at,
            )
            .resource_type(resource_type(ResourceKind::Subscription))
            .action("Add a filter policy so subscribers only receive relevant messages")
            .details(format!(
                "{} confirmed subscription(s) have no filter policy",
                unfiltered.len()
            ))
            .affected_resources(unfiltered)
            .build();
            outcome.push(self.name(), None, finding);
        }

        Ok(outcome)
    }
}
