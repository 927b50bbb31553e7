//! SQS resilience and configuration checks.
//!
//! Each check emits at most one finding listing every affected queue.

use super::{resource_type, Check, CheckContext, CheckOutcome};
use crate::audit::domain::{
    AffectedResource, CheckId, Finding, QueueAttributes, ResourceKind, ResourceRecord, Severity,
};
use crate::shared::Result;
use chrono::Duration;

/// SQS default retention when the attribute was not captured (4 days)
pub const DEFAULT_MESSAGE_RETENTION_SECS: u64 = 345_600;

/// Whether the queue name marks it as a dead-letter queue
pub fn is_dlq_name(name: &str) -> bool {
    let name = name.to_lowercase();
    ["dlq", "dead-letter", "deadletter"]
        .iter()
        .any(|marker| name.contains(marker))
}

fn is_dlq(record: &ResourceRecord) -> bool {
    is_dlq_name(record.display_name())
}

fn queue_resource(record: &ResourceRecord) -> AffectedResource {
    AffectedResource::from_record(record)
}

/// The single grouped finding for a check, if anything was affected
fn grouped(
    ctx: &CheckContext<'_>,
    check_id: CheckId,
    severity: Severity,
    affected: Vec<AffectedResource>,
    action: &str,
    details: String,
) -> Option<Result<Finding>> {
    if affected.is_empty() {
        return None;
    }
    Some(
        Finding::builder(check_id, severity, ctx.evaluated_at)
            .resource_type(resource_type(ResourceKind::Queue))
            .action(action)
            .affected_resources(affected)
            .details(details)
            .build(),
    )
}

/// Source queue without a redrive policy
pub struct MissingDlqCheck;

impl Check for MissingDlqCheck {
    fn name(&self) -> &'static str {
        "missing_dlq"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let affected: Vec<_> = ctx
            .queues()
            .filter(|(r, a)| !is_dlq(r) && a.redrive_policy.is_none())
            .map(|(r, _)| queue_resource(r))
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::MissingDlq,
            Severity::High,
            affected,
            "Configure a dead-letter queue with a redrive policy",
            format!(
                "{} queue(s) have no dead-letter queue; failed messages are lost after retries",
                count
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Dead-letter queue holding messages that nobody has handled
pub struct DlqMessageAccumulationCheck;

impl Check for DlqMessageAccumulationCheck {
    fn name(&self) -> &'static str {
        "dlq_message_accumulation"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let affected: Vec<_> = ctx
            .queues()
            .filter(|(r, a)| is_dlq(r) && a.visible_messages() > 0)
            .map(|(r, a)| queue_resource(r).with_message_count(a.visible_messages()))
            .collect();

        let total = affected
            .iter()
            .filter_map(|r| r.message_count)
            .fold(0u64, u64::saturating_add);
        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::DlqMessageAccumulation,
            Severity::High,
            affected,
            "Investigate and redrive or purge dead-lettered messages",
            format!(
                "{} message(s) waiting in {} dead-letter queue(s)",
                total, count
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Dead-letter queue close to the assumed capacity
pub struct HighDlqDepthCheck;

impl Check for HighDlqDepthCheck {
    fn name(&self) -> &'static str {
        "high_dlq_depth"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let thresholds = &ctx.policy.thresholds;
        let affected: Vec<_> = ctx
            .queues()
            .filter(|(r, a)| is_dlq(r) && thresholds.is_dlq_near_capacity(a.visible_messages()))
            .map(|(r, a)| queue_resource(r).with_message_count(a.visible_messages()))
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::HighDlqDepth,
            Severity::Critical,
            affected,
            "Drain the dead-letter queue and fix the failing consumer",
            format!(
                "{} dead-letter queue(s) at or above {:.0}% of {} messages",
                count,
                thresholds.dlq_depth_ratio * 100.0,
                thresholds.dlq_capacity
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Redrive policy that retries a message too many times
pub struct ExcessiveRetryCheck;

impl Check for ExcessiveRetryCheck {
    fn name(&self) -> &'static str {
        "excessive_retry"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let limit = ctx.policy.thresholds.max_receive_count;
        let affected: Vec<_> = ctx
            .queues()
            .filter_map(|(r, a)| {
                let policy = a.redrive_policy.as_ref()?;
                (policy.max_receive_count > limit).then(|| {
                    queue_resource(r).with_detail("max_receive_count", policy.max_receive_count)
                })
            })
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::ExcessiveRetry,
            Severity::Medium,
            affected,
            "Lower maxReceiveCount so poison messages reach the DLQ sooner",
            format!(
                "{} queue(s) retry messages more than {} times",
                count, limit
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Visibility timeout outside the sensible range
///
/// Too-short and too-long timeouts are reported as separate findings.
pub struct VisibilityTimeoutCheck;

impl Check for VisibilityTimeoutCheck {
    fn name(&self) -> &'static str {
        "visibility_timeout"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let thresholds = &ctx.policy.thresholds;

        let with_timeout = |pred: &dyn Fn(u64) -> bool| -> Vec<AffectedResource> {
            ctx.queues()
                .filter_map(|(r, a)| {
                    let timeout = a.visibility_timeout?;
                    pred(timeout)
                        .then(|| queue_resource(r).with_detail("visibility_timeout", timeout))
                })
                .collect()
        };

        let too_short = with_timeout(&|t: u64| t < thresholds.min_visibility_timeout_secs);
        let count = too_short.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::VisibilityTimeoutTooShort,
            Severity::Medium,
            too_short,
            "Raise the visibility timeout above the consumer processing time",
            format!(
                "{} queue(s) have a visibility timeout under {}s; messages may be processed twice",
                count, thresholds.min_visibility_timeout_secs
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }

        let too_long = with_timeout(&|t: u64| t > thresholds.max_visibility_timeout_secs);
        let count = too_long.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::VisibilityTimeoutTooLong,
            Severity::Medium,
            too_long,
            "Lower the visibility timeout so failed messages are retried promptly",
            format!(
                "{} queue(s) have a visibility timeout over {}s",
                count, thresholds.max_visibility_timeout_secs
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }

        Ok(outcome)
    }
}

fn retention(attrs: &QueueAttributes) -> u64 {
    attrs
        .message_retention_period
        .unwrap_or(DEFAULT_MESSAGE_RETENTION_SECS)
}

/// Dead-letter queue that expires messages no later than its source queue
pub struct DlqRetentionGapCheck;

impl Check for DlqRetentionGapCheck {
    fn name(&self) -> &'static str {
        "dlq_retention_gap"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let mut affected = Vec::new();

        for (record, attrs) in ctx.queues() {
            let Some(policy) = attrs.redrive_policy.as_ref() else {
                continue;
            };
            let Some((_, dlq)) = ctx.find_queue_by_arn(&policy.dead_letter_target_arn) else {
                tracing::debug!(
                    queue = record.id(),
                    target = %policy.dead_letter_target_arn,
                    "redrive target not in snapshot"
                );
                continue;
            };

            let source_retention = retention(attrs);
            let dlq_retention = retention(dlq);
            if dlq_retention <= source_retention {
                affected.push(
                    queue_resource(record)
                        .with_detail("source_retention_secs", source_retention)
                        .with_detail("dlq_retention_secs", dlq_retention)
                        .with_detail("dlq", &policy.dead_letter_target_arn),
                );
            }
        }

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::DlqRetentionGap,
            Severity::High,
            affected,
            "Set the DLQ retention longer than the source queue retention",
            format!(
                "{} queue(s) redrive into a DLQ that does not outlive the source retention",
                count
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Queue consumers using short polling
pub struct ShortPollingCheck;

impl Check for ShortPollingCheck {
    fn name(&self) -> &'static str {
        "short_polling"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let affected: Vec<_> = ctx
            .queues()
            .filter(|(_, a)| a.receive_message_wait_time_seconds == Some(0))
            .map(|(r, _)| queue_resource(r))
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::ShortPolling,
            Severity::Low,
            affected,
            "Set ReceiveMessageWaitTimeSeconds to enable long polling",
            format!(
                "{} queue(s) use short polling, inflating empty receives",
                count
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// Empty queue untouched for a long time
pub struct StaleQueueCheck;

impl Check for StaleQueueCheck {
    fn name(&self) -> &'static str {
        "stale_queue"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let days = ctx.policy.thresholds.stale_queue_days;
        let cutoff = ctx.evaluated_at - Duration::days(i64::from(days));

        let affected: Vec<_> = ctx
            .queues()
            .filter_map(|(r, a)| {
                let modified = a.last_modified()?;
                (a.total_messages() == 0 && modified < cutoff).then(|| {
                    queue_resource(r).with_detail("last_modified", modified.to_rfc3339())
                })
            })
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::StaleQueue,
            Severity::Low,
            affected,
            "Delete the queue if it is no longer used",
            format!(
                "{} empty queue(s) not modified in over {} days",
                count, days
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}

/// FIFO queue relying on explicit deduplication ids
pub struct FifoDedupDisabledCheck;

impl Check for FifoDedupDisabledCheck {
    fn name(&self) -> &'static str {
        "fifo_dedup_disabled"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let affected: Vec<_> = ctx
            .queues()
            .filter(|(r, a)| {
                r.display_name().ends_with(".fifo") && a.content_based_deduplication != Some(true)
            })
            .map(|(r, _)| queue_resource(r))
            .collect();

        let count = affected.len();
        if let Some(finding) = grouped(
            ctx,
            CheckId::FifoDedupDisabled,
            Severity::Medium,
            affected,
            "Enable ContentBasedDeduplication or send a MessageDeduplicationId",
            format!(
                "{} FIFO queue(s) have content-based deduplication disabled",
                count
            ),
        ) {
            outcome.push(self.name(), None, finding);
        }
        Ok(outcome)
    }
}
