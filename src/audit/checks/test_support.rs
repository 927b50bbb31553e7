//! Builders shared by the check unit tests.

use super::CheckContext;
use crate::audit::domain::{
    BlockDevice, InstanceAttributes, MetricSample, MetricStore, ResourceAttributes, ResourceKind,
    ResourceRecord, VolumeAttributes,
};
use crate::audit::policies::AuditPolicy;
use crate::audit::services::CostEstimator;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
}

pub fn full_tags() -> BTreeMap<String, String> {
    [
        ("CostCenter", "cc-42"),
        ("Environment", "prod"),
        ("Owner", "platform"),
        ("Application", "orders"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn instance(id: &str, instance_type: &str, state: &str) -> ResourceRecord {
    instance_with(id, instance_type, state, full_tags(), None, vec![])
}

pub fn instance_with(
    id: &str,
    instance_type: &str,
    state: &str,
    tags: BTreeMap<String, String>,
    cpu_credits: Option<&str>,
    block_device_mappings: Vec<BlockDevice>,
) -> ResourceRecord {
    ResourceRecord::new(
        id.to_string(),
        state.to_string(),
        tags,
        ResourceAttributes::Instance(InstanceAttributes {
            instance_type: instance_type.to_string(),
            cpu_credits: cpu_credits.map(str::to_string),
            block_device_mappings,
            launch_time: None,
        }),
    )
    .unwrap()
}

pub fn volume(id: &str, volume_type: &str, size_gb: u64) -> ResourceRecord {
    ResourceRecord::new(
        id.to_string(),
        "available".to_string(),
        BTreeMap::new(),
        ResourceAttributes::Volume(VolumeAttributes {
            volume_type: volume_type.to_string(),
            size_gb,
            attached_instance_id: None,
        }),
    )
    .unwrap()
}

pub fn queue_url(name: &str) -> String {
    format!("https://sqs.us-east-1.amazonaws.com/123456789012/{}", name)
}

pub fn queue_arn(name: &str) -> String {
    format!("arn:aws:sqs:us-east-1:123456789012:{}", name)
}

/// Queue record from raw SQS attribute JSON; `QueueArn` is filled in
pub fn queue(name: &str, attrs: serde_json::Value) -> ResourceRecord {
    queue_tagged(name, attrs, BTreeMap::new())
}

pub fn queue_tagged(
    name: &str,
    mut attrs: serde_json::Value,
    tags: BTreeMap<String, String>,
) -> ResourceRecord {
    if let Some(map) = attrs.as_object_mut() {
        map.entry("QueueArn")
            .or_insert_with(|| serde_json::Value::String(queue_arn(name)));
    }
    ResourceRecord::new(
        queue_url(name),
        "active".to_string(),
        tags,
        ResourceAttributes::from_json(ResourceKind::Queue, attrs).unwrap(),
    )
    .unwrap()
}

pub fn record(
    id: &str,
    kind: ResourceKind,
    state: &str,
    tags: BTreeMap<String, String>,
    attrs: serde_json::Value,
) -> ResourceRecord {
    ResourceRecord::new(
        id.to_string(),
        state.to_string(),
        tags,
        ResourceAttributes::from_json(kind, attrs).unwrap(),
    )
    .unwrap()
}

/// Hourly sample `hours_ago` hours before [`now`]
pub fn sample(
    resource_id: &str,
    metric: &str,
    statistic: &str,
    hours_ago: i64,
    value: Option<f64>,
) -> MetricSample {
    let end = now() - Duration::hours(hours_ago);
    MetricSample {
        resource_id: resource_id.to_string(),
        metric_name: metric.to_string(),
        statistic: statistic.to_string(),
        window_start: end - Duration::hours(1),
        window_end: end,
        period_seconds: 3600,
        value,
    }
}

pub fn cpu_sample(resource_id: &str, hours_ago: i64, value: Option<f64>) -> MetricSample {
    sample(resource_id, "CPUUtilization", "Average", hours_ago, value)
}

/// A flat series of `value` over the last day
pub fn series(resource_id: &str, metric: &str, statistic: &str, value: f64) -> Vec<MetricSample> {
    (0..24)
        .map(|h| sample(resource_id, metric, statistic, h, Some(value)))
        .collect()
}

pub fn store(samples: Vec<MetricSample>) -> MetricStore {
    MetricStore::new(samples, vec![])
}

pub fn context<'a>(
    resources: &'a [ResourceRecord],
    metrics: &'a MetricStore,
    policy: &'a AuditPolicy,
    costs: &'a CostEstimator,
) -> CheckContext<'a> {
    CheckContext {
        resources,
        metrics,
        policy,
        costs,
        evaluated_at: now(),
    }
}
