//! EC2 cost and governance checks.

use super::{is_live, resource_type, Check, CheckContext, CheckOutcome};
use crate::audit::domain::{
    AffectedResource, CheckId, Finding, InstanceAttributes, ResourceKind, ResourceRecord, Severity,
};
use crate::shared::Result;
use std::collections::BTreeMap;

pub const ZOMBIE_SAVINGS_RATIO: f64 = 0.95;
pub const OVERSIZED_MEMORY_SAVINGS_RATIO: f64 = 0.50;
pub const OLD_GENERATION_SAVINGS_RATIO: f64 = 0.20;
pub const RI_SAVINGS_RATIO: f64 = 0.30;
pub const BURSTABLE_SAVINGS_RATIO: f64 = 0.40;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Memory-optimized family prefixes; variants such as `r5d` or `x2gd` match
const MEMORY_OPTIMIZED_PREFIXES: [&str; 3] = ["r5", "r6i", "x2"];

const METRIC_CPU: &str = "CPUUtilization";
const METRIC_NETWORK_IN: &str = "NetworkIn";
const METRIC_NETWORK_OUT: &str = "NetworkOut";
const METRIC_MEMORY: &str = "mem_used_percent";
const METRIC_CPU_SURPLUS: &str = "CPUSurplusCreditBalance";

fn is_running(record: &ResourceRecord) -> bool {
    record.is_in_state("running")
}

fn is_memory_optimized(attrs: &InstanceAttributes) -> bool {
    let family = attrs.family();
    MEMORY_OPTIMIZED_PREFIXES
        .iter()
        .any(|prefix| family.starts_with(prefix))
}

fn is_burstable(attrs: &InstanceAttributes) -> bool {
    matches!(attrs.family(), "t2" | "t3")
}

/// Current-generation replacement for a previous-generation family
pub fn modern_family(family: &str) -> Option<&'static str> {
    match family {
        "t2" => Some("t3"),
        "m4" => Some("m5"),
        "c4" => Some("c5"),
        "r4" => Some("r5"),
        _ => None,
    }
}

fn instance_resource(record: &ResourceRecord, attrs: &InstanceAttributes) -> AffectedResource {
    AffectedResource::from_record(record).with_detail("instance_type", &attrs.instance_type)
}

/// Running instance that is neither computing nor talking to anything
pub struct ZombieInstanceCheck;

impl Check for ZombieInstanceCheck {
    fn name(&self) -> &'static str {
        "zombie_instance"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let thresholds = &ctx.policy.thresholds;

        for (record, attrs) in ctx.instances().filter(|(r, _)| is_running(r)) {
            let id = record.id();
            let Some(cpu) = outcome.take_value(
                self.name(),
                id,
                METRIC_CPU,
                ctx.average_metric(id, METRIC_CPU, "Average"),
            ) else {
                continue;
            };
            let Some(network_in) = outcome.take_value(
                self.name(),
                id,
                METRIC_NETWORK_IN,
                ctx.average_metric(id, METRIC_NETWORK_IN, "Sum"),
            ) else {
                continue;
            };
            let Some(network_out) = outcome.take_value(
                self.name(),
                id,
                METRIC_NETWORK_OUT,
                ctx.average_metric(id, METRIC_NETWORK_OUT, "Sum"),
            ) else {
                continue;
            };

            // Hourly sums, so the mean is bytes per hour
            let network_mb_per_hour = (network_in + network_out) / BYTES_PER_MB;
            if cpu >= thresholds.zombie_cpu_percent
                || network_mb_per_hour >= thresholds.zombie_network_mb_per_hour
            {
                continue;
            }

            let cost = ctx.costs.estimate_monthly_cost(&attrs.instance_type);
            let finding =
                Finding::builder(CheckId::ZombieInstance, Severity::High, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action("Terminate or stop the idle instance")
                    .affected(
                        instance_resource(record, attrs)
                            .with_detail("avg_cpu_percent", format!("{:.2}", cpu))
                            .with_detail(
                                "avg_network_mb_per_hour",
                                format!("{:.2}", network_mb_per_hour),
                            ),
                    )
                    .details(format!(
                        "{} ({}) averaged {:.2}% CPU and {:.2} MB/hour network over {} days",
                        id,
                        attrs.instance_type,
                        cpu,
                        network_mb_per_hour,
                        thresholds.lookback_days
                    ))
                    .potential_savings(cost * ZOMBIE_SAVINGS_RATIO)
                    .build();
            outcome.push(self.name(), Some(id), finding);
        }

        Ok(outcome)
    }
}

/// Memory-optimized instance using little of its memory
///
/// Instances without the memory agent metric are skipped as no data.
pub struct OversizedMemoryCheck;

impl Check for OversizedMemoryCheck {
    fn name(&self) -> &'static str {
        "oversized_memory"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();
        let limit = ctx.policy.thresholds.memory_utilization_percent;

        for (record, attrs) in ctx
            .instances()
            .filter(|(r, a)| is_running(r) && is_memory_optimized(a))
        {
            let id = record.id();
            let Some(memory) = outcome.take_value(
                self.name(),
                id,
                METRIC_MEMORY,
                ctx.average_metric(id, METRIC_MEMORY, "Average"),
            ) else {
                continue;
            };
            if memory >= limit {
                continue;
            }

            let cost = ctx.costs.estimate_monthly_cost(&attrs.instance_type);
            let finding =
                Finding::builder(CheckId::OversizedMemory, Severity::High, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action("Downsize to a smaller instance size")
                    .affected(
                        instance_resource(record, attrs)
                            .with_detail("avg_memory_percent", format!("{:.2}", memory)),
                    )
                    .details(format!(
                        "{} ({}) averaged {:.2}% memory utilization (threshold {}%)",
                        id, attrs.instance_type, memory, limit
                    ))
                    .potential_savings(cost * OVERSIZED_MEMORY_SAVINGS_RATIO)
                    .build();
            outcome.push(self.name(), Some(id), finding);
        }

        Ok(outcome)
    }
}

/// Instance on a previous-generation family
pub struct OldGenerationCheck;

impl Check for OldGenerationCheck {
    fn name(&self) -> &'static str {
        "old_generation"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        for (record, attrs) in ctx.instances().filter(|(r, _)| is_live(r)) {
            let Some(target) = modern_family(attrs.family()) else {
                continue;
            };
            let recommended = match attrs.size() {
                Some(size) => format!("{}.{}", target, size),
                None => target.to_string(),
            };

            let cost = ctx.costs.estimate_monthly_cost(&attrs.instance_type);
            let finding =
                Finding::builder(CheckId::OldGeneration, Severity::Medium, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action(format!("Migrate to {}", recommended))
                    .affected(
                        instance_resource(record, attrs)
                            .with_detail("recommended_type", &recommended),
                    )
                    .details(format!(
                        "{} runs previous-generation {}; {} offers better price/performance",
                        record.id(),
                        attrs.instance_type,
                        recommended
                    ))
                    .potential_savings(cost * OLD_GENERATION_SAVINGS_RATIO)
                    .build();
            outcome.push(self.name(), Some(record.id()), finding);
        }

        Ok(outcome)
    }
}

/// Stopped instance still paying for EBS volumes
pub struct StoppedWithEbsCheck;

impl Check for StoppedWithEbsCheck {
    fn name(&self) -> &'static str {
        "stopped_with_ebs"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        for (record, attrs) in ctx.instances().filter(|(r, _)| r.is_in_state("stopped")) {
            let volumes: Vec<_> = attrs.ebs_volumes().collect();
            if volumes.is_empty() {
                continue;
            }

            // Mapping size wins; otherwise use the volume record if captured
            let total_gb: u64 = volumes
                .iter()
                .map(|device| {
                    device.size_gb.unwrap_or_else(|| {
                        device
                            .volume_id
                            .as_deref()
                            .and_then(|vid| ctx.find_volume(vid))
                            .map_or(0, |v| v.size_gb)
                    })
                })
                .sum();
            let volume_ids: Vec<&str> = volumes
                .iter()
                .filter_map(|device| device.volume_id.as_deref())
                .collect();

            let finding =
                Finding::builder(CheckId::StoppedWithEbs, Severity::Medium, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action("Snapshot and delete the attached volumes, or terminate the instance")
                    .affected(
                        instance_resource(record, attrs)
                            .with_detail("volumes", volume_ids.join(" "))
                            .with_detail("total_size_gb", total_gb),
                    )
                    .details(format!(
                        "{} is stopped with {} EBS volume(s) totalling {} GB",
                        record.id(),
                        volume_ids.len(),
                        total_gb
                    ))
                    .potential_savings(ctx.costs.storage_monthly_cost(total_gb))
                    .build();
            outcome.push(self.name(), Some(record.id()), finding);
        }

        Ok(outcome)
    }
}

/// Instance types running at scale without reserved capacity
pub struct MissingRiCoverageCheck;

impl MissingRiCoverageCheck {
    // TODO: consult Cost Explorer reservation coverage once a billing
    // collector exists; every type is reported as uncovered until then.
    fn has_reservation_coverage(&self, _instance_type: &str) -> bool {
        false
    }
}

impl Check for MissingRiCoverageCheck {
    fn name(&self) -> &'static str {
        "missing_ri_coverage"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        let mut by_type: BTreeMap<&str, Vec<(&ResourceRecord, &InstanceAttributes)>> =
            BTreeMap::new();
        for (record, attrs) in ctx.instances().filter(|(r, _)| is_running(r)) {
            by_type
                .entry(attrs.instance_type.as_str())
                .or_default()
                .push((record, attrs));
        }

        for (instance_type, instances) in by_type {
            let count = instances.len();
            if count < ctx.policy.thresholds.ri_min_instances
                || self.has_reservation_coverage(instance_type)
            {
                continue;
            }

            let cost = ctx.costs.estimate_monthly_cost(instance_type);
            let finding =
                Finding::builder(CheckId::MissingRiCoverage, Severity::High, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action(format!("Purchase reserved instances for {}", instance_type))
                    .affected_resources(
                        instances
                            .iter()
                            .map(|(record, attrs)| instance_resource(record, attrs))
                            .collect(),
                    )
                    .details(format!(
                        "{} running {} instances have no reserved instance coverage",
                        count, instance_type
                    ))
                    .potential_savings(cost * count as f64 * RI_SAVINGS_RATIO)
                    .build();
            outcome.push(self.name(), None, finding);
        }

        Ok(outcome)
    }
}

/// Instance missing one or more required governance tags
pub struct UntaggedInstanceCheck;

impl Check for UntaggedInstanceCheck {
    fn name(&self) -> &'static str {
        "untagged_instance"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        for (record, attrs) in ctx.instances().filter(|(r, _)| is_live(r)) {
            let missing = ctx.policy.missing_tags(record.tags());
            if missing.is_empty() {
                continue;
            }

            let finding =
                Finding::builder(CheckId::UntaggedInstance, Severity::Low, ctx.evaluated_at)
                    .resource_type(resource_type(ResourceKind::Instance))
                    .action("Add the missing tags")
                    .affected(
                        instance_resource(record, attrs)
                            .with_detail("missing_tags", missing.join(", ")),
                    )
                    .details(format!("Missing required tags: {}", missing.join(", ")))
                    .build();
            outcome.push(self.name(), Some(record.id()), finding);
        }

        Ok(outcome)
    }
}

/// Burstable instance in unlimited mode that keeps spending surplus credits
pub struct BurstableCreditAbuseCheck;

impl Check for BurstableCreditAbuseCheck {
    fn name(&self) -> &'static str {
        "burstable_credit_abuse"
    }

    fn evaluate(&self, ctx: &CheckContext<'_>) -> Result<CheckOutcome> {
        let mut outcome = CheckOutcome::new();

        for (record, attrs) in ctx
            .instances()
            .filter(|(r, a)| is_live(r) && is_burstable(a) && a.has_unlimited_credits())
        {
            let id = record.id();
            let Some(surplus) = outcome.take_value(
                self.name(),
                id,
                METRIC_CPU_SURPLUS,
                ctx.average_metric(id, METRIC_CPU_SURPLUS, "Average"),
            ) else {
                continue;
            };
            if surplus <= 0.0 {
                continue;
            }

            let cost = ctx.costs.estimate_monthly_cost(&attrs.instance_type);
            let finding = Finding::builder(
                CheckId::BurstableCreditAbuse,
                Severity::High,
                ctx.evaluated_at,
            )
            .resource_type(resource_type(ResourceKind::Instance))
            .action("Move to a fixed-performance instance type (e.g. m5)")
            .affected(
                instance_resource(record, attrs)
                    .with_detail("avg_surplus_credits", format!("{:.2}", surplus)),
            )
            .details(format!(
                "{} ({}) runs in unlimited mode and averaged {:.2} surplus credits charged",
                id, attrs.instance_type, surplus
            ))
            .potential_savings(cost * BURSTABLE_SAVINGS_RATIO)
            .build();
            outcome.push(self.name(), Some(id), finding);
        }

        Ok(outcome)
    }
}
