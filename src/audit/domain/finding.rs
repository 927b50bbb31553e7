use super::resource::{ResourceKind, ResourceRecord};
use crate::shared::error::AuditError;
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Finding severity
///
/// Variant order is the display rank: critical sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Display rank: critical=0, high=1, medium=2, low=3
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Whether this severity is at least as severe as `threshold`
    pub fn meets(self, threshold: Severity) -> bool {
        self.rank() <= threshold.rank()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!(
                "Invalid severity: {}. Please specify 'critical', 'high', 'medium' or 'low'",
                s
            )),
        }
    }
}

/// Grouping used for the by-category report views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Cost & Efficiency")]
    CostAndEfficiency,
    #[serde(rename = "Message Loss & Resilience")]
    MessageLossAndResilience,
    #[serde(rename = "Performance & Configuration")]
    PerformanceAndConfiguration,
    #[serde(rename = "Security & Compliance")]
    SecurityAndCompliance,
    #[serde(rename = "Tagging & Governance")]
    TaggingAndGovernance,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::CostAndEfficiency => "Cost & Efficiency",
            Category::MessageLossAndResilience => "Message Loss & Resilience",
            Category::PerformanceAndConfiguration => "Performance & Configuration",
            Category::SecurityAndCompliance => "Security & Compliance",
            Category::TaggingAndGovernance => "Tagging & Governance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identifier of the rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    ZombieInstance,
    OversizedMemory,
    OldGeneration,
    StoppedWithEbs,
    MissingRiCoverage,
    UntaggedInstance,
    InefficientStorage,
    BurstableCreditAbuse,
    MissingDlq,
    DlqMessageAccumulation,
    HighDlqDepth,
    ExcessiveRetry,
    VisibilityTimeoutTooShort,
    VisibilityTimeoutTooLong,
    DlqRetentionGap,
    ShortPolling,
    StaleQueue,
    UnencryptedSensitiveResource,
    FifoDedupDisabled,
    SnsSubscriptionUnconfirmed,
    SnsSubscriptionMissingFilter,
}

impl CheckId {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckId::ZombieInstance => "zombie_instance",
            CheckId::OversizedMemory => "oversized_memory",
            CheckId::OldGeneration => "old_generation",
            CheckId::StoppedWithEbs => "stopped_with_ebs",
            CheckId::MissingRiCoverage => "missing_ri_coverage",
            CheckId::UntaggedInstance => "untagged_instance",
            CheckId::InefficientStorage => "inefficient_storage",
            CheckId::BurstableCreditAbuse => "burstable_credit_abuse",
            CheckId::MissingDlq => "missing_dlq",
            CheckId::DlqMessageAccumulation => "dlq_message_accumulation",
            CheckId::HighDlqDepth => "high_dlq_depth",
            CheckId::ExcessiveRetry => "excessive_retry",
            CheckId::VisibilityTimeoutTooShort => "visibility_timeout_too_short",
            CheckId::VisibilityTimeoutTooLong => "visibility_timeout_too_long",
            CheckId::DlqRetentionGap => "dlq_retention_gap",
            CheckId::ShortPolling => "short_polling",
            CheckId::StaleQueue => "stale_queue",
            CheckId::UnencryptedSensitiveResource => "unencrypted_sensitive_resource",
            CheckId::FifoDedupDisabled => "fifo_dedup_disabled",
            CheckId::SnsSubscriptionUnconfirmed => "sns_subscription_unconfirmed",
            CheckId::SnsSubscriptionMissingFilter => "sns_subscription_missing_filter",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            CheckId::ZombieInstance
            | CheckId::OversizedMemory
            | CheckId::OldGeneration
            | CheckId::StoppedWithEbs
            | CheckId::MissingRiCoverage
            | CheckId::InefficientStorage
            | CheckId::BurstableCreditAbuse
            | CheckId::StaleQueue => Category::CostAndEfficiency,
            CheckId::UntaggedInstance => Category::TaggingAndGovernance,
            CheckId::MissingDlq
            | CheckId::DlqMessageAccumulation
            | CheckId::HighDlqDepth
            | CheckId::ExcessiveRetry
            | CheckId::DlqRetentionGap
            | CheckId::SnsSubscriptionUnconfirmed => Category::MessageLossAndResilience,
            CheckId::VisibilityTimeoutTooShort
            | CheckId::VisibilityTimeoutTooLong
            | CheckId::ShortPolling
            | CheckId::FifoDedupDisabled
            | CheckId::SnsSubscriptionMissingFilter => Category::PerformanceAndConfiguration,
            CheckId::UnencryptedSensitiveResource => Category::SecurityAndCompliance,
        }
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource-specific detail record attached to a finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffectedResource {
    pub resource_id: String,
    pub kind: ResourceKind,
    pub name: String,
    /// Messages held by the resource, for queue findings that count them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<u64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, String>,
}

impl AffectedResource {
    pub fn from_record(record: &ResourceRecord) -> Self {
        Self {
            resource_id: record.id().to_string(),
            kind: record.kind(),
            name: record.display_name().to_string(),
            message_count: None,
            tags: record.tags().clone(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: impl ToString) -> Self {
        self.details.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_message_count(mut self, count: u64) -> Self {
        self.message_count = Some(count);
        self
    }
}

/// One detected issue, produced by a single check
///
/// Findings are never mutated after construction; use [`FindingBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    category: Category,
    check_id: CheckId,
    severity: Severity,
    resource_type: String,
    action: String,
    affected_resources: Vec<AffectedResource>,
    details: String,
    potential_savings: f64,
    created_at: DateTime<Utc>,
}

impl Finding {
    pub fn builder(
        check_id: CheckId,
        severity: Severity,
        created_at: DateTime<Utc>,
    ) -> FindingBuilder {
        FindingBuilder::new(check_id, severity, created_at)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn check_id(&self) -> CheckId {
        self.check_id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn affected_resources(&self) -> &[AffectedResource] {
        &self.affected_resources
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn potential_savings(&self) -> f64 {
        self.potential_savings
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Builder for [`Finding`] that validates the savings invariant on `build()`
#[derive(Debug, Clone)]
pub struct FindingBuilder {
    check_id: CheckId,
    severity: Severity,
    created_at: DateTime<Utc>,
    resource_type: String,
    action: String,
    affected_resources: Vec<AffectedResource>,
    details: String,
    potential_savings: f64,
}

impl FindingBuilder {
    pub fn new(check_id: CheckId, severity: Severity, created_at: DateTime<Utc>) -> Self {
        Self {
            check_id,
            severity,
            created_at,
            resource_type: String::new(),
            action: String::new(),
            affected_resources: Vec::new(),
            details: String::new(),
            potential_savings: 0.0,
        }
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn affected(mut self, resource: AffectedResource) -> Self {
        self.affected_resources.push(resource);
        self
    }

    pub fn affected_resources(mut self, resources: Vec<AffectedResource>) -> Self {
        self.affected_resources.extend(resources);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn potential_savings(mut self, savings: f64) -> Self {
        self.potential_savings = savings;
        self
    }

    /// Validates and builds the finding
    ///
    /// # Errors
    /// Returns a validation error if:
    /// - No affected resource was given
    /// - Potential savings are negative or not finite
    pub fn build(self) -> Result<Finding> {
        if self.affected_resources.is_empty() {
            return Err(AuditError::Validation {
                message: format!("{} finding has no affected resources", self.check_id),
            }
            .into());
        }

        if !self.potential_savings.is_finite() || self.potential_savings < 0.0 {
            return Err(AuditError::Validation {
                message: format!(
                    "{} finding has invalid potential savings: {}",
                    self.check_id, self.potential_savings
                ),
            }
            .into());
        }

        Ok(Finding {
            category: self.check_id.category(),
            check_id: self.check_id,
            severity: self.severity,
            resource_type: self.resource_type,
            action: self.action,
            affected_resources: self.affected_resources,
            details: self.details,
            potential_savings: self.potential_savings,
            created_at: self.created_at,
        })
    }
}
