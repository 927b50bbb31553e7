use crate::shared::error::AuditError;
use crate::shared::Result;
use serde::Deserialize;

/// Tags every instance is expected to carry
pub const DEFAULT_REQUIRED_TAGS: [&str; 4] = ["CostCenter", "Environment", "Owner", "Application"];

/// Tunable limits used by the check catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Length of the metric lookback window
    pub lookback_days: u32,
    pub zombie_cpu_percent: f64,
    pub zombie_network_mb_per_hour: f64,
    pub memory_utilization_percent: f64,
    pub ri_min_instances: usize,
    /// Assumed maximum message count of a dead-letter queue
    pub dlq_capacity: u64,
    pub dlq_depth_ratio: f64,
    pub max_receive_count: u64,
    pub min_visibility_timeout_secs: u64,
    pub max_visibility_timeout_secs: u64,
    pub stale_queue_days: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            lookback_days: 14,
            zombie_cpu_percent: 10.0,
            zombie_network_mb_per_hour: 5.0,
            memory_utilization_percent: 40.0,
            ri_min_instances: 5,
            dlq_capacity: 120_000,
            dlq_depth_ratio: 0.9,
            max_receive_count: 10,
            min_visibility_timeout_secs: 30,
            max_visibility_timeout_secs: 43_200,
            stale_queue_days: 30,
        }
    }
}

impl Thresholds {
    /// Message count at which a DLQ counts as nearly full
    pub fn dlq_depth_limit(&self) -> f64 {
        self.dlq_capacity as f64 * self.dlq_depth_ratio
    }

    pub fn is_dlq_near_capacity(&self, message_count: u64) -> bool {
        message_count as f64 >= self.dlq_depth_limit()
    }

    /// # Errors
    /// Returns a validation error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.lookback_days == 0 {
            return Err(invalid("lookback_days must be greater than 0"));
        }
        if !(self.dlq_depth_ratio > 0.0 && self.dlq_depth_ratio <= 1.0) {
            return Err(invalid(format!(
                "dlq_depth_ratio must be within (0, 1], got {}",
                self.dlq_depth_ratio
            )));
        }
        for (name, value) in [
            ("zombie_cpu_percent", self.zombie_cpu_percent),
            ("zombie_network_mb_per_hour", self.zombie_network_mb_per_hour),
            ("memory_utilization_percent", self.memory_utilization_percent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.ri_min_instances == 0 {
            return Err(invalid("ri_min_instances must be greater than 0"));
        }
        if self.min_visibility_timeout_secs > self.max_visibility_timeout_secs {
            return Err(invalid(format!(
                "min_visibility_timeout_secs ({}) exceeds max_visibility_timeout_secs ({})",
                self.min_visibility_timeout_secs, self.max_visibility_timeout_secs
            )));
        }
        Ok(())
    }
}

/// Thresholds plus governance settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct AuditPolicy {
    pub thresholds: Thresholds,
    pub required_tags: Vec<String>,
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            required_tags: DEFAULT_REQUIRED_TAGS.map(String::from).to_vec(),
        }
    }
}

impl AuditPolicy {
    pub fn new(thresholds: Thresholds, required_tags: Vec<String>) -> Result<Self> {
        let policy = Self {
            thresholds,
            required_tags,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if let Some(i) = self.required_tags.iter().position(|t| t.trim().is_empty()) {
            return Err(invalid(format!("required_tags[{}] must not be empty", i)));
        }
        Ok(())
    }

    /// Required tags absent from `tags`, in policy order
    pub fn missing_tags<'a>(
        &'a self,
        tags: &std::collections::BTreeMap<String, String>,
    ) -> Vec<&'a str> {
        self.required_tags
            .iter()
            .filter(|tag| !tags.contains_key(tag.as_str()))
            .map(String::as_str)
            .collect()
    }
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    AuditError::Validation {
        message: message.into(),
    }
    .into()
}
