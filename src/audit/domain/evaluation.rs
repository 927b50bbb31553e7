use serde::Serialize;
use std::fmt;

/// Why a resource was left out of a check's results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The metric series was empty or the collecting agent is not installed
    NoData { metric: String },
    /// Fetching data or building the finding failed
    Failed { message: String },
}

impl SkipReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, SkipReason::Failed { .. })
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData { metric } => write!(f, "no data for {}", metric),
            SkipReason::Failed { message } => write!(f, "{}", message),
        }
    }
}

/// A resource (or an entire check) excluded from a run's findings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEvaluation {
    pub check: String,
    /// `None` when the whole check failed
    pub resource_id: Option<String>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl SkippedEvaluation {
    pub fn no_data(check: &str, resource_id: &str, metric: &str) -> Self {
        Self {
            check: check.to_string(),
            resource_id: Some(resource_id.to_string()),
            reason: SkipReason::NoData {
                metric: metric.to_string(),
            },
        }
    }

    pub fn failed(check: &str, resource_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            check: check.to_string(),
            resource_id: resource_id.map(str::to_string),
            reason: SkipReason::Failed {
                message: message.into(),
            },
        }
    }
}

impl fmt::Display for SkippedEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.resource_id {
            Some(id) => write!(f, "{} skipped {}: {}", self.check, id, self.reason),
            None => write!(f, "{} failed: {}", self.check, self.reason),
        }
    }
}
