use super::metric::MetricStore;
use super::resource::{ResourceKind, ResourceRecord};
use chrono::{DateTime, Utc};

/// Point-in-time inventory of one scope: resources plus captured metrics
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub scope: String,
    /// When the capture was taken; evaluation windows end here
    pub captured_at: Option<DateTime<Utc>>,
    pub resources: Vec<ResourceRecord>,
    pub metrics: MetricStore,
}

impl Snapshot {
    pub fn new(
        scope: impl Into<String>,
        resources: Vec<ResourceRecord>,
        metrics: MetricStore,
    ) -> Self {
        Self {
            scope: scope.into(),
            captured_at: None,
            resources,
            metrics,
        }
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = Some(captured_at);
        self
    }

    /// Instant the checks evaluate against
    pub fn evaluation_instant(&self) -> DateTime<Utc> {
        self.captured_at.unwrap_or_else(Utc::now)
    }

    /// Number of resources of one kind
    pub fn count_of(&self, kind: ResourceKind) -> usize {
        self.resources.iter().filter(|r| r.kind() == kind).count()
    }
}
