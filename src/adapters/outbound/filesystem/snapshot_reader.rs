use crate::audit::domain::{
    MetricFailure, MetricSample, MetricStore, ResourceAttributes, ResourceKind, ResourceRecord,
    Snapshot,
};
use crate::ports::outbound::InventoryCollector;
use crate::shared::error::AuditError;
use crate::shared::security::validate_input_file;
use crate::shared::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    resources: Vec<ResourceEntry>,
    #[serde(default)]
    metrics: Vec<MetricSample>,
    #[serde(default)]
    metric_errors: Vec<MetricFailure>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    id: String,
    kind: ResourceKind,
    #[serde(default)]
    state: String,
    #[serde(default)]
    tags: TagSet,
    #[serde(default)]
    attributes: serde_json::Value,
}

/// Tags as a plain mapping or as the `[{"Key": .., "Value": ..}]` list the
/// AWS APIs return
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TagSet {
    Map(BTreeMap<String, String>),
    List(Vec<TagPair>),
}

#[derive(Debug, Deserialize)]
struct TagPair {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value", default)]
    value: String,
}

impl Default for TagSet {
    fn default() -> Self {
        TagSet::Map(BTreeMap::new())
    }
}

impl TagSet {
    fn into_map(self) -> BTreeMap<String, String> {
        match self {
            TagSet::Map(map) => map,
            TagSet::List(pairs) => pairs.into_iter().map(|p| (p.key, p.value)).collect(),
        }
    }
}

/// SnapshotFileCollector adapter: inventory from a captured JSON document
///
/// Document layout:
/// ```json
/// {
///   "scope": "us-east-1",
///   "captured_at": "2024-06-15T00:00:00Z",
///   "resources": [{"id": "i-1", "kind": "instance", "state": "running",
///                  "tags": {"Owner": "platform"},
///                  "attributes": {"instance_type": "t2.micro"}}],
///   "metrics": [{"resource_id": "i-1", "metric_name": "CPUUtilization",
///                "statistic": "Average", "window_start": "...",
///                "window_end": "...", "period_seconds": 3600, "value": 3.0}],
///   "metric_errors": [{"resource_id": "i-2", "metric_name": "CPUUtilization",
///                      "message": "AccessDenied"}]
/// }
/// ```
pub struct SnapshotFileCollector {
    path: PathBuf,
}

impl SnapshotFileCollector {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_document(&self) -> Result<String> {
        if !self.path.exists() {
            return Err(AuditError::SnapshotNotFound {
                path: self.path.clone(),
                suggestion: format!(
                    "No snapshot at \"{}\".\n   Pass the captured inventory with --snapshot or set `snapshot` in the config file.",
                    self.path.display()
                ),
            }
            .into());
        }

        validate_input_file(&self.path, "snapshot").map_err(|e| AuditError::FileReadError {
            path: self.path.clone(),
            details: e.to_string(),
        })?;

        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| {
                AuditError::FileReadError {
                    path: self.path.clone(),
                    details: e.to_string(),
                }
                .into()
            })
    }

    fn parse_error(&self, details: impl Into<String>) -> anyhow::Error {
        AuditError::SnapshotParseError {
            path: self.path.clone(),
            details: details.into(),
        }
        .into()
    }

    /// Converts the raw document into typed records
    ///
    /// A record whose attributes do not fit its kind fails the whole load.
    fn build_snapshot(&self, scope: &str, document: SnapshotDocument) -> Result<Snapshot> {
        if let Some(declared) = document.scope.as_deref() {
            if declared != scope {
                return Err(AuditError::InventoryCollection {
                    scope: scope.to_string(),
                    details: format!(
                        "snapshot {} was captured for scope '{}'; pass --region {} to audit it",
                        self.path.display(),
                        declared,
                        declared
                    ),
                }
                .into());
            }
        }

        let mut resources = Vec::with_capacity(document.resources.len());
        for (index, entry) in document.resources.into_iter().enumerate() {
            let attributes = ResourceAttributes::from_json(entry.kind, entry.attributes)
                .map_err(|e| {
                    self.parse_error(format!(
                        "resources[{}] ({} '{}'): {}",
                        index, entry.kind, entry.id, e
                    ))
                })?;
            let record =
                ResourceRecord::new(entry.id, entry.state, entry.tags.into_map(), attributes)
                    .map_err(|e| self.parse_error(format!("resources[{}]: {}", index, e)))?;
            resources.push(record);
        }

        let metrics = MetricStore::new(document.metrics, document.metric_errors);
        let mut snapshot = Snapshot::new(scope, resources, metrics);
        if let Some(captured_at) = document.captured_at {
            snapshot = snapshot.with_captured_at(captured_at);
        }
        Ok(snapshot)
    }
}

#[async_trait]
impl InventoryCollector for SnapshotFileCollector {
    async fn collect(&self, scope: &str) -> Result<Snapshot> {
        let content = self.read_document().await?;
        let document: SnapshotDocument =
            serde_json::from_str(&content).map_err(|e| self.parse_error(e.to_string()))?;

        tracing::debug!(
            path = %self.path.display(),
            resources = document.resources.len(),
            samples = document.metrics.len(),
            metric_errors = document.metric_errors.len(),
            "snapshot document parsed"
        );

        self.build_snapshot(scope, document)
    }
}
