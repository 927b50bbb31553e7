pub mod evaluation;
pub mod finding;
pub mod metric;
pub mod report;
pub mod resource;
pub mod snapshot;

pub use evaluation::{SkipReason, SkippedEvaluation};
pub use finding::{AffectedResource, Category, CheckId, Finding, FindingBuilder, Severity};
pub use metric::{MetricFailure, MetricQuery, MetricSample, MetricStore};
pub use report::{CategoryGroup, Report, SeverityCounts};
pub use resource::{
    BlockDevice, InstanceAttributes, QueueAttributes, RedrivePolicy, ResourceAttributes,
    ResourceKind, ResourceRecord, SubscriptionAttributes, TopicAttributes, VolumeAttributes,
};
pub use snapshot::Snapshot;
