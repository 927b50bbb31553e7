use crate::audit::domain::Snapshot;
use crate::shared::Result;
use async_trait::async_trait;

/// InventoryCollector port for gathering the resources of one scope
///
/// This port abstracts the inventory source (a captured snapshot file,
/// a live cloud API, etc.). Pagination, retries and credentials are the
/// adapter's concern.
///
/// # Async Support
/// Collection is async so live adapters can fan out requests.
/// Implementations must be `Send + Sync`.
#[async_trait]
pub trait InventoryCollector: Send + Sync {
    /// Collects every resource and captured metric for `scope`
    ///
    /// # Arguments
    /// * `scope` - Region (or equivalent partition) to collect
    ///
    /// # Errors
    /// Any error is fatal to the audit run.
    async fn collect(&self, scope: &str) -> Result<Snapshot>;
}
