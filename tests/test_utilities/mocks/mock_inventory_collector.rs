use async_trait::async_trait;
use cloud_audit::prelude::*;
use std::sync::{Arc, Mutex};

/// Mock InventoryCollector that returns a prepared snapshot or fails
#[derive(Clone)]
pub struct MockInventoryCollector {
    snapshot: Option<Snapshot>,
    error: Option<String>,
    pub requested_scopes: Arc<Mutex<Vec<String>>>,
}

impl MockInventoryCollector {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            error: None,
            requested_scopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            snapshot: None,
            error: Some(message.to_string()),
            requested_scopes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requested_scopes.lock().unwrap().len()
    }
}

#[async_trait]
impl InventoryCollector for MockInventoryCollector {
    async fn collect(&self, scope: &str) -> Result<Snapshot> {
        self.requested_scopes
            .lock()
            .unwrap()
            .push(scope.to_string());
        match (&self.snapshot, &self.error) {
            (_, Some(message)) => anyhow::bail!("{}", message),
            (Some(snapshot), None) => Ok(snapshot.clone()),
            (None, None) => anyhow::bail!("no snapshot configured"),
        }
    }
}
