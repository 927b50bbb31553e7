/// Mock implementations for testing
mod mock_inventory_collector;
mod mock_progress_reporter;

pub use mock_inventory_collector::MockInventoryCollector;
pub use mock_progress_reporter::MockProgressReporter;
