/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the audit core uses
/// to interact with external systems (inventory, metrics, file system, console).
pub mod inventory_collector;
pub mod metrics_provider;
pub mod output_presenter;
pub mod progress_reporter;
pub mod report_formatter;

pub use inventory_collector::InventoryCollector;
pub use metrics_provider::MetricsProvider;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use report_formatter::ReportFormatter;
