//! cloud-audit - rule-based cost and compliance auditing for AWS resources
//!
//! Evaluates a fixed catalog of checks over a captured inventory snapshot
//! (EC2 instances, EBS volumes, SQS queues, SNS topics and subscriptions)
//! and reports severity-ranked findings with estimated monthly savings.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`audit`): resource model, checks, policies and services
//! - **Application Layer** (`application`): use cases, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use cloud_audit::prelude::*;
//! use std::path::PathBuf;
//!
//! # async fn run() -> Result<()> {
//! let use_case = RunAuditUseCase::new(
//!     SnapshotFileCollector::new(PathBuf::from("snapshot.json")),
//!     StderrProgressReporter::new(),
//! );
//!
//! let response = use_case.execute(AuditRequest::for_scope("us-east-1")).await?;
//!
//! let output = TableFormatter::new().format(&response.report)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod audit;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemWriter, SnapshotFileCollector, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{CsvFormatter, JsonFormatter, TableFormatter};
    pub use crate::application::dto::{AuditRequest, AuditResponse, OutputFormat};
    pub use crate::application::use_cases::RunAuditUseCase;
    pub use crate::audit::checks::{Check, CheckContext, CheckOutcome, RuleCatalog};
    pub use crate::audit::domain::{
        AffectedResource, Category, CheckId, Finding, MetricSample, MetricStore, Report,
        ResourceKind, ResourceRecord, Severity, Snapshot,
    };
    pub use crate::audit::policies::{AuditPolicy, Thresholds};
    pub use crate::audit::services::CostEstimator;
    pub use crate::ports::outbound::{
        InventoryCollector, MetricsProvider, OutputPresenter, ProgressReporter, ReportFormatter,
    };
    pub use crate::shared::Result;
}
