pub mod thresholds;

pub use thresholds::{AuditPolicy, Thresholds, DEFAULT_REQUIRED_TAGS};
