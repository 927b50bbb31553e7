/// Data Transfer Objects for application layer
///
/// DTOs are used to transfer data between the application layer
/// and adapters, keeping the audit core isolated.
mod audit_request;
mod audit_response;
mod output_format;

pub use audit_request::AuditRequest;
pub use audit_response::AuditResponse;
pub use output_format::OutputFormat;
