/// Audit domain layer
///
/// Pure business logic: the resource/metric model, the rule catalog,
/// and the services that execute checks and fold findings into a report.
/// Nothing in this layer performs I/O.
pub mod checks;
pub mod domain;
pub mod policies;
pub mod services;
