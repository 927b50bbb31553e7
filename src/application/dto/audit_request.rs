use crate::audit::policies::AuditPolicy;

/// AuditRequest - Internal request DTO for the audit use case
#[derive(Debug, Clone)]
pub struct AuditRequest {
    /// Region (or equivalent partition) to audit
    pub scope: String,
    /// Patterns for excluding resources by id
    pub exclude_patterns: Vec<String>,
    /// Check names removed from the catalog
    pub disabled_checks: Vec<String>,
    pub policy: AuditPolicy,
}

impl AuditRequest {
    pub fn new(
        scope: String,
        exclude_patterns: Vec<String>,
        disabled_checks: Vec<String>,
        policy: AuditPolicy,
    ) -> Self {
        Self {
            scope,
            exclude_patterns,
            disabled_checks,
            policy,
        }
    }

    /// Request with default policy and no exclusions
    pub fn for_scope(scope: impl Into<String>) -> Self {
        Self::new(scope.into(), Vec::new(), Vec::new(), AuditPolicy::default())
    }
}
