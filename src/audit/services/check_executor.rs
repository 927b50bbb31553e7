use crate::audit::checks::{CheckContext, RuleCatalog};
use crate::audit::domain::{Finding, SkippedEvaluation};

/// Concatenated output of a catalog run, in catalog order
#[derive(Debug, Default)]
pub struct ExecutionResult {
    pub findings: Vec<Finding>,
    pub skipped: Vec<SkippedEvaluation>,
}

/// CheckExecutor - Runs every check in the catalog over one snapshot
///
/// Checks run sequentially. A check that fails outright is recorded as a
/// skipped evaluation and the remaining checks still run.
pub struct CheckExecutor;

impl CheckExecutor {
    pub fn run(catalog: &RuleCatalog, ctx: &CheckContext<'_>) -> ExecutionResult {
        Self::run_with_progress(catalog, ctx, |_, _, _| {})
    }

    /// Runs the catalog, calling `on_progress(completed, total, check_name)`
    /// after each check
    pub fn run_with_progress<F>(
        catalog: &RuleCatalog,
        ctx: &CheckContext<'_>,
        mut on_progress: F,
    ) -> ExecutionResult
    where
        F: FnMut(usize, usize, &str),
    {
        let total = catalog.len();
        let mut result = ExecutionResult::default();

        for (index, check) in catalog.checks().iter().enumerate() {
            match check.evaluate(ctx) {
                Ok(outcome) => {
                    tracing::debug!(
                        check = check.name(),
                        findings = outcome.findings.len(),
                        skipped = outcome.skipped.len(),
                        "check completed"
                    );
                    result.findings.extend(outcome.findings);
                    result.skipped.extend(outcome.skipped);
                }
                Err(e) => {
                    tracing::warn!(check = check.name(), error = %e, "check failed");
                    result
                        .skipped
                        .push(SkippedEvaluation::failed(check.name(), None, format!("{:#}", e)));
                }
            }
            on_progress(index + 1, total, check.name());
        }

        result
    }
}
