pub mod check_executor;
pub mod cost_estimator;
pub mod finding_aggregator;
pub mod resource_filter;

pub use check_executor::{CheckExecutor, ExecutionResult};
pub use cost_estimator::CostEstimator;
pub use finding_aggregator::{
    truncate_for_console, AggregationInput, FindingAggregator, CONSOLE_RESOURCE_LIMIT,
};
pub use resource_filter::ResourceFilter;
