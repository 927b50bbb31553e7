use crate::audit::domain::{MetricQuery, MetricSample, MetricStore};
use crate::shared::Result;

/// MetricsProvider port for time-series lookups made by checks
///
/// Failures are local: a check that cannot fetch a metric skips that
/// resource and carries on.
pub trait MetricsProvider {
    /// Fetches the samples for one resource/metric over the query window
    ///
    /// An empty result means no datapoints were recorded.
    fn fetch_metric(&self, query: &MetricQuery) -> Result<Vec<MetricSample>>;
}

impl MetricsProvider for MetricStore {
    fn fetch_metric(&self, query: &MetricQuery) -> Result<Vec<MetricSample>> {
        self.lookup(query)
    }
}
