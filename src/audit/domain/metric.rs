use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One aggregated datapoint of a CloudWatch-style metric series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub resource_id: String,
    pub metric_name: String,
    pub statistic: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub period_seconds: u32,
    /// Absent when the provider returned an empty datapoint
    #[serde(default)]
    pub value: Option<f64>,
}

/// A metric capture that failed for one resource/metric pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub resource_id: String,
    pub metric_name: String,
    pub message: String,
}

/// Parameters of a single metric fetch
#[derive(Debug, Clone, PartialEq)]
pub struct MetricQuery {
    pub resource_id: String,
    pub metric_name: String,
    pub statistic: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub period_seconds: u32,
}

impl MetricQuery {
    pub fn new(
        resource_id: &str,
        metric_name: &str,
        statistic: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        period_seconds: u32,
    ) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            metric_name: metric_name.to_string(),
            statistic: statistic.to_string(),
            window_start,
            window_end,
            period_seconds,
        }
    }

    /// Whether a sample falls inside this query's window with matching shape
    pub fn admits(&self, sample: &MetricSample) -> bool {
        sample.statistic.eq_ignore_ascii_case(&self.statistic)
            && sample.period_seconds == self.period_seconds
            && sample.window_start >= self.window_start
            && sample.window_end <= self.window_end
    }
}

type SeriesKey = (String, String);

/// In-memory index of captured metric samples
///
/// Samples are grouped per (resource, metric) so lookups stay cheap on
/// large captures. Recorded failures make lookups for that pair fail,
/// which is how a snapshot preserves a metric fetch that errored at
/// capture time.
#[derive(Debug, Clone, Default)]
pub struct MetricStore {
    series: HashMap<SeriesKey, Vec<MetricSample>>,
    failures: HashMap<SeriesKey, String>,
}

impl MetricStore {
    pub fn new(samples: Vec<MetricSample>, failures: Vec<MetricFailure>) -> Self {
        let mut series: HashMap<SeriesKey, Vec<MetricSample>> = HashMap::new();
        for sample in samples {
            series
                .entry((sample.resource_id.clone(), sample.metric_name.clone()))
                .or_default()
                .push(sample);
        }
        for samples in series.values_mut() {
            samples.sort_by_key(|s| s.window_start);
        }

        let failures = failures
            .into_iter()
            .map(|f| ((f.resource_id, f.metric_name), f.message))
            .collect();

        Self { series, failures }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Total number of samples held
    pub fn sample_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Returns the samples admitted by the query, in window order
    ///
    /// # Errors
    /// Returns an error if the capture for this resource/metric failed
    pub fn lookup(&self, query: &MetricQuery) -> Result<Vec<MetricSample>> {
        let key = (query.resource_id.clone(), query.metric_name.clone());
        if let Some(message) = self.failures.get(&key) {
            anyhow::bail!(
                "Metric {} for {} is unavailable: {}",
                query.metric_name,
                query.resource_id,
                message
            );
        }

        Ok(self
            .series
            .get(&key)
            .map(|samples| {
                samples
                    .iter()
                    .filter(|s| query.admits(s))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn sample(resource: &str, metric: &str, hour: i64, value: Option<f64>) -> MetricSample {
        MetricSample {
            resource_id: resource.to_string(),
            metric_name: metric.to_string(),
            statistic: "Average".to_string(),
            window_start: t0() + Duration::hours(hour),
            window_end: t0() + Duration::hours(hour + 1),
            period_seconds: 3600,
            value,
        }
    }

    fn query(resource: &str, metric: &str) -> MetricQuery {
        MetricQuery::new(
            resource,
            metric,
            "Average",
            t0(),
            t0() + Duration::days(14),
            3600,
        )
    }

    #[test]
    fn test_lookup_returns_samples_in_window_order() {
        let store = MetricStore::new(
            vec![
                sample("i-1", "CPUUtilization", 2, Some(3.0)),
                sample("i-1", "CPUUtilization", 1, Some(5.0)),
                sample("i-2", "CPUUtilization", 1, Some(90.0)),
            ],
            vec![],
        );

        let samples = store.lookup(&query("i-1", "CPUUtilization")).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].value, Some(5.0));
        assert_eq!(store.sample_count(), 3);
    }

    #[test]
    fn test_lookup_excludes_samples_outside_window() {
        let store = MetricStore::new(vec![sample("i-1", "CPUUtilization", -5, Some(1.0))], vec![]);
        assert!(store
            .lookup(&query("i-1", "CPUUtilization"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_lookup_excludes_other_statistics() {
        let mut s = sample("i-1", "NetworkIn", 1, Some(1.0));
        s.statistic = "Sum".to_string();
        let store = MetricStore::new(vec![s], vec![]);
        assert!(store.lookup(&query("i-1", "NetworkIn")).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_unknown_series_is_empty() {
        let store = MetricStore::empty();
        let samples = store.lookup(&query("i-9", "mem_used_percent")).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_lookup_recorded_failure_is_error() {
        let store = MetricStore::new(
            vec![],
            vec![MetricFailure {
                resource_id: "i-1".to_string(),
                metric_name: "CPUUtilization".to_string(),
                message: "Throttling".to_string(),
            }],
        );
        let err = store.lookup(&query("i-1", "CPUUtilization")).unwrap_err();
        assert!(err.to_string().contains("Throttling"));
    }
}
