/// Monthly estimate used for instance types missing from the price table
pub const DEFAULT_MONTHLY_COST: f64 = 100.0;

/// EBS storage price per GB-month
pub const EBS_GB_MONTH_COST: f64 = 0.10;

/// CostEstimator - Static on-demand price lookup
///
/// Prices are USD per month for a Linux instance running all month in
/// us-east-1. Lookups are pure and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostEstimator;

impl CostEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Estimated monthly cost of one instance of `resource_type`
    pub fn estimate_monthly_cost(&self, resource_type: &str) -> f64 {
        lookup_price(resource_type).unwrap_or(DEFAULT_MONTHLY_COST)
    }

    /// Monthly cost of keeping `size_gb` of EBS storage
    pub fn storage_monthly_cost(&self, size_gb: u64) -> f64 {
        size_gb as f64 * EBS_GB_MONTH_COST
    }
}

fn lookup_price(resource_type: &str) -> Option<f64> {
    let price = match resource_type {
        "t2.nano" => 4.25,
        "t2.micro" => 8.50,
        "t2.small" => 17.00,
        "t2.medium" => 34.00,
        "t2.large" => 68.00,
        "t2.xlarge" => 136.00,
        "t3.nano" => 3.80,
        "t3.micro" => 7.60,
        "t3.small" => 15.20,
        "t3.medium" => 30.40,
        "t3.large" => 60.80,
        "t3.xlarge" => 121.60,
        "m4.large" => 73.00,
        "m4.xlarge" => 146.00,
        "m4.2xlarge" => 292.00,
        "m5.large" => 70.00,
        "m5.xlarge" => 140.00,
        "m5.2xlarge" => 280.00,
        "c4.large" => 73.00,
        "c4.xlarge" => 146.00,
        "c5.large" => 62.00,
        "c5.xlarge" => 124.00,
        "r4.large" => 97.00,
        "r4.xlarge" => 194.00,
        "r5.large" => 91.00,
        "r5.xlarge" => 182.00,
        "r5.2xlarge" => 364.00,
        "r6i.large" => 91.00,
        "r6i.xlarge" => 182.00,
        "r6i.2xlarge" => 364.00,
        "x2iedn.xlarge" => 608.00,
        "x2gd.large" => 122.00,
        _ => return None,
    };
    Some(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prices() {
        let estimator = CostEstimator::new();
        assert_eq!(estimator.estimate_monthly_cost("t2.micro"), 8.50);
        assert_eq!(estimator.estimate_monthly_cost("r5.large"), 91.00);
        assert_eq!(estimator.estimate_monthly_cost("m5.large"), 70.00);
    }

    #[test]
    fn test_unknown_type_uses_default() {
        let estimator = CostEstimator::new();
        assert_eq!(
            estimator.estimate_monthly_cost("z9.mega"),
            DEFAULT_MONTHLY_COST
        );
        assert_eq!(estimator.estimate_monthly_cost(""), 100.0);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let estimator = CostEstimator::new();
        assert_eq!(
            estimator.estimate_monthly_cost("T2.MICRO"),
            DEFAULT_MONTHLY_COST
        );
    }

    #[test]
    fn test_storage_monthly_cost() {
        let estimator = CostEstimator::new();
        assert!((estimator.storage_monthly_cost(250) - 25.0).abs() < 1e-9);
        assert_eq!(estimator.storage_monthly_cost(0), 0.0);
    }
}
