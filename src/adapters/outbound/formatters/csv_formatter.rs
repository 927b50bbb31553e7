use crate::audit::domain::{Finding, Report};
use crate::audit::policies::DEFAULT_REQUIRED_TAGS;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

const FIXED_COLUMNS: [&str; 6] = [
    "Resource Id",
    "Resource Type",
    "Action",
    "Priority",
    "Potential Monthly Savings",
    "Details",
];

/// CsvFormatter adapter: one row per finding
///
/// Fields are quoted per RFC 4180. Tag columns are only filled when a
/// finding covers a single resource; multi-resource findings list their ids
/// separated by `; `.
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn header() -> String {
        FIXED_COLUMNS
            .iter()
            .chain(DEFAULT_REQUIRED_TAGS.iter())
            .map(|column| escape_field(column))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn row(finding: &Finding) -> String {
        let resources = finding.affected_resources();
        let resource_ids = resources
            .iter()
            .map(|r| r.resource_id.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        let mut fields = vec![
            resource_ids,
            finding.resource_type().to_string(),
            finding.action().to_string(),
            finding.severity().to_string(),
            format!("{:.2}", finding.potential_savings()),
            finding.details().to_string(),
        ];

        let single = match resources {
            [only] => Some(only),
            _ => None,
        };
        fields.extend(DEFAULT_REQUIRED_TAGS.iter().map(|tag| {
            single
                .and_then(|r| r.tags.get(*tag))
                .cloned()
                .unwrap_or_default()
        }));

        fields
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for CsvFormatter {
    fn format(&self, report: &Report) -> Result<String> {
        let mut output = Self::header();
        output.push('\n');
        for finding in report.findings() {
            output.push_str(&Self::row(finding));
            output.push('\n');
        }
        Ok(output)
    }
}

/// Quotes a field when it contains a delimiter, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::domain::{AffectedResource, CheckId, ResourceKind, Severity};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn resource(id: &str, tags: &[(&str, &str)]) -> AffectedResource {
        AffectedResource {
            resource_id: id.to_string(),
            kind: ResourceKind::Instance,
            name: id.to_string(),
            message_count: None,
            tags: tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            details: BTreeMap::new(),
        }
    }

    fn finding(resources: Vec<AffectedResource>, details: &str, savings: f64) -> Finding {
        Finding::builder(
            CheckId::ZombieInstance,
            Severity::High,
            Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap(),
        )
        .resource_type("EC2 Instance")
        .action("Terminate or stop the idle instance")
        .affected_resources(resources)
        .details(details)
        .potential_savings(savings)
        .build()
        .unwrap()
    }

    fn report(findings: Vec<Finding>) -> Report {
        Report::new("us-east-1".to_string(), Utc::now(), findings, 0, 0, vec![])
    }

    #[test]
    fn test_header_only_when_empty() {
        let output = CsvFormatter::new().format(&report(vec![])).unwrap();
        assert_eq!(
            output,
            "Resource Id,Resource Type,Action,Priority,Potential Monthly Savings,Details,CostCenter,Environment,Owner,Application\n"
        );
    }

    #[test]
    fn test_one_row_per_finding() {
        let output = CsvFormatter::new()
            .format(&report(vec![
                finding(vec![resource("i-1", &[])], "idle", 8.075),
                finding(
                    vec![resource("i-2", &[]), resource("i-3", &[])],
                    "idle",
                    0.0,
                ),
            ]))
            .unwrap();
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn test_single_resource_row_fills_tags() {
        let output = CsvFormatter::new()
            .format(&report(vec![finding(
                vec![resource("i-1", &[("CostCenter", "cc-42"), ("Owner", "platform")])],
                "idle",
                8.075,
            )]))
            .unwrap();
        let row = output.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "i-1,EC2 Instance,Terminate or stop the idle instance,high,8.07,idle,cc-42,,platform,"
        );
    }

    #[test]
    fn test_multi_resource_row_joins_ids() {
        let output = CsvFormatter::new()
            .format(&report(vec![finding(
                vec![
                    resource("i-1", &[("Owner", "a")]),
                    resource("i-2", &[("Owner", "b")]),
                ],
                "idle",
                0.0,
            )]))
            .unwrap();
        let row = output.lines().nth(1).unwrap();
        assert!(row.starts_with("i-1; i-2,"));
        assert!(row.ends_with(",,,,"));
    }

    #[test]
    fn test_fields_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }
}
