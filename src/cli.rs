use clap::Parser;
use cloud_audit::application::dto::OutputFormat;
use cloud_audit::audit::domain::Severity;
use std::path::PathBuf;

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.trim().parse()
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    value.parse()
}

/// Audit AWS compute and messaging resources for cost and compliance issues
#[derive(Parser, Debug)]
#[command(name = "cloud-audit")]
#[command(version)]
#[command(
    about = "Audit AWS compute and messaging resources for cost and compliance issues",
    long_about = None
)]
pub struct Args {
    /// Inventory snapshot document to audit
    #[arg(short, long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Region (scope) the snapshot was captured for [default: us-east-1]
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Output formats, comma separated: json, csv, table [default: json,csv,table]
    #[arg(short, long, value_name = "FMT", value_delimiter = ',', value_parser = parse_format)]
    pub format: Vec<OutputFormat>,

    /// Directory for the JSON and CSV artifacts [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Base file name of the artifacts [default: audit-report]
    #[arg(long, value_name = "NAME")]
    pub report_name: Option<String>,

    /// Exclude resources whose id matches the pattern (supports wildcards: *)
    /// Can be specified multiple times: -e "i-legacy-*" -e "*-sandbox"
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Exit with code 1 when a finding at or above this severity is reported
    #[arg(long, value_name = "SEVERITY", value_parser = parse_severity)]
    pub fail_on: Option<Severity>,

    /// Config file (defaults to ./cloud-audit.config.yml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only print warnings and errors to stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("cloud-audit").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults_are_unset() {
        let args = parse(&[]).unwrap();
        assert!(args.snapshot.is_none());
        assert!(args.format.is_empty());
        assert!(args.fail_on.is_none());
        assert!(args.exclude.is_empty());
        assert!(!args.quiet);
    }

    #[test]
    fn test_format_list() {
        let args = parse(&["-f", "json,table"]).unwrap();
        assert_eq!(args.format, vec![OutputFormat::Json, OutputFormat::Table]);
    }

    #[test]
    fn test_invalid_format_rejected() {
        let err = parse(&["--format", "xml"]).unwrap_err();
        assert!(err.to_string().contains("Invalid format"));
    }

    #[test]
    fn test_fail_on_severity() {
        let args = parse(&["--fail-on", "HIGH"]).unwrap();
        assert_eq!(args.fail_on, Some(Severity::High));
        assert!(parse(&["--fail-on", "urgent"]).is_err());
    }

    #[test]
    fn test_repeated_excludes() {
        let args = parse(&["-s", "snap.json", "-e", "i-1", "--exclude", "vol-*"]).unwrap();
        assert_eq!(args.snapshot, Some(PathBuf::from("snap.json")));
        assert_eq!(args.exclude, vec!["i-1".to_string(), "vol-*".to_string()]);
    }
}
