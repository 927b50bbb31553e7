mod cli;
mod config;

use cli::Args;
use cloud_audit::adapters::outbound::console::StderrProgressReporter;
use cloud_audit::adapters::outbound::filesystem::SnapshotFileCollector;
use cloud_audit::application::dto::{AuditRequest, AuditResponse, OutputFormat};
use cloud_audit::application::factories::{presenter_type_for, FormatterFactory, PresenterFactory};
use cloud_audit::application::use_cases::RunAuditUseCase;
use cloud_audit::audit::domain::Severity;
use cloud_audit::shared::error::{AuditError, ExitCode};
use cloud_audit::shared::Result;
use config::ConfigFile;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_REPORT_NAME: &str = "audit-report";

/// Effective settings after merging CLI flags over the config file
#[derive(Debug)]
struct Settings {
    snapshot: PathBuf,
    formats: Vec<OutputFormat>,
    output_dir: PathBuf,
    report_name: String,
    fail_on: Option<Severity>,
    quiet: bool,
    request: AuditRequest,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse_args();

    let exit_code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            // Display error chain
            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("\nCaused by: {}", err);
                source = err.source();
            }

            eprintln!();
            ExitCode::ApplicationError
        }
    };

    process::exit(exit_code.as_i32());
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let settings = merge_settings(args, config.unwrap_or_default())?;
    validate_output_dir(&settings.output_dir, &settings.formats)?;

    tracing::debug!(?settings, "effective settings");

    let progress_reporter = if settings.quiet {
        StderrProgressReporter::quiet()
    } else {
        StderrProgressReporter::new()
    };
    let use_case = RunAuditUseCase::new(
        SnapshotFileCollector::new(settings.snapshot.clone()),
        progress_reporter,
    );

    let response = use_case.execute(settings.request.clone()).await?;
    write_reports(&settings, &response)?;

    if response.should_fail(settings.fail_on) {
        if let Some(threshold) = settings.fail_on {
            eprintln!(
                "\n⚠️  Findings at or above '{}' severity were reported.",
                threshold
            );
        }
        return Ok(ExitCode::FindingsAboveThreshold);
    }

    Ok(ExitCode::Success)
}

fn load_config(args: &Args) -> Result<Option<ConfigFile>> {
    match &args.config {
        Some(path) => config::load_config_from_path(path).map(Some),
        None => config::discover_config(Path::new(".")),
    }
}

fn merge_settings(args: Args, config: ConfigFile) -> Result<Settings> {
    let config_formats = config.output_formats()?;
    let config_fail_on = config.fail_on_severity()?;
    let policy = config.audit_policy()?;

    let snapshot = args.snapshot.or(config.snapshot).ok_or_else(|| {
        anyhow::anyhow!(
            "No snapshot given.\n\n💡 Hint: Pass --snapshot <PATH> or set `snapshot` in {}",
            config::CONFIG_FILENAME
        )
    })?;

    let formats = if args.format.is_empty() {
        config_formats.unwrap_or_else(|| OutputFormat::ALL.to_vec())
    } else {
        // Re-parse to drop duplicates
        OutputFormat::parse_list(args.format.iter().map(|f| f.to_string()))
            .map_err(|e| anyhow::anyhow!(e))?
    };

    let report_name = args
        .report_name
        .or(config.report_name)
        .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string());
    validate_report_name(&report_name)?;

    let scope = args
        .region
        .or(config.region)
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    let mut exclude_patterns = config.exclude_resources.unwrap_or_default();
    exclude_patterns.extend(args.exclude);

    let request = AuditRequest::new(
        scope,
        exclude_patterns,
        config.disabled_checks.unwrap_or_default(),
        policy,
    );

    Ok(Settings {
        snapshot,
        formats,
        output_dir: args
            .output_dir
            .or(config.output_dir)
            .unwrap_or_else(|| PathBuf::from(".")),
        report_name,
        fail_on: args.fail_on.or(config_fail_on),
        quiet: args.quiet,
        request,
    })
}

fn validate_report_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AuditError::Validation {
            message: format!(
                "Invalid report name '{}': use a plain file name without directories",
                name
            ),
        }
        .into());
    }
    Ok(())
}

/// Output directory must exist when a file artifact is requested
fn validate_output_dir(path: &Path, formats: &[OutputFormat]) -> Result<()> {
    if formats.iter().all(|f| f.file_extension().is_none()) {
        return Ok(());
    }

    let metadata = std::fs::symlink_metadata(path).map_err(|e| AuditError::InvalidOutputDirectory {
        path: path.to_path_buf(),
        reason: format!("Failed to read path metadata: {}", e),
    })?;

    if metadata.is_symlink() {
        return Err(AuditError::InvalidOutputDirectory {
            path: path.to_path_buf(),
            reason: "Security: Output directory is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !metadata.is_dir() {
        return Err(AuditError::InvalidOutputDirectory {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}

/// Renders every requested format; files first, the console table last
fn write_reports(settings: &Settings, response: &AuditResponse) -> Result<()> {
    let mut ordered = settings.formats.clone();
    ordered.sort_by_key(|f| f.file_extension().is_none());

    for format in ordered {
        if !settings.quiet {
            eprintln!("{}", FormatterFactory::progress_message(format));
        }
        let output = FormatterFactory::create(format).format(&response.report)?;
        let presenter = PresenterFactory::create(presenter_type_for(
            &settings.output_dir,
            &settings.report_name,
            format,
        ));
        presenter.present(&output)?;
    }

    Ok(())
}
