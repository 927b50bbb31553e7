//! Configuration file support for cloud-audit.
//!
//! Provides YAML-based configuration through `cloud-audit.config.yml` files,
//! including data structures, file loading, and validation.

use anyhow::{bail, Context};
use cloud_audit::application::dto::OutputFormat;
use cloud_audit::audit::checks::RuleCatalog;
use cloud_audit::audit::domain::Severity;
use cloud_audit::audit::policies::{AuditPolicy, Thresholds, DEFAULT_REQUIRED_TAGS};
use cloud_audit::shared::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "cloud-audit.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub region: Option<String>,
    pub snapshot: Option<PathBuf>,
    pub formats: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    pub report_name: Option<String>,
    pub exclude_resources: Option<Vec<String>>,
    pub disabled_checks: Option<Vec<String>>,
    pub fail_on: Option<String>,
    pub required_tags: Option<Vec<String>>,
    pub thresholds: Option<Thresholds>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// Output formats named in the file, if any
    pub fn output_formats(&self) -> Result<Option<Vec<OutputFormat>>> {
        self.formats
            .as_ref()
            .map(|names| {
                OutputFormat::parse_list(names).map_err(|e| {
                    anyhow::anyhow!(
                        "Invalid config: formats: {}\n\n💡 Hint: Use any of json, csv, table.",
                        e
                    )
                })
            })
            .transpose()
    }

    /// Fail-on severity named in the file, if any
    pub fn fail_on_severity(&self) -> Result<Option<Severity>> {
        self.fail_on
            .as_deref()
            .map(|s| {
                s.parse::<Severity>()
                    .map_err(|e| anyhow::anyhow!("Invalid config: fail_on: {}", e))
            })
            .transpose()
    }

    /// Audit policy built from `required_tags` and `thresholds`
    pub fn audit_policy(&self) -> Result<AuditPolicy> {
        let required_tags = self
            .required_tags
            .clone()
            .unwrap_or_else(|| DEFAULT_REQUIRED_TAGS.map(String::from).to_vec());
        AuditPolicy::new(self.thresholds.clone().unwrap_or_default(), required_tags)
            .context("Invalid config")
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(ref disabled) = config.disabled_checks {
        let known = RuleCatalog::standard_names();
        for (i, name) in disabled.iter().enumerate() {
            if !known.contains(&name.as_str()) {
                bail!(
                    "Invalid config: disabled_checks[{}] '{}' is not a known check.\n\n\
                     💡 Hint: Available checks: {}",
                    i,
                    name,
                    known.join(", ")
                );
            }
        }
    }

    if let Some(ref patterns) = config.exclude_resources {
        if let Some(i) = patterns.iter().position(|p| p.trim().is_empty()) {
            bail!(
                "Invalid config: exclude_resources[{}] must not be empty.",
                i
            );
        }
    }

    config.output_formats()?;
    config.fail_on_severity()?;
    config.audit_policy()?;
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "unknown config field");
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
