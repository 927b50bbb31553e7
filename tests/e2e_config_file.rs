/// End-to-end tests for config file loading and CLI option merging.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to report artifacts, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture_snapshot() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample-snapshot.json")
}

/// Write a config file at the specified path.
fn write_config(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

/// Config pointing at the fixture snapshot, plus extra YAML lines.
fn config_with_snapshot(extra: &str) -> String {
    format!(
        "snapshot: {}\nregion: us-east-1\n{}",
        fixture_snapshot().display(),
        extra
    )
}

fn read_findings(path: &Path) -> Vec<serde_json::Value> {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    json["findings"].as_array().unwrap().clone()
}

fn has_check(findings: &[serde_json::Value], check_id: &str) -> bool {
    findings.iter().any(|f| f["check_id"] == check_id)
}

// ============================================================================
// Config File Auto-Discovery Tests
// ============================================================================

mod auto_discovery_tests {
    use super::*;

    #[test]
    fn test_config_discovered_in_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [json]\nreport_name: discovered\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .success();

        let findings = read_findings(&temp_dir.path().join("discovered.json"));
        assert_eq!(findings.len(), 9);
        assert!(!temp_dir.path().join("discovered.csv").exists());
    }

    #[test]
    fn test_explicit_config_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("custom.yml");
        write_config(
            &config_path,
            &config_with_snapshot(&format!(
                "formats: [json]\noutput_dir: {}\n",
                temp_dir.path().display()
            )),
        );

        cargo_bin_cmd!("cloud-audit")
            .arg("-c")
            .arg(&config_path)
            .assert()
            .success();

        assert!(temp_dir.path().join("audit-report.json").exists());
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        cargo_bin_cmd!("cloud-audit")
            .args(["-c", "/nonexistent/cloud-audit.config.yml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to read config file"));
    }
}

// ============================================================================
// Config Content Tests
// ============================================================================

mod config_content_tests {
    use super::*;

    #[test]
    fn test_unknown_field_warns_but_runs() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [table]\nunknown_option: true\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .success()
            .stderr(predicate::str::contains(
                "Unknown config field 'unknown_option' will be ignored",
            ));
    }

    #[test]
    fn test_invalid_disabled_check_fails() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("disabled_checks: [zombie_instance, not_a_check]\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains(
                "disabled_checks[1] 'not_a_check' is not a known check",
            ));
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            "formats: [json\n",
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to parse config file"));
    }

    #[test]
    fn test_disabled_checks_and_required_tags_apply() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot(
                "formats: [json]\ndisabled_checks: [zombie_instance]\nrequired_tags: [CostCenter]\n",
            ),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .success();

        let findings = read_findings(&temp_dir.path().join("audit-report.json"));
        assert!(!has_check(&findings, "zombie_instance"));
        assert!(!has_check(&findings, "untagged_instance"));
        assert!(has_check(&findings, "oversized_memory"));
    }

    #[test]
    fn test_thresholds_override_defaults() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot(
                "formats: [json]\nthresholds:\n  memory_utilization_percent: 20\n",
            ),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .success();

        // 25% memory is no longer under the limit
        let findings = read_findings(&temp_dir.path().join("audit-report.json"));
        assert!(!has_check(&findings, "oversized_memory"));
    }

    #[test]
    fn test_fail_on_from_config() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [table]\nfail_on: medium\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .assert()
            .code(1);
    }
}

// ============================================================================
// CLI Override Tests
// ============================================================================

mod cli_override_tests {
    use super::*;

    #[test]
    fn test_cli_fail_on_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [table]\nfail_on: low\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .args(["--fail-on", "critical"])
            .assert()
            .code(0);
    }

    #[test]
    fn test_cli_format_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [json]\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .args(["-f", "csv"])
            .assert()
            .success();

        assert!(temp_dir.path().join("audit-report.csv").exists());
        assert!(!temp_dir.path().join("audit-report.json").exists());
    }

    #[test]
    fn test_exclusions_are_merged() {
        let temp_dir = TempDir::new().unwrap();
        write_config(
            &temp_dir.path().join("cloud-audit.config.yml"),
            &config_with_snapshot("formats: [json]\nexclude_resources: [\"i-0zombie*\"]\n"),
        );

        cargo_bin_cmd!("cloud-audit")
            .current_dir(temp_dir.path())
            .args(["-e", "vol-*"])
            .assert()
            .success();

        let findings = read_findings(&temp_dir.path().join("audit-report.json"));
        assert!(!has_check(&findings, "zombie_instance"));
        assert!(!has_check(&findings, "inefficient_storage"));
        assert!(has_check(&findings, "oversized_memory"));
    }
}
