use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ir::Language;
use crate::rules::policy::Policy;
use crate::rules::Severity;
use crate::scan::ScanSettings;

/// File name looked up in the scan root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = ".securescan.toml";

/// Top-level configuration from `.securescan.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub policy: Policy,
}

/// `[scan]` table. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScanSection {
    pub languages: Option<Vec<Language>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub concurrency: Option<usize>,
    pub min_severity: Option<Severity>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Scan settings from this file, without CLI overrides.
    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            languages: self.scan.languages.clone(),
            exclude_dirs: self.scan.exclude_dirs.clone(),
            concurrency: self.scan.concurrency,
            min_severity: self.scan.min_severity,
        }
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# securescan configuration

[scan]
# Languages to scan (javascript, typescript, python, go). Omit for all.
# languages = ["python", "go"]

# Directory names skipped anywhere in the tree.
exclude_dirs = ["node_modules", "vendor", ".git", "dist", "build"]

# Worker threads. 0 or unset picks one per CPU (at least two).
# concurrency = 4

# Drop findings below this severity (info, low, medium, high, critical).
# min_severity = "low"

[policy]
# Minimum severity that fails the scan with exit code 2.
fail_on = "high"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_default() {
        let config = Config::load(Path::new("/no/such/.securescan.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn starter_parses() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config.policy.fail_on, Some(Severity::High));
        assert_eq!(config.scan.exclude_dirs.as_ref().map(Vec::len), Some(5));
        assert_eq!(config.scan.languages, None);
    }

    #[test]
    fn loads_all_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[scan]
languages = ["python", "go"]
exclude_dirs = ["third_party"]
concurrency = 3
min_severity = "medium"

[policy]
fail_on = "critical"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let settings = config.scan_settings();
        assert_eq!(settings.languages, Some(vec![Language::Python, Language::Go]));
        assert_eq!(settings.exclude_dirs, Some(vec!["third_party".to_string()]));
        assert_eq!(settings.concurrency, Some(3));
        assert_eq!(settings.min_severity, Some(Severity::Medium));
        assert_eq!(config.policy.fail_on, Some(Severity::Critical));
    }

    #[test]
    fn bad_values_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[scan]\nlanguages = [\"cobol\"]\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ScanError::Toml(_))));
    }
}
