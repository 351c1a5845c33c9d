use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};

/// Browse URL prefix that issue keys are appended to.
pub const DEFAULT_ISSUE_BASE_URL: &str = "https://my-lex.atlassian.net/browse/";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Time-accounting reports from a tracker CSV export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "jira-report",
    about = "Time-accounting reports from a tracker CSV export",
    version
)]
pub struct Settings {
    /// CSV export to read
    pub csv_file: Option<PathBuf>,

    /// Base URL that issue keys are appended to
    #[arg(long, default_value = DEFAULT_ISSUE_BASE_URL)]
    pub issue_base_url: String,

    /// Column width for assignee names in console output (1-64)
    #[arg(long, default_value = "12", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub assignee_width: u16,

    /// Write the HTML report to this file
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Write the report as JSON to this file ("-" for stdout)
    #[arg(long)]
    pub json: Option<String>,

    /// Serve the HTML report over HTTP after ingesting
    #[arg(long)]
    pub serve: bool,

    /// Address to bind in serve mode
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind in serve mode
    #[arg(long, default_value = "5000")]
    pub port: u16,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.jira-report/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_width: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".jira-report").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge with last-used params where no explicit
    /// CLI value was provided, then persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit arguments and
    /// config path, so tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("Could not clear {}: {}", config_path.display(), e);
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "issue_base_url") {
            if let Some(v) = last.issue_base_url {
                settings.issue_base_url = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "assignee_width") {
            if let Some(v) = last.assignee_width {
                settings.assignee_width = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "host") {
            if let Some(v) = last.host {
                settings.host = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "port") {
            if let Some(v) = last.port {
                settings.port = v;
            }
        }

        settings = Self::apply_debug(settings);

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::debug!("Could not persist settings: {}", e);
        }

        settings
    }

    /// The CSV path to ingest; a configuration error when none was given.
    pub fn input_path(&self) -> Result<&Path> {
        self.csv_file
            .as_deref()
            .ok_or_else(|| ReportError::Config("no CSV file selected".to_string()))
    }

    /// `host:port` for serve mode.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            issue_base_url: Some(s.issue_base_url.clone()),
            assignee_width: Some(s.assignee_width),
            host: Some(s.host.clone()),
            port: Some(s.port),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            issue_base_url: Some("https://tracker.example/browse/".to_string()),
            assignee_width: Some(20),
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(
            loaded.issue_base_url.as_deref(),
            Some("https://tracker.example/browse/")
        );
        assert_eq!(loaded.assignee_width, Some(20));
        assert_eq!(loaded.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(loaded.port, Some(8080));
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).port.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(LastUsedParams::load_from(&path).issue_base_url.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["jira-report"]);

        assert!(settings.csv_file.is_none());
        assert_eq!(settings.issue_base_url, DEFAULT_ISSUE_BASE_URL);
        assert_eq!(settings.assignee_width, 12);
        assert!(settings.html.is_none());
        assert!(settings.json.is_none());
        assert!(!settings.serve);
        assert_eq!(settings.bind_address(), "127.0.0.1:5000");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_positional_csv_file() {
        let settings = Settings::parse_from(["jira-report", "export.csv", "--html", "out.html"]);
        assert_eq!(settings.input_path().unwrap(), Path::new("export.csv"));
        assert_eq!(settings.html, Some(PathBuf::from("out.html")));
    }

    #[test]
    fn test_input_path_missing_is_config_error() {
        let settings = Settings::parse_from(["jira-report"]);
        assert!(matches!(settings.input_path(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_assignee_width_range_is_enforced() {
        assert!(Settings::try_parse_from(["jira-report", "--assignee-width", "0"]).is_err());
        assert!(Settings::try_parse_from(["jira-report", "--assignee-width", "65"]).is_err());
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            port: Some(9000),
            assignee_width: Some(16),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["jira-report".into()], &config_path);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.assignee_width, 16);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            port: Some(9000),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["jira-report".into(), "--port".into(), "7000".into()],
            &config_path,
        );
        assert_eq!(settings.port, 7000);
        assert_eq!(LastUsedParams::load_from(&config_path).port, Some(7000));
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");
        assert!(config_path.exists());

        Settings::load_with_last_used_impl(
            vec!["jira-report".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["jira-report".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
