use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::duration::DurationStr;
use crate::error::{CoreError, Result};

/// Locations searched, in order, when no explicit config path is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["/etc/elastalert/config.yaml", "config.yaml"];

/// The only rules loader this build ships.
pub const FILE_RULES_LOADER: &str = "FileRulesLoader";

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ── Top-level config ──────────────────────────────────────────

/// Process configuration for the alerter.
///
/// Every field has a default, so a missing or partial config file still
/// yields a usable value. Unknown keys are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Search backend connection. Only consumed by evaluators.
    /// Base URL of form http://ipaddr:port with no trailing slash.
    pub es_url: String,
    pub verify_certs: bool,
    /// Client certificate (PEM).
    pub cert_pem: String,
    /// Client key (PEM).
    pub key_pem: String,
    pub ca_cert: String,
    pub es_username: String,
    pub es_password: String,
    /// GET, POST or source.
    pub es_send_get_body_as: String,
    /// Seconds.
    pub es_conn_timeout: u64,

    // Rule loading.
    pub rules_loader: String,
    pub rules_folder: PathBuf,
    pub scan_subdirectories: bool,
    pub rules_suffix: String,
    pub parallel_scan: bool,
    /// Also load dotfiles and rules under dot-directories.
    pub scan_hidden: bool,
    pub scan_concurrency: usize,
    pub load_concurrency: usize,

    // Scheduling and query windows.
    pub buffer_time: DurationStr,
    pub run_every: DurationStr,
    pub writeback_index: String,
    pub writeback_alias: String,
    pub max_query_size: u32,
    /// 0 means unlimited.
    pub max_scrolling_count: u32,
    pub scroll_keepalive: DurationStr,
    pub max_aggregation: u32,
    pub old_query_limit: DurationStr,
    pub alert_time_limit: DurationStr,
    pub disable_rules_on_error: bool,
    pub show_disabled_rules: bool,

    // Alerting.
    pub notify_email: Vec<String>,
    pub from_addr: String,
    pub smtp_host: String,
    pub email_reply_to: Vec<String>,

    // Misc.
    pub replace_dots_in_field_names: bool,
    pub string_multi_field_name: String,
    pub add_metadata_alert: bool,
    pub skip_invalid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            es_url: String::new(),
            verify_certs: false,
            cert_pem: String::new(),
            key_pem: String::new(),
            ca_cert: String::new(),
            es_username: String::new(),
            es_password: String::new(),
            es_send_get_body_as: "GET".to_string(),
            es_conn_timeout: 20,

            rules_loader: FILE_RULES_LOADER.to_string(),
            rules_folder: PathBuf::from("rules"),
            scan_subdirectories: true,
            rules_suffix: "yaml".to_string(),
            parallel_scan: false,
            scan_hidden: false,
            scan_concurrency: 1000,
            load_concurrency: 16,

            buffer_time: DurationStr::default(),
            run_every: DurationStr::from("1m"),
            writeback_index: String::new(),
            writeback_alias: String::new(),
            max_query_size: 10_000,
            max_scrolling_count: 0,
            scroll_keepalive: DurationStr::default(),
            max_aggregation: 10_000,
            old_query_limit: DurationStr::from("7d"),
            alert_time_limit: DurationStr::default(),
            disable_rules_on_error: true,
            show_disabled_rules: true,

            notify_email: Vec::new(),
            from_addr: String::new(),
            smtp_host: String::new(),
            email_reply_to: Vec::new(),

            replace_dots_in_field_names: false,
            string_multi_field_name: String::new(),
            add_metadata_alert: false,
            skip_invalid: false,
        }
    }
}

impl Config {
    /// Load config from `explicit` if given, otherwise from the first of
    /// [`DEFAULT_CONFIG_PATHS`] that exists, otherwise defaults.
    ///
    /// `.env` is read first and `ELASTALERT_*` environment overrides are
    /// applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        load_dotenv();

        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match DEFAULT_CONFIG_PATHS.iter().map(Path::new).find(|p| p.is_file()) {
                Some(path) => Self::from_file(path)?,
                None => {
                    tracing::info!("no config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(env_opt);
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml(&contents)?;
        tracing::info!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parse config from YAML text. An empty document yields defaults.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Apply `ELASTALERT_*` overrides using `lookup` to read variables.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("ELASTALERT_RULES_FOLDER") {
            self.rules_folder = PathBuf::from(v);
        }
        if let Some(v) = lookup("ELASTALERT_RUN_EVERY") {
            self.run_every = DurationStr::from(v);
        }
        if let Some(v) = lookup("ELASTALERT_ES_URL") {
            self.es_url = v;
        }
        if let Some(v) = lookup("ELASTALERT_RULES_SUFFIX") {
            self.rules_suffix = v;
        }
        if let Some(v) = lookup("ELASTALERT_SCAN_SUBDIRECTORIES") {
            match parse_bool(&v) {
                Some(b) => self.scan_subdirectories = b,
                None => tracing::warn!(value = %v, "ignoring invalid ELASTALERT_SCAN_SUBDIRECTORIES"),
            }
        }
    }

    /// Check the settings the process cannot start without.
    pub fn validate(&self) -> Result<()> {
        if self.rules_loader != FILE_RULES_LOADER {
            return Err(CoreError::Config(format!(
                "rules loader '{}' not supported",
                self.rules_loader
            )));
        }
        let every = self.run_every.to_duration()?;
        if every.is_zero() {
            return Err(CoreError::Config("run_every must be greater than zero".to_string()));
        }
        if self.load_concurrency == 0 || self.scan_concurrency == 0 {
            return Err(CoreError::Config(
                "load_concurrency and scan_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  backend:  url={}, verify_certs={}, auth={}",
            if self.es_url.is_empty() { "(none)" } else { &self.es_url },
            self.verify_certs,
            !self.es_username.is_empty()
        );
        tracing::info!(
            "  rules:    folder={}, suffix={}, descend={}, parallel_scan={}",
            self.rules_folder.display(),
            self.rules_suffix,
            self.scan_subdirectories,
            self.parallel_scan
        );
        tracing::info!(
            "  schedule: run_every={}, buffer_time={}",
            self.run_every,
            if self.buffer_time.is_empty() { "(none)" } else { self.buffer_time.as_str() }
        );
    }
}
