//! Configuration file management.
//!
//! Loads, parses, and merges configuration from TOML files and command-line
//! arguments. Settings can be specified in multiple places with clear
//! precedence rules.
//!
//! # Configuration Precedence
//!
//! 1. Default values (lowest priority)
//! 2. Configuration file (certsweep.toml or specified with --config)
//! 3. Command-line arguments (highest priority)
//!
//! # Example Configuration File
//!
//! ```toml
//! domains_file = "domains.txt"
//! threshold = 30
//! port = 443
//! workers = 10
//! output = "summary"
//!
//! [prometheus]
//! enabled = true
//! address = "http://localhost:9091"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure.
///
/// All fields are optional to support partial configuration and merging.
/// Missing values will be filled in by defaults or overridden by CLI
/// arguments.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Domains to check, inline
    pub domains: Option<Vec<String>>,
    /// Path to a file with one domain per line (blank lines ignored)
    pub domains_file: Option<String>,
    /// Days threshold to consider a certificate as expiring soon
    pub threshold: Option<i64>,
    /// TLS port to check
    pub port: Option<u16>,
    /// Number of concurrent workers
    pub workers: Option<usize>,
    /// Output format: summary, json
    pub output: Option<String>,
    /// Path to write structured log lines to
    pub log_file: Option<String>,
    /// Prometheus configuration
    pub prometheus: Option<PrometheusConfig>,
}

/// Prometheus integration configuration.
///
/// Controls whether metrics are pushed to a Prometheus Push Gateway
/// and specifies the gateway address.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PrometheusConfig {
    /// Enable prometheus metrics pushing
    pub enabled: Option<bool>,
    /// Prometheus push gateway address (e.g., "http://localhost:9091")
    pub address: Option<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully parsed configuration
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - File contains invalid TOML
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;

        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        Ok(config)
    }

    /// Creates a default configuration with sensible defaults.
    ///
    /// # Default Values
    ///
    /// - `domains`/`domains_file`: None (must be provided)
    /// - `threshold`: 15 days
    /// - `port`: 443
    /// - `workers`: 10
    /// - `output`: "summary"
    /// - `prometheus.enabled`: false
    /// - `prometheus.address`: "http://localhost:9091"
    pub fn default() -> Self {
        Config {
            domains: None,
            domains_file: None,
            threshold: Some(crate::DEFAULT_THRESHOLD),
            port: Some(crate::DEFAULT_PORT),
            workers: Some(crate::DEFAULT_WORKERS),
            output: Some("summary".to_string()),
            log_file: None,
            prometheus: Some(PrometheusConfig {
                enabled: Some(false),
                address: Some("http://localhost:9091".to_string()),
            }),
        }
    }

    /// Merges this configuration with another, prioritizing the other's
    /// values.
    ///
    /// For each field, if the `other` config has a value (Some), it overrides
    /// this config's value. If the `other` value is None, keeps the current
    /// value.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.domains.is_some() {
            self.domains = other.domains;
        }
        if other.domains_file.is_some() {
            self.domains_file = other.domains_file;
        }
        if other.threshold.is_some() {
            self.threshold = other.threshold;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.workers.is_some() {
            self.workers = other.workers;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.log_file.is_some() {
            self.log_file = other.log_file;
        }
        if let Some(other_prom) = other.prometheus {
            if let Some(ref mut self_prom) = self.prometheus {
                if other_prom.enabled.is_some() {
                    self_prom.enabled = other_prom.enabled;
                }
                if other_prom.address.is_some() {
                    self_prom.address = other_prom.address;
                }
            } else {
                self.prometheus = Some(other_prom);
            }
        }
        self
    }

    /// Creates a Config from command-line arguments for merging.
    ///
    /// Only provided arguments (Some values) will override other
    /// configurations.
    #[allow(clippy::too_many_arguments)]
    pub fn from_cli_args(
        domains_file: Option<String>,
        threshold: Option<i64>,
        port: Option<u16>,
        workers: Option<usize>,
        output: Option<String>,
        log_file: Option<String>,
        prometheus: Option<bool>,
        prometheus_address: Option<String>,
    ) -> Self {
        Config {
            domains: None,
            domains_file,
            threshold,
            port,
            workers,
            output,
            log_file,
            prometheus: Some(PrometheusConfig {
                enabled: prometheus,
                address: prometheus_address,
            }),
        }
    }

    /// Generates an example configuration file in TOML format.
    ///
    /// Creates a sample configuration with all available options set to
    /// example values. Useful for bootstrapping a new configuration file.
    pub fn example_toml() -> String {
        let example = Config {
            domains: Some(vec!["example.com".to_string(), "github.com".to_string()]),
            domains_file: Some("domains.txt".to_string()),
            threshold: Some(30),
            port: Some(443),
            workers: Some(10),
            output: Some("summary".to_string()),
            log_file: Some("certsweep.log".to_string()),
            prometheus: Some(PrometheusConfig {
                enabled: Some(true),
                address: Some("http://localhost:9091".to_string()),
            }),
        };

        toml::to_string_pretty(&example)
            .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

/// Errors that can occur during configuration loading and parsing.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    Io(String),
    /// TOML parsing error (invalid syntax, type mismatch, etc.)
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "IO Error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Parse Error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
