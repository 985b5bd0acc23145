//! Configuration management for detailer
//!
//! Config stored at: ~/.config/detailer/config.json

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use detailer_domain::service::analytics::DEFAULT_ANALYTICS_WINDOW_DAYS;
use detailer_domain::service::similarity::DEFAULT_SIMILAR_LIMIT;
use detailer_types::{Caller, ConfigError, OutputFormat, Result, Role, SimilarityMethod};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Store directory override
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Similarity strategy used when a call does not pick one
    #[serde(default)]
    pub similarity_strategy: SimilarityMethod,

    /// Number of similar assessments returned by default
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,

    /// Trailing window for revenue analytics
    #[serde(default = "default_analytics_window_days")]
    pub analytics_window_days: u32,

    /// Subjects allowed to change the pricing model
    #[serde(default)]
    pub admins: Vec<String>,

    /// Shop staff subjects; everyone else is a customer
    #[serde(default)]
    pub operators: Vec<String>,

    /// External vehicle analyzer command line (optional)
    #[serde(default)]
    pub analyzer_command: Option<String>,

    #[serde(default = "default_analyzer_timeout_secs")]
    pub analyzer_timeout_secs: u64,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_similar_limit() -> usize {
    DEFAULT_SIMILAR_LIMIT
}

fn default_analytics_window_days() -> u32 {
    DEFAULT_ANALYTICS_WINDOW_DAYS
}

fn default_analyzer_timeout_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            output_format: default_output_format(),
            similarity_strategy: SimilarityMethod::default(),
            similar_limit: default_similar_limit(),
            analytics_window_days: default_analytics_window_days(),
            admins: Vec::new(),
            operators: Vec::new(),
            analyzer_command: None,
            analyzer_timeout_secs: default_analyzer_timeout_secs(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("detailer");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the store directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let store_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("detailer");
        Ok(store_dir)
    }

    pub fn analyzer_timeout(&self) -> Duration {
        Duration::from_secs(self.analyzer_timeout_secs.max(1))
    }

    /// Resolve the role of an identity from the admin and operator lists
    pub fn caller_for(&self, subject: &str) -> Caller {
        let subject = subject.trim();
        let role = if self.admins.iter().any(|a| a == subject) {
            Role::Admin
        } else if self.operators.iter().any(|o| o == subject) {
            Role::Operator
        } else {
            Role::Customer
        };
        Caller::new(subject, role)
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Detailer Configuration")?;
        writeln!(f, "======================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Store dir:           {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Output format:       {}", self.output_format)?;
        writeln!(f, "Similarity strategy: {}", self.similarity_strategy)?;
        writeln!(f, "Similar limit:       {}", self.similar_limit)?;
        writeln!(f, "Analytics window:    {} days", self.analytics_window_days)?;
        writeln!(
            f,
            "Admins:              {}",
            if self.admins.is_empty() {
                "(none)".to_string()
            } else {
                self.admins.join(", ")
            }
        )?;
        writeln!(
            f,
            "Operators:           {}",
            if self.operators.is_empty() {
                "(none)".to_string()
            } else {
                self.operators.join(", ")
            }
        )?;
        writeln!(
            f,
            "Analyzer command:    {}",
            self.analyzer_command.as_deref().unwrap_or("(not set)")
        )?;
        writeln!(f, "Analyzer timeout:    {}s", self.analyzer_timeout_secs)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:         {}", path.display())?;
        }

        Ok(())
    }
}
