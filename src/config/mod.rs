//! Service configuration.
//!
//! [`ServiceConfig`] carries the few knobs the report service needs. It can be
//! built in code, loaded from a TOML file, and overridden from environment
//! variables. Only the binary calls [`ServiceConfig::merge_env_vars`]; the
//! library itself never reads the environment.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ErrorCode, JasperError, Result};

/// Location of the bundled tool relative to the installation directory
pub const BUNDLED_JASPER_PATH: &str = "jasper/bin/jasper";

pub const ENV_JASPER_BINARY: &str = "JASPER_EXPORT_BINARY";
pub const ENV_JAVA_BINARY: &str = "JASPER_EXPORT_JAVA";
pub const ENV_EXECUTION: &str = "JASPER_EXPORT_EXECUTION";

/// How the assembled command reaches the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Hand the escaped command line to `sh -c` (`cmd /C` on Windows)
    #[default]
    Shell,
    /// Spawn the tool directly with an argument vector
    Direct,
}

impl std::str::FromStr for ExecutionMode {
    type Err = JasperError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "shell" => Ok(Self::Shell),
            "direct" => Ok(Self::Direct),
            other => Err(JasperError::config(format!(
                "unknown execution mode '{other}', expected 'shell' or 'direct'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Override for the JasperReports executable
    pub jasper_binary_path: Option<PathBuf>,
    /// Reserved, not read by the service
    pub base_path: Option<PathBuf>,
    /// Java executable used for the pre-flight probe
    pub java_binary: String,
    pub execution: ExecutionMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jasper_binary_path: None,
            base_path: None,
            java_binary: "java".to_string(),
            execution: ExecutionMode::Shell,
        }
    }
}

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jasper_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.jasper_binary_path = Some(path.into());
        self
    }

    pub fn with_java_binary(mut self, java: impl Into<String>) -> Self {
        self.java_binary = java.into();
        self
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a configuration file; a missing file yields the defaults
    ///
    /// A path whose existence cannot be checked is an error, not "missing".
    pub async fn load(path: &Path) -> Result<Self> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|e| JasperError::config_file(ErrorCode::CONFIG_GENERIC, path, e))?;
        if !exists {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| JasperError::config_file(ErrorCode::CONFIG_GENERIC, path, e))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| JasperError::config_file(ErrorCode::CONFIG_PARSE_ERROR, path, e))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn merge_env_vars(&mut self) -> Result<()> {
        self.merge_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup(ENV_JASPER_BINARY).filter(|v| !v.is_empty()) {
            self.jasper_binary_path = Some(PathBuf::from(binary));
        }

        if let Some(java) = lookup(ENV_JAVA_BINARY).filter(|v| !v.is_empty()) {
            self.java_binary = java;
        }

        if let Some(mode) = lookup(ENV_EXECUTION).filter(|v| !v.is_empty()) {
            self.execution = mode.parse()?;
        }

        Ok(())
    }

    /// Resolve the tool path, falling back to the bundled binary
    pub fn resolve_jasper_path(&self) -> PathBuf {
        match &self.jasper_binary_path {
            Some(path) => path.clone(),
            None => install_dir().join(BUNDLED_JASPER_PATH),
        }
    }
}

/// Directory holding the running executable
fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Default configuration file location for the binary
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("io", "jasper-export", "jasper-export")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
