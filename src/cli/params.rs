//! Parameter parsing utilities for report exports
//!
//! This module provides functions for parsing `-P KEY=VALUE` arguments and
//! parameter files for use with [`ExportRequest`](crate::report::ExportRequest).

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::report::Parameters;

/// Parse CLI parameters in KEY=VALUE format
///
/// Values stay strings exactly as typed; they reach the tool as text anyway.
/// Structured values come from a parameter file.
pub fn parse_cli_params(params: Vec<String>) -> Result<Parameters> {
    let mut result = Parameters::new();

    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            anyhow::bail!("Invalid parameter format: '{}'. Expected KEY=VALUE", param);
        };
        if key.is_empty() {
            anyhow::bail!("Invalid parameter format: '{}'. Key must not be empty", param);
        }

        result.insert(key.to_string(), Value::String(value.to_string()));
    }

    Ok(result)
}

/// Load parameters from a JSON or YAML file
pub async fn load_param_file(path: &Path) -> Result<Parameters> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read parameter file: {}", path.display()))?;

    // Try JSON first
    if let Ok(params) = serde_json::from_str::<Parameters>(&content) {
        return Ok(params);
    }

    serde_yaml::from_str::<Parameters>(&content)
        .with_context(|| format!("Failed to parse parameter file as JSON or YAML: {}", path.display()))
}

/// Merge CLI parameters with file parameters
///
/// CLI parameters take precedence over file parameters
pub fn merge_params(cli_params: Parameters, file_params: Parameters) -> Parameters {
    let mut result = file_params;

    for (key, value) in cli_params {
        result.insert(key, value);
    }

    result
}
