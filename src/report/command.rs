//! Command-line construction for the JasperReports tool.
//!
//! Everything here is pure: no filesystem access and no process spawning.
//! The shell form follows the tool's historic grammar
//!
//! ```text
//! "<tool>" process "<artifact>" -o "<outputDir>" -f <format> -P <params><db>
//! ```
//!
//! while [`process_args`] produces the same invocation as an argument vector.

use serde_json::Value;
use std::path::{Path, PathBuf};

use super::{DatabaseDescriptor, ExportRequest, Parameters};
use crate::error::{JasperError, Result};

pub const TEMPLATE_EXTENSION: &str = "jrxml";
pub const COMPILED_EXTENSION: &str = "jasper";
pub const DEFAULT_FORMAT: &str = "pdf";

/// True when the path names an uncompiled `.jrxml` template
pub fn is_template(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION)
}

/// Path of the compiled artifact the tool will read
///
/// Templates get their extension swapped for `.jasper`; anything else is
/// passed through unchanged.
pub fn effective_report_path(source: &Path) -> PathBuf {
    if is_template(source) {
        source.with_extension(COMPILED_EXTENSION)
    } else {
        source.to_path_buf()
    }
}

/// Directory the compile step writes into
pub fn compile_output_dir(template: &Path) -> PathBuf {
    match template.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Text form of a parameter value before escaping
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        // null, arrays and objects go out as JSON
        other => other.to_string(),
    }
}

/// Escape text for the inside of a double-quoted shell string
///
/// Backslashes go first so the escapes added afterwards are left alone.
pub fn escape_double_quoted(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

/// The `-P` section: `-P ` followed by one ` key="value"` token per entry
pub fn parameter_segment(parameters: &Parameters) -> String {
    let tokens: Vec<String> = parameters
        .iter()
        .map(|(key, value)| {
            format!(" {}=\"{}\"", key, escape_double_quoted(&render_value(value)))
        })
        .collect();

    format!("-P {}", tokens.join(" "))
}

/// Database flags, or an empty string when the descriptor is incomplete
pub fn database_segment(database: Option<&DatabaseDescriptor>) -> String {
    database_flags(database)
        .map(|flags| {
            flags
                .iter()
                .map(|(flag, value)| format!(" {flag} {value}"))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Flag/value pairs in the tool's fixed order
fn database_flags(database: Option<&DatabaseDescriptor>) -> Option<Vec<(&'static str, String)>> {
    let db = database?.complete()?;

    let mut flags = vec![
        ("-t", db.driver.to_string()),
        ("-H", db.host.to_string()),
    ];
    if let Some(port) = db.port {
        flags.push(("--db-port", port.to_string()));
    }
    flags.push(("-n", db.name.to_string()));
    flags.push(("-u", db.username.to_string()));
    flags.push(("-p", db.password.to_string()));
    Some(flags)
}

pub(crate) fn path_text(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| JasperError::non_utf8_path(path))
}

/// Full shell command line for the process step
pub fn process_command_line(tool: &Path, request: &ExportRequest) -> Result<String> {
    let artifact = effective_report_path(&request.report_source);

    Ok(format!(
        "\"{}\" process \"{}\" -o \"{}\" -f {} {}{}",
        path_text(tool)?,
        path_text(&artifact)?,
        path_text(&request.output_dir)?,
        request.format(),
        parameter_segment(&request.parameters),
        database_segment(request.database.as_ref()),
    ))
}

/// Arguments for the process step when spawning the tool without a shell
pub fn process_args(request: &ExportRequest) -> Result<Vec<String>> {
    let artifact = effective_report_path(&request.report_source);

    let mut args = vec![
        "process".to_string(),
        path_text(&artifact)?.to_string(),
        "-o".to_string(),
        path_text(&request.output_dir)?.to_string(),
        "-f".to_string(),
        request.format().to_string(),
        "-P".to_string(),
    ];
    args.extend(
        request
            .parameters
            .iter()
            .map(|(key, value)| format!("{}={}", key, render_value(value))),
    );
    for (flag, value) in database_flags(request.database.as_ref()).unwrap_or_default() {
        args.push(flag.to_string());
        args.push(value);
    }

    Ok(args)
}

/// Shell command line for the compile step
pub fn compile_command_line(tool: &Path, template: &Path) -> Result<String> {
    Ok(format!(
        "\"{}\" compile \"{}\" -o \"{}\"",
        path_text(tool)?,
        path_text(template)?,
        path_text(&compile_output_dir(template))?,
    ))
}

/// Arguments for the compile step when spawning the tool without a shell
pub fn compile_args(template: &Path) -> Result<Vec<String>> {
    Ok(vec![
        "compile".to_string(),
        path_text(template)?.to_string(),
        "-o".to_string(),
        path_text(&compile_output_dir(template))?.to_string(),
    ])
}
