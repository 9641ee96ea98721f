//! Java runtime pre-flight probe.

use std::sync::Arc;

use crate::error::{JasperError, Result};
use crate::subprocess::{ProcessCommandBuilder, ProcessRunner};

/// What `java -version` reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaRuntimeInfo {
    /// First non-empty line of the version banner
    pub banner: String,
    /// Quoted version string, e.g. `17.0.2` or `1.8.0_292`
    pub version: Option<String>,
}

pub struct JavaProbe {
    runner: Arc<dyn ProcessRunner>,
    java_binary: String,
}

impl JavaProbe {
    pub fn new(runner: Arc<dyn ProcessRunner>, java_binary: impl Into<String>) -> Self {
        Self {
            runner,
            java_binary: java_binary.into(),
        }
    }

    /// Run `java -version`; spawn failure or a failing exit means no runtime
    pub async fn check(&self) -> Result<JavaRuntimeInfo> {
        let command = ProcessCommandBuilder::new(&self.java_binary)
            .arg("-version")
            .build();

        let output = match self.runner.run(command).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Java probe could not run '{}': {}", self.java_binary, e);
                return Err(JasperError::runtime_unavailable(Some(e)));
            }
        };

        if !output.status.success() {
            tracing::debug!(
                "Java probe exited with {:?}: {}",
                output.status,
                output.stderr.trim()
            );
            return Err(JasperError::runtime_unavailable(None));
        }

        // The banner goes to stderr on every JDK we know of
        let banner = first_line(&output.stderr)
            .or_else(|| first_line(&output.stdout))
            .unwrap_or_default()
            .to_string();
        let version = parse_version(&banner);

        tracing::debug!("Java runtime available: {}", banner);
        Ok(JavaRuntimeInfo { banner, version })
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Extract the quoted version from a banner like `openjdk version "17.0.2" 2022-01-18`
pub fn parse_version(banner: &str) -> Option<String> {
    let start = banner.find('"')? + 1;
    let len = banner[start..].find('"')?;
    let version = &banner[start..start + len];
    (!version.is_empty()).then(|| version.to_string())
}
