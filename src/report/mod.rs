//! Report export orchestration.
//!
//! [`ReportService::export`] wraps an [`ExportRequest`] in an [`ExportHandle`]
//! that can either render the command line ([`ExportHandle::command`]) or run
//! the whole pipeline ([`ExportHandle::run`]): Java probe, optional template
//! compilation, then the process step.

pub mod command;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ExecutionMode, ServiceConfig};
use crate::error::{ErrorCode, JasperError, Result};
use crate::java::{JavaProbe, JavaRuntimeInfo};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder, ProcessRunner, SubprocessManager};

pub use command::{effective_report_path, is_template, DEFAULT_FORMAT};

/// Report parameters, kept in insertion order
pub type Parameters = serde_json::Map<String, Value>;

/// Connection details handed to the tool for JDBC-backed reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub driver: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    #[serde(alias = "dbname")]
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A descriptor with every required field present
#[derive(Debug, Clone, Copy)]
pub struct CompleteDatabase<'a> {
    pub driver: &'a str,
    pub host: &'a str,
    pub port: Option<u16>,
    pub name: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl DatabaseDescriptor {
    pub fn new(
        driver: impl Into<String>,
        host: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            driver: Some(driver.into()),
            host: Some(host.into()),
            port: None,
            name: Some(name.into()),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Borrow the fields if driver, host, name, username and password are all non-empty
    pub fn complete(&self) -> Option<CompleteDatabase<'_>> {
        Some(CompleteDatabase {
            driver: present(&self.driver)?,
            host: present(&self.host)?,
            port: self.port,
            name: present(&self.name)?,
            username: present(&self.username)?,
            password: present(&self.password)?,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Template (`.jrxml`) or compiled report (`.jasper`)
    pub report_source: PathBuf,
    pub output_dir: PathBuf,
    /// Output format, `pdf` when unset
    pub format: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
    pub database: Option<DatabaseDescriptor>,
}

impl ExportRequest {
    pub fn new(report_source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_source: report_source.into(),
            output_dir: output_dir.into(),
            format: None,
            parameters: Parameters::new(),
            database: None,
        }
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn params<I, K>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        for (key, value) in params {
            self.parameters.insert(key.into(), value);
        }
        self
    }

    pub fn database(mut self, database: DatabaseDescriptor) -> Self {
        self.database = Some(database);
        self
    }

    /// Effective output format
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }
}

/// Entry point for building and running report exports
#[derive(Clone)]
pub struct ReportService {
    jasper_path: PathBuf,
    config: ServiceConfig,
    runner: Arc<dyn ProcessRunner>,
}

impl ReportService {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_subprocess(config, SubprocessManager::production())
    }

    pub fn with_subprocess(config: ServiceConfig, subprocess: SubprocessManager) -> Self {
        let jasper_path = config.resolve_jasper_path();
        tracing::debug!("Using JasperReports binary at {}", jasper_path.display());
        Self {
            jasper_path,
            config,
            runner: subprocess.runner(),
        }
    }

    pub fn jasper_path(&self) -> &Path {
        &self.jasper_path
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn export(&self, request: ExportRequest) -> ExportHandle<'_> {
        ExportHandle {
            service: self,
            request,
        }
    }

    /// Check that a Java runtime can be started
    pub async fn check_java(&self) -> Result<JavaRuntimeInfo> {
        JavaProbe::new(Arc::clone(&self.runner), self.config.java_binary.as_str())
            .check()
            .await
    }

    /// Compile a `.jrxml` template next to itself and return the `.jasper` path
    pub async fn compile(&self, template: &Path) -> Result<PathBuf> {
        if !command::is_template(template) {
            return Err(JasperError::not_a_template(template));
        }

        let compile = match self.config.execution {
            ExecutionMode::Shell => ProcessCommandBuilder::shell(&command::compile_command_line(
                &self.jasper_path,
                template,
            )?),
            ExecutionMode::Direct => ProcessCommandBuilder::new(command::path_text(
                &self.jasper_path,
            )?)
            .args(command::compile_args(template)?),
        }
        .build();

        tracing::debug!("Compiling report template {}", template.display());
        self.execute(compile, ErrorCode::EXEC_COMPILE_FAILED).await?;

        Ok(template.with_extension(command::COMPILED_EXTENSION))
    }

    /// Run one tool invocation, returning stdout and downgrading stderr to a warning
    async fn execute(&self, command: ProcessCommand, code: u16) -> Result<String> {
        let display = describe(&command);

        let output = self
            .runner
            .run(command)
            .await
            .map_err(|e| JasperError::execution_spawn_failed(code, display.clone(), e))?;

        if !output.status.success() {
            let diagnostic = if output.stderr.is_empty() {
                format!("command exited with {:?}", output.status)
            } else {
                output.stderr
            };
            return Err(JasperError::execution_failed(
                code,
                diagnostic,
                display,
                output.status.code(),
            ));
        }

        if !output.stderr.is_empty() {
            tracing::warn!("Jasper stderr: {}", output.stderr);
        }

        Ok(output.stdout)
    }
}

/// The command text as the user would type it
fn describe(command: &ProcessCommand) -> String {
    match command.args.as_slice() {
        [flag, line] if flag == "-c" || flag == "/C" => line.clone(),
        _ => command.display(),
    }
}

/// A single export, ready to render or run
pub struct ExportHandle<'a> {
    service: &'a ReportService,
    request: ExportRequest,
}

impl ExportHandle<'_> {
    pub fn request(&self) -> &ExportRequest {
        &self.request
    }

    /// The shell command line for the process step
    pub fn command(&self) -> Result<String> {
        command::process_command_line(&self.service.jasper_path, &self.request)
    }

    /// The process step as an argument vector, without shell quoting
    pub fn args(&self) -> Result<Vec<String>> {
        command::process_args(&self.request)
    }

    /// Probe Java, compile the template if needed, run the export, return stdout
    pub async fn run(&self) -> Result<String> {
        self.service.check_java().await?;

        if is_template(&self.request.report_source) {
            let compiled = self.service.compile(&self.request.report_source).await?;
            tracing::debug!("Compiled template to {}", compiled.display());
        }

        let process = match self.service.config.execution {
            ExecutionMode::Shell => ProcessCommandBuilder::shell(&self.command()?),
            ExecutionMode::Direct => {
                ProcessCommandBuilder::new(command::path_text(&self.service.jasper_path)?)
                    .args(self.args()?)
            }
        }
        .build();

        tracing::info!(
            "Exporting {} as {} into {}",
            self.request.report_source.display(),
            self.request.format(),
            self.request.output_dir.display()
        );
        self.service
            .execute(process, ErrorCode::EXEC_PROCESS_FAILED)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;
    use serde_json::json;

    const TOOL: &str = "/opt/jasper/bin/jasper";

    fn service(execution: ExecutionMode) -> (ReportService, MockProcessRunner) {
        let (subprocess, mock) = SubprocessManager::mock();
        let config = ServiceConfig::new()
            .with_jasper_binary(TOOL)
            .with_execution(execution);
        (ReportService::with_subprocess(config, subprocess), mock)
    }

    fn expect_java(mock: &mut MockProcessRunner) {
        mock.expect_command("java")
            .returns_stderr("openjdk version \"17.0.2\"\n")
            .finish();
    }

    #[test]
    fn test_descriptor_completeness() {
        let db = DatabaseDescriptor::new("mysql", "localhost", "shop", "root", "pw");
        assert!(db.is_complete());
        assert!(!DatabaseDescriptor::default().is_complete());
        assert!(!DatabaseDescriptor {
            username: Some(String::new()),
            ..db.clone()
        }
        .is_complete());
    }

    #[test]
    fn test_descriptor_accepts_dbname_alias() {
        let db: DatabaseDescriptor = serde_json::from_value(json!({
            "driver": "postgres",
            "host": "h",
            "port": 5432,
            "dbname": "d",
            "username": "u",
            "password": "p"
        }))
        .unwrap();
        assert_eq!(db.name.as_deref(), Some("d"));
        assert_eq!(db.port, Some(5432));
    }

    #[test]
    fn test_request_defaults_to_pdf() {
        let request = ExportRequest::new("a.jasper", "/out");
        assert_eq!(request.format(), "pdf");
        assert_eq!(request.output_format("html").format(), "html");
    }

    #[test]
    fn test_command_is_idempotent() {
        let (service, _mock) = service(ExecutionMode::Shell);
        let handle = service.export(
            ExportRequest::new("/r/a.jrxml", "/out")
                .param("b", "x$y")
                .param("a", json!({"n": [1, 2]})),
        );

        let first = handle.command().unwrap();
        assert_eq!(first, handle.command().unwrap());
        assert_eq!(
            first,
            r#""/opt/jasper/bin/jasper" process "/r/a.jasper" -o "/out" -f pdf -P  b="x\$y"  a="{\"n\":[1,2]}""#
        );
    }

    #[tokio::test]
    async fn test_run_shell_mode_compiles_then_processes() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        expect_java(&mut mock);
        mock.expect_command("sh")
            .with_args(|args| args[1].contains("\" compile \""))
            .returns_stderr("WARN font fallback")
            .finish();
        mock.expect_command("sh")
            .with_args(|args| args[1].contains("\" process \""))
            .returns_stdout("exported\n")
            .finish();

        let handle = service.export(ExportRequest::new("/r/a.jrxml", "/out").param("x", 1));
        let stdout = handle.run().await.unwrap();
        assert_eq!(stdout, "exported\n");

        let history = mock.get_call_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].program, "java");
        assert_eq!(
            history[1].args,
            vec!["-c", r#""/opt/jasper/bin/jasper" compile "/r/a.jrxml" -o "/r""#]
        );
        assert_eq!(history[2].args[1], handle.command().unwrap());
    }

    #[tokio::test]
    async fn test_run_skips_compile_for_compiled_report() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        expect_java(&mut mock);
        mock.expect_command("sh").returns_stdout("ok").finish();

        let stdout = service
            .export(ExportRequest::new("/r/a.jasper", "/out"))
            .run()
            .await
            .unwrap();
        assert_eq!(stdout, "ok");
        assert!(mock.verify_called("sh", 1));
    }

    #[tokio::test]
    async fn test_run_direct_mode_uses_argument_vector() {
        let (service, mut mock) = service(ExecutionMode::Direct);
        expect_java(&mut mock);
        mock.expect_command(TOOL)
            .with_args(|args| args.first().map(String::as_str) == Some("compile"))
            .finish();
        mock.expect_command(TOOL)
            .with_args(|args| args.first().map(String::as_str) == Some("process"))
            .returns_stdout("done")
            .finish();

        let stdout = service
            .export(ExportRequest::new("a.jrxml", "/out").param("q", "it's \"x\""))
            .run()
            .await
            .unwrap();
        assert_eq!(stdout, "done");

        let history = mock.get_call_history();
        assert_eq!(history[1].args, vec!["compile", "a.jrxml", "-o", "."]);
        assert_eq!(
            history[2].args,
            vec!["process", "a.jasper", "-o", "/out", "-f", "pdf", "-P", "q=it's \"x\""]
        );
    }

    #[tokio::test]
    async fn test_run_without_java_never_compiles_or_executes() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        mock.expect_command("java").returns_not_found().finish();

        let err = service
            .export(ExportRequest::new("/r/a.jrxml", "/out"))
            .run()
            .await
            .unwrap_err();

        assert!(err.is_runtime_unavailable());
        assert!(mock.verify_called("java", 1));
        assert!(mock.verify_called("sh", 0));
    }

    #[tokio::test]
    async fn test_compile_failure_stops_before_process() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        expect_java(&mut mock);
        mock.expect_command("sh")
            .returns_exit_code(1)
            .returns_stderr("net.sf.jasperreports.engine.JRException: bad xml\n")
            .finish();

        let err = service
            .export(ExportRequest::new("/r/a.jrxml", "/out"))
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::EXEC_COMPILE_FAILED);
        assert_eq!(
            err.message(),
            "net.sf.jasperreports.engine.JRException: bad xml\n"
        );
        assert!(mock.verify_called("sh", 1));
    }

    #[tokio::test]
    async fn test_process_failure_carries_stderr_and_exit_code() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        expect_java(&mut mock);
        mock.expect_command("sh")
            .returns_exit_code(3)
            .returns_stderr("Error: output dir missing")
            .finish();

        let err = service
            .export(ExportRequest::new("/r/a.jasper", "/missing"))
            .run()
            .await
            .unwrap_err();

        match err {
            JasperError::ExecutionFailed {
                code,
                message,
                exit_code,
                command,
                ..
            } => {
                assert_eq!(code, ErrorCode::EXEC_PROCESS_FAILED);
                assert_eq!(message, "Error: output dir missing");
                assert_eq!(exit_code, Some(3));
                assert!(command.unwrap().starts_with("\"/opt/jasper/bin/jasper\" process"));
            }
            other => panic!("Expected ExecutionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compile_returns_compiled_path() {
        let (service, mut mock) = service(ExecutionMode::Shell);
        mock.expect_command("sh").finish();

        let compiled = service.compile(Path::new("/r/inv.jrxml")).await.unwrap();
        assert_eq!(compiled, PathBuf::from("/r/inv.jasper"));
    }

    #[tokio::test]
    async fn test_compile_rejects_non_template() {
        let (service, mock) = service(ExecutionMode::Shell);

        for path in ["/r/inv.jasper", "/r/inv.JRXML", "/r/inv"] {
            let err = service.compile(Path::new(path)).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::INPUT_NOT_TEMPLATE);
            assert!(matches!(err, JasperError::InvalidInput { .. }));
        }
        assert!(mock.get_call_history().is_empty());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_non_fatal_stderr_is_logged_as_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (service, mut mock) = service(ExecutionMode::Shell);
        expect_java(&mut mock);
        mock.expect_command("sh")
            .with_args(|args| args[1].contains("quiet.jasper"))
            .returns_stdout("done")
            .finish();
        mock.expect_command("sh")
            .with_args(|args| args[1].contains("noisy.jasper"))
            .returns_stdout("done")
            .returns_stderr("log4j: no appenders configured")
            .finish();

        let quiet = service.export(ExportRequest::new("quiet.jasper", "/out"));
        assert_eq!(quiet.run().await.unwrap(), "done");
        assert!(logs.text().is_empty(), "unexpected log output: {}", logs.text());

        let noisy = service.export(ExportRequest::new("noisy.jasper", "/out"));
        assert_eq!(noisy.run().await.unwrap(), "done");

        let text = logs.text();
        let line = text
            .lines()
            .find(|line| line.contains("Jasper stderr: log4j: no appenders configured"))
            .unwrap_or_else(|| panic!("stderr not logged: {text}"));
        assert!(line.trim_start().starts_with("WARN"), "not a warning: {line}");
    }
}
