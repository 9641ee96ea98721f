//! # jasper-export
//!
//! Build and run JasperReports command lines from a typed export request.
//!
//! ## Usage
//!
//! ```no_run
//! use jasper_export::{ExportRequest, ReportService, ServiceConfig};
//!
//! # async fn demo() -> jasper_export::Result<()> {
//! let service = ReportService::new(ServiceConfig::new().with_jasper_binary("/opt/jasper/bin/jasper"));
//! let export = service.export(
//!     ExportRequest::new("reports/invoice.jrxml", "out")
//!         .output_format("pdf")
//!         .param("invoice_id", 42),
//! );
//!
//! println!("{}", export.command()?);
//! let stdout = export.run().await?;
//! # let _ = stdout;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `report` - Export requests, command-line construction and the orchestrating service
//! - `java` - Java runtime pre-flight probe
//! - `subprocess` - Process runner abstraction with a mock for tests
//! - `config` - Service configuration (TOML file, environment overrides)
//! - `error` - Error taxonomy with stable codes
//! - `cli` - Argument and parameter parsing for the binary
pub mod cli;
pub mod config;
pub mod error;
pub mod java;
pub mod report;
pub mod subprocess;

pub use config::{ExecutionMode, ServiceConfig};
pub use error::{JasperError, Result};
pub use report::{DatabaseDescriptor, ExportHandle, ExportRequest, Parameters, ReportService};
