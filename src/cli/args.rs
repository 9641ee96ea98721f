//! CLI argument structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::report::DatabaseDescriptor;

/// Export JasperReports documents from the command line
#[derive(Parser)]
#[command(name = "jasper-export")]
#[command(about = "jasper-export - Compile and export JasperReports templates", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// JasperReports executable (overrides config and environment)
    #[arg(long, global = true, value_name = "PATH")]
    pub jasper_binary: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a report, compiling the template first when needed
    Process {
        /// Report template (.jrxml) or compiled report (.jasper)
        report: PathBuf,

        /// Directory the tool writes the output document into
        #[arg(short = 'o', long)]
        output: PathBuf,

        /// Output format (pdf, html, xlsx, ...)
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Report parameter as KEY=VALUE (repeatable)
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// JSON or YAML file with report parameters
        #[arg(long, value_name = "FILE")]
        params_file: Option<PathBuf>,

        #[command(flatten)]
        db: DbArgs,

        /// Print the command line instead of running it
        #[arg(long)]
        print_command: bool,
    },

    /// Compile a .jrxml template into a .jasper file next to it
    Compile {
        /// Report template (.jrxml)
        template: PathBuf,
    },

    /// Check that a Java runtime is available
    CheckJava,
}

/// Database connection passed through to the tool
#[derive(Args, Debug, Default)]
pub struct DbArgs {
    /// Database driver type (e.g. postgres, mysql)
    #[arg(long)]
    pub db_driver: Option<String>,

    #[arg(long)]
    pub db_host: Option<String>,

    #[arg(long)]
    pub db_port: Option<u16>,

    #[arg(long)]
    pub db_name: Option<String>,

    #[arg(long)]
    pub db_user: Option<String>,

    #[arg(long)]
    pub db_password: Option<String>,
}

impl DbArgs {
    /// Descriptor from the given flags, or `None` when no flag was passed
    pub fn into_descriptor(self) -> Option<DatabaseDescriptor> {
        let descriptor = DatabaseDescriptor {
            driver: self.db_driver,
            host: self.db_host,
            port: self.db_port,
            name: self.db_name,
            username: self.db_user,
            password: self.db_password,
        };

        if descriptor == DatabaseDescriptor::default() {
            None
        } else {
            Some(descriptor)
        }
    }
}

/// Map the `-v` count to a tracing filter
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
