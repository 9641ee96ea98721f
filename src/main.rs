use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, trace};

use jasper_export::cli::{
    get_log_level, load_param_file, merge_params, parse_cli_params, Cli, Commands,
};
use jasper_export::report::is_template;
use jasper_export::{ExportRequest, JasperError, ReportService, ServiceConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout only carries tool output
    tracing_subscriber::fmt()
        .with_env_filter(get_log_level(cli.verbose))
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("jasper-export started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.clone(), cli.jasper_binary.clone()).await?;
    let service = ReportService::new(config);

    match cli.command {
        Commands::Process {
            report,
            output,
            format,
            params,
            params_file,
            db,
            print_command,
        } => {
            let cli_params = parse_cli_params(params)?;
            let parameters = match params_file {
                Some(path) => merge_params(cli_params, load_param_file(&path).await?),
                None => cli_params,
            };

            let request = ExportRequest {
                report_source: report,
                output_dir: output,
                format,
                parameters,
                database: db.into_descriptor(),
            };
            let export = service.export(request);

            if print_command {
                println!("{}", export.command()?);
                return Ok(());
            }

            let stdout = export.run().await?;
            print!("{stdout}");
        }
        Commands::Compile { template } => {
            // Reject a wrong path before spending a JVM start on the Java check
            if !is_template(&template) {
                return Err(JasperError::not_a_template(template).into());
            }
            service.check_java().await?;
            let compiled = service.compile(&template).await?;
            println!("{}", compiled.display());
        }
        Commands::CheckJava => {
            let info = service.check_java().await?;
            println!("{}", info.banner);
        }
    }

    Ok(())
}

/// Defaults, then the config file, then environment, then CLI flags
async fn load_config(
    path: Option<PathBuf>,
    jasper_binary: Option<PathBuf>,
) -> anyhow::Result<ServiceConfig> {
    if let Some(ref explicit) = path {
        anyhow::ensure!(
            explicit.exists(),
            "Config file not found: {}",
            explicit.display()
        );
    }

    let mut config = match path.or_else(jasper_export::config::default_config_path) {
        Some(path) => ServiceConfig::load(&path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    config.merge_env_vars()?;

    if let Some(binary) = jasper_binary {
        config.jasper_binary_path = Some(binary);
    }

    debug!("Effective config: {:?}", config);
    Ok(config)
}
