use anyhow::Result;
use awsctl_core::Config;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, shells};
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::{ConnectionManager, SessionOverrides};
use error::AwsCtlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    match execute_command(&cli, &conn_mgr).await {
        Ok(true) => Ok(()),
        // The failure envelope has already been printed
        Ok(false) => std::process::exit(1),
        Err(e) => {
            e.print_diagnostic();
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "awsctl=warn,awsctl_core=warn",
            1 => "awsctl=info,awsctl_core=info",
            2 => "awsctl=debug,awsctl_core=debug",
            _ => "awsctl=trace,awsctl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

/// Run the selected command; `Ok(false)` means it reported its own failure
async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<bool, AwsCtlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    let fmt = output::OutputFormat::resolve(cli.output, output::OutputFormat::Json);
                    output::print_output(&output_data, fmt, None)?;
                }
                _ => {
                    println!("awsctl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(true)
        }
        Commands::Completions { shell } => {
            debug!("Generating completions for {:?}", shell);
            generate_completions(*shell);
            Ok(true)
        }
        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output)
                .map(|_| true)
        }
        Commands::Operations(ops_cmd) => {
            commands::operations::handle_operations_command(ops_cmd, cli.output, cli.query.as_deref())
                .map(|_| true)
        }
        Commands::Invoke(args) => {
            let overrides = SessionOverrides {
                profile: cli.profile.clone(),
                region: cli.region.clone(),
                endpoint_url: cli.endpoint_url.clone(),
            };
            commands::invoke::handle_invoke(
                args,
                conn_mgr,
                &overrides,
                cli.output,
                cli.query.as_deref(),
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(true) => info!("Command completed successfully in {:?}", duration),
        Ok(false) => info!("Command reported a failure after {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Generate shell completions
fn generate_completions(shell: cli::Shell) {
    let mut cmd = cli::Cli::command();
    let name = cmd.get_name().to_string();

    match shell {
        cli::Shell::Bash => generate(shells::Bash, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Zsh => generate(shells::Zsh, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::Fish => generate(shells::Fish, &mut cmd, name, &mut std::io::stdout()),
        cli::Shell::PowerShell => {
            generate(shells::PowerShell, &mut cmd, name, &mut std::io::stdout())
        }
        cli::Shell::Elvish => generate(shells::Elvish, &mut cmd, name, &mut std::io::stdout()),
    }
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Completions { shell } => format!("completions {:?}", shell),
        Commands::Invoke(args) => format!(
            "invoke {} {} ({} parameter(s){})",
            args.service,
            args.operation,
            args.params.len(),
            if args.params_json.is_some() {
                ", plus JSON"
            } else {
                ""
            }
        ),
        Commands::Operations(cmd) => format!("operations {:?}", cmd),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands;
            match cmd {
                ProfileCommands::List => "profile list".to_string(),
                ProfileCommands::Path => "profile path".to_string(),
                ProfileCommands::Show { name } => format!("profile show {}", name),
                ProfileCommands::Set { name, .. } => {
                    format!("profile set {} [credentials redacted]", name)
                }
                ProfileCommands::Remove { name } => format!("profile remove {}", name),
                ProfileCommands::Default { name } => format!("profile default {}", name),
            }
        }
    }
}
