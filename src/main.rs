//! Binary entry point for contacts.
//!
//! This binary provides the CLI for serving the contact book.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use contacts::config::ContactsConfig;
use contacts::observability::{self, LoggingConfig};
use contacts::web;
use std::path::PathBuf;
use std::process::ExitCode;

/// Contacts - a server-rendered contact book.
#[derive(Parser)]
#[command(name = "contacts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the web server.
    Serve {
        /// Address to bind.
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on.
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the SQLite database file.
        #[arg(long)]
        database: Option<PathBuf>,

        /// Keep contacts in memory only.
        #[arg(long, conflicts_with = "database")]
        in_memory: bool,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,

        /// Print as JSON.
        #[arg(long, requires = "show")]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };
    apply_cli_overrides(&mut config, &cli.command);

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    let result = run_command(cli.command, config).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(
    command: Commands,
    config: ContactsConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Serve { .. } => web::serve(&config).await?,
        Commands::Config { show, json } => cmd_config(&config, show, json)?,
    }
    Ok(())
}

/// Loads configuration: file, then `CONTACTS_*` environment overrides.
fn load_config(path: Option<&str>) -> Result<ContactsConfig, Box<dyn std::error::Error>> {
    let mut config = if let Some(config_path) = path {
        ContactsConfig::load_from_file(std::path::Path::new(config_path))?
    } else {
        match std::env::var("CONTACTS_CONFIG_PATH") {
            Ok(config_path) if !config_path.trim().is_empty() => {
                ContactsConfig::load_from_file(std::path::Path::new(&config_path))?
            },
            _ => ContactsConfig::load_default()?,
        }
    };

    config.apply_env_overrides()?;
    Ok(config)
}

/// Applies `serve` flags, which win over file and environment.
fn apply_cli_overrides(config: &mut ContactsConfig, command: &Commands) {
    let Commands::Serve {
        host,
        port,
        database,
        in_memory,
    } = command
    else {
        return;
    };

    if let Some(host) = host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = port {
        config.server.port = *port;
    }
    if let Some(database) = database {
        config.storage.path = Some(database.clone());
    }
    if *in_memory {
        config.storage.in_memory = true;
    }
}

/// Config command.
fn cmd_config(
    config: &ContactsConfig,
    show: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !show {
        println!("Use --show to display configuration");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Current Configuration");
    println!("=====================");
    println!();
    println!("Listen Address: {}", config.bind_address());
    println!("Body Limit: {} bytes", config.server.body_limit);
    if config.storage.in_memory {
        println!("Database: (in memory)");
    } else {
        println!("Database: {}", config.storage.resolved_path().display());
    }
    println!("Phone Region: {}", config.validation.phone_region);
    println!();
    println!("Flash Messages:");
    println!("  TTL: {}s", config.session.flash_ttl_secs);
    println!("  Max Sessions: {}", config.session.max_sessions);
    println!();
    println!("Logging:");
    println!(
        "  Format: {}",
        config.logging.format.as_deref().unwrap_or("(default)")
    );
    println!(
        "  Filter: {}",
        config.logging.filter.as_deref().unwrap_or("(default)")
    );

    Ok(())
}
