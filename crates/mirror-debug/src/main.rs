//! mirror-debug
//!
//! # Usage
//!
//! ```bash
//! mirror-debug serve --domain <name>=<snapshot> [--config <file>]
//! mirror-debug check --snapshot <file> <identifier> [--json] [--deadline-ms N]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `mirror_debug=info`)
//!
//! # Exit status of `check`
//!
//! - `0`: the report has no error findings
//! - `1`: the report has error findings, or the command could not run
//! - `2`: the validation session failed
//!
//! Logs go to stderr; stdout carries the report or the protocol.

mod cli;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use mirror_debug::render::{render_failure, render_report};
use mirror_debug::{Result, load_config, load_validator};
use mirror_store::ItemIdentifier;

use cli::{Cli, Commands};

const EXIT_FINDINGS: u8 = 1;
const EXIT_SESSION_FAILED: u8 = 2;

fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("{}: {}", "error".red().bold(), e);
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

// Stdout is reserved for reports and the protocol
fn init_tracing() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mirror_debug=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .try_init()?;
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve {
            domains,
            deadline_ms,
        } => serve(&domains, config, Duration::from_millis(deadline_ms)),
        Commands::Check {
            snapshot,
            identifier,
            json,
            deadline_ms,
        } => {
            let validator = load_validator(&snapshot, config)?;
            let root = ItemIdentifier::new(identifier);
            match validator.validate(&root, Duration::from_millis(deadline_ms)) {
                Ok(report) => {
                    if json {
                        println!("{}", report.to_json()?);
                    } else {
                        print!("{}", render_report(&report));
                    }
                    Ok(if report.has_errors() {
                        ExitCode::from(EXIT_FINDINGS)
                    } else {
                        ExitCode::SUCCESS
                    })
                }
                Err(failure) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&failure)?);
                    } else {
                        print!("{}", render_failure(&failure));
                    }
                    Ok(ExitCode::from(EXIT_SESSION_FAILED))
                }
            }
        }
    }
}

#[cfg(any(debug_assertions, feature = "debug-service"))]
fn serve(
    domains: &[mirror_debug::DomainSpec],
    config: mirror_audit::AuditConfig,
    deadline: Duration,
) -> Result<ExitCode> {
    use mirror_debug::{DebugServer, ServiceRouter};

    let router = ServiceRouter::from_specs(domains, &config)?;
    tracing::info!(domains = ?router.domains(), "Starting mirror-debug server");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(DebugServer::new(router).with_default_deadline(deadline).run())?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(not(any(debug_assertions, feature = "debug-service")))]
fn serve(
    _domains: &[mirror_debug::DomainSpec],
    _config: mirror_audit::AuditConfig,
    _deadline: Duration,
) -> Result<ExitCode> {
    eprintln!(
        "{}: the validation service is not built into this binary (enable the `debug-service` feature)",
        "error".red().bold()
    );
    Ok(ExitCode::FAILURE)
}
