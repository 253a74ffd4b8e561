//! `license-gate` — check production dependency licenses at the end of a build.
//!
//! # Flow
//! 1. Parse CLI arguments.
//! 2. Load and merge configuration ([`load_config`], [`resolve_settings`]).
//! 3. Build the [`Gate`]; the license override file is read here.
//! 4. Discover dependencies and evaluate them ([`Gate::on_emit`]).
//! 5. Print the outcome ([`report::terminal`]).
//! 6. Exit `0` (report written) or `1` (any [`GateError`]).

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use license_gate::cli::Cli;
use license_gate::config::{load_config, resolve_settings};
use license_gate::discovery::node::NodeModulesDiscovery;
use license_gate::discovery::{Discover, JsonFileDiscovery};
use license_gate::error::GateError;
use license_gate::gate::Gate;
use license_gate::report;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let config = load_config(&path, cli.config.as_deref())?;
    let settings = resolve_settings(&path, &cli, &config, npm_self_package())?;

    let gate = Gate::new(settings.options);

    let discovery: Box<dyn Discover> = match settings.dependencies {
        Some(file) => Box::new(JsonFileDiscovery::new(file)),
        None => Box::new(NodeModulesDiscovery::new(&path)),
    };

    let spinner = (!cli.quiet).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Checking licenses in {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let outcome = gate.on_emit(discovery.as_ref()).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(report) => {
            report::terminal::render_success(&report, cli.verbose, cli.quiet);
            Ok(())
        }
        Err(err) => {
            if let GateError::PolicyViolation(violation) = &err {
                if !cli.quiet {
                    report::terminal::render_violations(violation);
                }
            }
            eprintln!("{} {}", "error:".red().bold(), err);
            std::process::exit(1);
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// `name@version` of the package whose npm script invoked us, if any.
fn npm_self_package() -> Option<String> {
    let name = std::env::var("npm_package_name").ok()?;
    let version = std::env::var("npm_package_version").ok()?;
    Some(format!("{}@{}", name, version))
}
