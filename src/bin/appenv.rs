//! appenv CLI — check a deployment's environment before starting the app.

use std::path::PathBuf;
use std::process::ExitCode;

use appenv::config::Config;
use appenv::error::Error;
use appenv::resolve::{ResolvedEnv, resolve_for};
use appenv::schema::{Audience, Schema};
use appenv::source::MapEnv;
use appenv::telemetry::{TelemetryConfig, init_telemetry};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "appenv", about = "Validate the web app's environment variables")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve the environment and print it with secrets redacted
    Check {
        /// Load variables from this file instead of ./.env
        #[arg(long)]
        env_file: Option<PathBuf>,
        /// Validate only what the client bundle may read
        #[arg(long)]
        client: bool,
        /// Ignore the hosting platform's deployment URL fallback
        #[arg(long)]
        no_platform: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List the declared variables and their rules
    Schema {
        /// List the schema used by `check --no-platform`
        #[arg(long)]
        no_platform: bool,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        default_level: cli.log_level.clone(),
        ..TelemetryConfig::default()
    })?;

    match cli.command {
        Command::Check {
            env_file,
            client,
            no_platform,
            format,
        } => cmd_check(env_file, client, no_platform, format),
        Command::Schema {
            no_platform,
            format,
        } => cmd_schema(no_platform, format),
    }
}

fn cmd_check(
    env_file: Option<PathBuf>,
    client: bool,
    no_platform: bool,
    format: Format,
) -> anyhow::Result<ExitCode> {
    // Variables already exported take precedence over the file.
    let mut env = MapEnv::from_system();
    let file = match env_file {
        Some(path) => Some(dotenvy::from_path_iter(&path)?),
        None => dotenvy::dotenv_iter().ok(),
    };
    if let Some(iter) = file {
        let pairs = iter.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = pairs.len(), "loaded variables from env file");
        env = env.merge_missing(pairs);
    }

    let schema = standard_schema(no_platform);
    let side = if client {
        Audience::Client
    } else {
        Audience::Server
    };

    let resolved = match resolve_for(&env, &schema, side) {
        Ok(resolved) => resolved,
        Err(Error::SchemaViolation(violations)) => {
            eprintln!("Invalid environment variables:");
            for violation in violations.iter() {
                eprintln!("  {violation}");
            }
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    if side == Audience::Server {
        // Catches anything the typed record needs beyond the schema rules.
        Config::from_resolved(&resolved)?;
    }

    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&resolved.to_redacted_json())?;
            println!("{json}");
        }
        Format::Text => print_resolved(&resolved),
    }
    Ok(ExitCode::SUCCESS)
}

fn print_resolved(resolved: &ResolvedEnv) {
    if resolved.is_empty() {
        println!("No variables declared for the {} side.", resolved.audience());
        return;
    }
    let json = resolved.to_redacted_json();
    for name in resolved.names() {
        match json.get(name).and_then(|v| v.as_str()) {
            Some(value) => println!("{name:<24} {value}"),
            None => println!("{name:<24} (unset)"),
        }
    }
}

fn standard_schema(no_platform: bool) -> Schema {
    if no_platform {
        Schema::standard_without_platform()
    } else {
        Schema::standard()
    }
}

fn cmd_schema(no_platform: bool, format: Format) -> anyhow::Result<ExitCode> {
    let schema = standard_schema(no_platform);

    match format {
        Format::Json => {
            let entries: Vec<_> = schema
                .entries()
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "name": e.descriptor.name,
                        "audience": e.audience.to_string(),
                        "rule": e.descriptor.rule.to_string(),
                        "sensitive": e.descriptor.sensitive,
                        "preprocessed": e.descriptor.preprocess.is_some(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        Format::Text => {
            println!("{:<24} {:<8} {:<10} RULE", "NAME", "AUDIENCE", "SENSITIVE");
            for e in schema.entries() {
                let mut rule = e.descriptor.rule.to_string();
                if e.descriptor.preprocess.is_some() {
                    rule.push_str(" (preprocessed)");
                }
                println!(
                    "{:<24} {:<8} {:<10} {}",
                    e.descriptor.name,
                    e.audience.to_string(),
                    if e.descriptor.sensitive { "yes" } else { "no" },
                    rule
                );
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
