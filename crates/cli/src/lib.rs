pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use leasecheck_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};

use crate::commands::calendar::CalendarArgs;
use crate::commands::email::EmailArgs;
use crate::commands::guard::GuardArgs;
use crate::commands::{CommandResult, IntakeArgs};

#[derive(Debug, Parser)]
#[command(
    name = "leasecheck",
    about = "Tenancy agreement clause risk checker",
    long_about = "Classify tenancy agreement clauses against a risk rulebook and derive dashboards, emails, riders and calendar invites from the result.",
    after_help = "Examples:\n  leasecheck analyze --intake intake.json\n  leasecheck email --intake intake.json --tenant\n  leasecheck guard --user tenant-1 --text \"...\"\n  leasecheck doctor --json"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Config file (defaults to leasecheck.toml or config/leasecheck.toml)"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Directory for --write artifacts, overriding `output.dir`")]
    output_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Log level (trace|debug|info|warn|error)")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Classify every clause and print the summary/issues/buckets result")]
    Analyze(IntakeArgs),
    #[command(about = "Build the dashboard package with insights and artifact links")]
    Package(IntakeArgs),
    #[command(about = "Render the risk summary email or the tenant notification")]
    Email(EmailArgs),
    #[command(about = "Draft the negotiation rider from HIGH-risk clauses")]
    Rider(IntakeArgs),
    #[command(about = "Produce an iCalendar invite for signing or reviewing the agreement")]
    Calendar(CalendarArgs),
    #[command(about = "Run a drafted answer through guardrails and the QA pass")]
    Guard(GuardArgs),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, rulebook, guardrails and templates")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    // Stdout carries command output, so a second init is ignored rather than fatal.
    let _ = match config.logging.format {
        Compact => builder.compact().try_init(),
        Pretty => builder.pretty().try_init(),
        Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let result = execute(cli);

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn execute(cli: Cli) -> CommandResult {
    let options = LoadOptions {
        config_path: cli.config,
        require_file: false,
        overrides: ConfigOverrides {
            output_dir: cli.output_dir,
            log_level: cli.log_level,
            ..ConfigOverrides::default()
        },
    };

    match &cli.command {
        Command::Analyze(args) => {
            with_config(options, "analyze", |config| commands::analyze::run(config, args))
        }
        Command::Package(args) => {
            with_config(options, "package", |config| commands::package::run(config, args))
        }
        Command::Email(args) => {
            with_config(options, "email", |config| commands::email::run(config, args))
        }
        Command::Rider(args) => {
            with_config(options, "rider", |config| commands::rider::run(config, args))
        }
        Command::Calendar(args) => {
            with_config(options, "calendar", |config| commands::calendar::run(config, args))
        }
        Command::Guard(args) => {
            with_config(options, "guard", |config| commands::guard::run(config, args))
        }
        Command::Config => commands::config::run(options),
        Command::Doctor { json } => commands::doctor::run(options, *json),
    }
}

fn with_config(
    options: LoadOptions,
    command: &str,
    body: impl FnOnce(&AppConfig) -> CommandResult,
) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    init_logging(&config);
    body(&config)
}
