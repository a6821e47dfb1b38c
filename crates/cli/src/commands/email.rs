use clap::Args;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;
use leasecheck_core::EmailRenderer;

use crate::commands::{analyze_intake, emit, CommandResult, IntakeArgs};

pub const SUMMARY_OUTPUT_FILE: &str = "summary_email.txt";
pub const TENANT_OUTPUT_FILE: &str = "tenant_email.txt";

#[derive(Debug, Clone, Args)]
pub struct EmailArgs {
    #[command(flatten)]
    pub input: IntakeArgs,
    #[arg(long, help = "Draft the tenant notification covering HIGH-risk clauses only")]
    pub tenant: bool,
}

pub fn run(config: &AppConfig, args: &EmailArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("email", error))
}

fn execute(config: &AppConfig, args: &EmailArgs) -> Result<CommandResult, ApplicationError> {
    let (_, analysis) = analyze_intake(config, &args.input)?;
    let renderer = EmailRenderer::new()?;

    let (file_name, contents) = if args.tenant {
        let draft = renderer.tenant_email(&analysis)?;
        (TENANT_OUTPUT_FILE, format!("Subject: {}\n\n{}", draft.subject, draft.body))
    } else {
        (SUMMARY_OUTPUT_FILE, renderer.summary_email(&analysis)?)
    };

    emit("email", config, args.input.write, file_name, contents)
}
