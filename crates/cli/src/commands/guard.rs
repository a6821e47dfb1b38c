use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;
use leasecheck_core::{DomainError, GuardrailPipeline, QaGuardrail, QaState};

use crate::commands::{to_json, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct GuardArgs {
    #[arg(long, help = "Identifier used for per-user rate limiting")]
    pub user: String,
    #[arg(
        long,
        conflicts_with = "file",
        required_unless_present = "file",
        help = "Drafted answer to check"
    )]
    pub text: Option<String>,
    #[arg(long, help = "File containing the drafted answer")]
    pub file: Option<PathBuf>,
}

pub fn run(config: &AppConfig, args: &GuardArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("guard", error))
}

fn execute(config: &AppConfig, args: &GuardArgs) -> Result<CommandResult, ApplicationError> {
    let draft = read_draft(args)?;

    let pipeline = match &config.guardrails.path {
        Some(path) => GuardrailPipeline::load(path)?,
        None => GuardrailPipeline::default(),
    };
    let rewritten = pipeline.process(&draft);

    let qa = QaGuardrail::new(config.qa.settings())?;
    let state = qa.invoke(QaState::new(args.user.clone(), rewritten), Utc::now())?;

    Ok(CommandResult::artifact(to_json(&state)?))
}

fn read_draft(args: &GuardArgs) -> Result<String, ApplicationError> {
    match (&args.text, &args.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => fs::read_to_string(path).map_err(|error| {
            ApplicationError::Io(format!("could not read draft `{}`: {error}", path.display()))
        }),
        (None, None) => Err(DomainError::InvariantViolation(
            "either --text or --file is required".to_string(),
        )
        .into()),
    }
}
