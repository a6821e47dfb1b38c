pub mod analyze;
pub mod calendar;
pub mod config;
pub mod doctor;
pub mod email;
pub mod guard;
pub mod package;
pub mod rider;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::{ApplicationError, InterfaceError};
use leasecheck_core::{AnalysisResult, ClauseClassifier, IntakeDocument, Rulebook};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            correlation_id: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            correlation_id: None,
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Raw artifact output (JSON, plain text or ICS) for stdout.
    pub fn artifact(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn from_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = Uuid::new_v4().to_string();
        let interface = error.into_interface(correlation_id.clone());
        let (error_class, exit_code) = match &interface {
            InterfaceError::BadRequest { .. } => ("invalid_input", 3),
            InterfaceError::ServiceUnavailable { .. } => ("unavailable", 4),
            InterfaceError::Internal { .. } => ("internal", 5),
        };

        tracing::error!(
            event_name = "cli.command_failed",
            command,
            error_class,
            correlation_id = %correlation_id,
            error = %interface,
            "command failed"
        );

        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            correlation_id: Some(correlation_id),
            message: format!("{} ({interface})", interface.user_message()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Arguments shared by every command that analyzes an intake document.
#[derive(Debug, Clone, Args)]
pub struct IntakeArgs {
    #[arg(long, help = "Intake JSON produced by the document extraction step")]
    pub intake: PathBuf,
    #[arg(long, help = "Rulebook file overriding `rulebook.path` (.yaml, .yml or .toml)")]
    pub rulebook: Option<PathBuf>,
    #[arg(long, help = "Write the artifact under `output.dir` instead of printing it")]
    pub write: bool,
}

pub(crate) fn load_intake(path: &Path) -> Result<IntakeDocument, ApplicationError> {
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Io(format!("could not read intake `{}`: {error}", path.display()))
    })?;
    Ok(IntakeDocument::from_json_str(&raw)?)
}

pub(crate) fn load_classifier(
    config: &AppConfig,
    rulebook_override: Option<&Path>,
) -> Result<ClauseClassifier, ApplicationError> {
    let path = rulebook_override.unwrap_or(config.rulebook.path.as_path());
    let rulebook = Rulebook::load(path)?;
    Ok(ClauseClassifier::new(rulebook.into_shared()))
}

pub(crate) fn analyze_intake(
    config: &AppConfig,
    args: &IntakeArgs,
) -> Result<(IntakeDocument, AnalysisResult), ApplicationError> {
    let document = load_intake(&args.intake)?;
    let classifier = load_classifier(config, args.rulebook.as_deref())?;
    let analysis = classifier.analyze(&document);
    Ok((document, analysis))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, ApplicationError> {
    serde_json::to_string_pretty(value)
        .map_err(|error| ApplicationError::Rendering(format!("could not serialize output: {error}")))
}

/// Prints the artifact, or writes it to `output.dir/<file_name>` and reports
/// the location.
pub(crate) fn emit(
    command: &str,
    config: &AppConfig,
    write: bool,
    file_name: &str,
    contents: String,
) -> Result<CommandResult, ApplicationError> {
    if !write {
        return Ok(CommandResult::artifact(contents));
    }

    let dir = &config.output.dir;
    fs::create_dir_all(dir).map_err(|error| {
        ApplicationError::Io(format!("could not create output dir `{}`: {error}", dir.display()))
    })?;
    let path = dir.join(file_name);
    fs::write(&path, contents).map_err(|error| {
        ApplicationError::Io(format!("could not write `{}`: {error}", path.display()))
    })?;

    tracing::info!(
        event_name = "cli.artifact_written",
        command,
        path = %path.display(),
        "artifact written"
    );
    Ok(CommandResult::success(command, format!("wrote {}", path.display())))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
