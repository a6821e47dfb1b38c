use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;

use crate::commands::{analyze_intake, emit, to_json, CommandResult, IntakeArgs};

pub const OUTPUT_FILE: &str = "analysis.json";

pub fn run(config: &AppConfig, args: &IntakeArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("analyze", error))
}

fn execute(config: &AppConfig, args: &IntakeArgs) -> Result<CommandResult, ApplicationError> {
    let (_, analysis) = analyze_intake(config, args)?;
    emit("analyze", config, args.write, OUTPUT_FILE, to_json(&analysis)?)
}
