use chrono::Utc;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;
use leasecheck_core::FrontendPackage;

use crate::commands::{analyze_intake, emit, to_json, CommandResult, IntakeArgs};

pub const OUTPUT_FILE: &str = "package.json";

pub fn run(config: &AppConfig, args: &IntakeArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("package", error))
}

fn execute(config: &AppConfig, args: &IntakeArgs) -> Result<CommandResult, ApplicationError> {
    let (document, analysis) = analyze_intake(config, args)?;
    let package = FrontendPackage::build(&document, analysis, Utc::now());
    emit("package", config, args.write, OUTPUT_FILE, to_json(&package)?)
}
