use chrono::Utc;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;
use leasecheck_core::NegotiationRider;

use crate::commands::{analyze_intake, emit, to_json, CommandResult, IntakeArgs};

pub const OUTPUT_FILE: &str = "amendment_rider.json";

pub fn run(config: &AppConfig, args: &IntakeArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("rider", error))
}

fn execute(config: &AppConfig, args: &IntakeArgs) -> Result<CommandResult, ApplicationError> {
    let (_, analysis) = analyze_intake(config, args)?;
    let rider = NegotiationRider::from_analysis(&analysis, Utc::now());
    emit("rider", config, args.write, OUTPUT_FILE, to_json(&rider)?)
}
