use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use leasecheck_core::config::AppConfig;
use leasecheck_core::errors::ApplicationError;
use leasecheck_core::{planner_event, Calendar};

use crate::commands::{emit, load_intake, CommandResult};

pub const OUTPUT_FILE: &str = "task_schedule.ics";

#[derive(Debug, Clone, Args)]
pub struct CalendarArgs {
    #[arg(long, help = "Intake JSON produced by the document extraction step")]
    pub intake: PathBuf,
    #[arg(long, help = "Agreement date overriding the intake date (dd/mm/yy)")]
    pub date: Option<String>,
    #[arg(long, help = "Write the invite under `output.dir` instead of printing it")]
    pub write: bool,
}

pub fn run(config: &AppConfig, args: &CalendarArgs) -> CommandResult {
    execute(config, args).unwrap_or_else(|error| CommandResult::from_error("calendar", error))
}

fn execute(config: &AppConfig, args: &CalendarArgs) -> Result<CommandResult, ApplicationError> {
    let document = load_intake(&args.intake)?;
    let date_agreed = args.date.as_deref().or(document.date.as_deref());

    let now = Utc::now();
    let event = planner_event(&document.title, date_agreed, now)?;
    let ics = Calendar::default().with_event(event).to_ics(now);

    emit("calendar", config, args.write, OUTPUT_FILE, ics)
}
