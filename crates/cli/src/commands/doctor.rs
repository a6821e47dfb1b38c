use leasecheck_core::config::{AppConfig, LoadOptions};
use leasecheck_core::{EmailRenderer, GuardrailPipeline, QaGuardrail, Rulebook};
use serde::Serialize;

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: [&str; 4] =
    ["rulebook_load", "guardrails_load", "qa_guardrail", "email_templates"];

pub fn run(options: LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 6 };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            crate::init_logging(&config);
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_rulebook(&config));
            checks.push(check_guardrails(&config));
            checks.push(check_qa(&config));
            checks.push(check_templates());
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.extend(DEPENDENT_CHECKS.into_iter().map(|name| DoctorCheck {
                name,
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            }));
        }
    }

    let all_pass = checks.iter().all(|check| check.status != CheckStatus::Fail);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_rulebook(config: &AppConfig) -> DoctorCheck {
    match Rulebook::load(&config.rulebook.path) {
        Ok(rulebook) if rulebook.is_empty() => DoctorCheck {
            name: "rulebook_load",
            status: CheckStatus::Pass,
            details: format!(
                "`{}` has no rules; every clause will classify as OK",
                config.rulebook.path.display()
            ),
        },
        Ok(rulebook) => DoctorCheck {
            name: "rulebook_load",
            status: CheckStatus::Pass,
            details: format!(
                "loaded {} rules from `{}`",
                rulebook.len(),
                config.rulebook.path.display()
            ),
        },
        Err(error) => {
            DoctorCheck { name: "rulebook_load", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_guardrails(config: &AppConfig) -> DoctorCheck {
    let Some(path) = &config.guardrails.path else {
        return DoctorCheck {
            name: "guardrails_load",
            status: CheckStatus::Skipped,
            details: "guardrails.path is not configured".to_string(),
        };
    };

    match GuardrailPipeline::load(path) {
        Ok(pipeline) => DoctorCheck {
            name: "guardrails_load",
            status: CheckStatus::Pass,
            details: format!("loaded {} guardrail rules from `{}`", pipeline.len(), path.display()),
        },
        Err(error) => DoctorCheck {
            name: "guardrails_load",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_qa(config: &AppConfig) -> DoctorCheck {
    match QaGuardrail::new(config.qa.settings()) {
        Ok(_) => DoctorCheck {
            name: "qa_guardrail",
            status: CheckStatus::Pass,
            details: format!("rate limit {}/hour", config.qa.max_per_hour),
        },
        Err(error) => {
            DoctorCheck { name: "qa_guardrail", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_templates() -> DoctorCheck {
    match EmailRenderer::new() {
        Ok(_) => DoctorCheck {
            name: "email_templates",
            status: CheckStatus::Pass,
            details: "embedded email templates compiled".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "email_templates",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
