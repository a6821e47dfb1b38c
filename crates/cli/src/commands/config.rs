use std::env;
use std::fs;
use std::path::Path;

use leasecheck_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::CommandResult;

pub fn run(options: LoadOptions) -> CommandResult {
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            );
        }
    };
    crate::init_logging(&config);

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "rulebook.path",
        &display_path(&config.rulebook.path),
        source("rulebook.path", &["LEASECHECK_RULEBOOK_PATH"]),
    ));
    lines.push(render_line(
        "guardrails.path",
        &config.guardrails.path.as_deref().map(display_path).unwrap_or_else(|| "<unset>".into()),
        source("guardrails.path", &["LEASECHECK_GUARDRAILS_PATH"]),
    ));

    lines.push(render_line(
        "qa.disclaimer",
        &summarize(&config.qa.disclaimer),
        source("qa.disclaimer", &["LEASECHECK_QA_DISCLAIMER"]),
    ));
    lines.push(render_line(
        "qa.max_per_hour",
        &config.qa.max_per_hour.to_string(),
        source("qa.max_per_hour", &["LEASECHECK_QA_MAX_PER_HOUR"]),
    ));
    lines.push(render_line(
        "qa.policy_review",
        &config.qa.policy_review.to_string(),
        source("qa.policy_review", &["LEASECHECK_QA_POLICY_REVIEW"]),
    ));

    lines.push(render_line(
        "output.dir",
        &display_path(&config.output.dir),
        source("output.dir", &["LEASECHECK_OUTPUT_DIR"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["LEASECHECK_LOGGING_LEVEL", "LEASECHECK_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["LEASECHECK_LOGGING_FORMAT", "LEASECHECK_LOG_FORMAT"]),
    ));

    CommandResult::artifact(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    // Keys are listed in loader precedence, so the first one set is the one used.
    let env_key = env_keys
        .iter()
        .find(|key| env::var(**key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

// Disclaimers run long; the first line is enough to recognize one.
fn summarize(value: &str) -> String {
    let first_line = value.lines().next().unwrap_or_default();
    let shortened: String = first_line.chars().take(48).collect();
    if shortened.len() < value.len() {
        format!("{shortened}...")
    } else {
        shortened
    }
}
