use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guardrails::qa::{QaSettings, DEFAULT_DISCLAIMER, DEFAULT_MAX_PER_HOUR};

pub const DEFAULT_CONFIG_FILE: &str = "leasecheck.toml";
pub const NESTED_CONFIG_FILE: &str = "config/leasecheck.toml";
pub const DEFAULT_RULEBOOK_PATH: &str = "config/rulebook.yaml";
pub const DEFAULT_OUTPUT_DIR: &str = "output";

const MAX_PER_HOUR_CEILING: u32 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub rulebook: RulebookConfig,
    pub guardrails: GuardrailsConfig,
    pub qa: QaConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RulebookConfig {
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GuardrailsConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QaConfig {
    pub disclaimer: String,
    pub max_per_hour: u32,
    pub policy_review: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub rulebook_path: Option<PathBuf>,
    pub guardrails_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub max_per_hour: Option<u32>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rulebook: RulebookConfig { path: PathBuf::from(DEFAULT_RULEBOOK_PATH) },
            guardrails: GuardrailsConfig::default(),
            qa: QaConfig {
                disclaimer: DEFAULT_DISCLAIMER.to_string(),
                max_per_hour: DEFAULT_MAX_PER_HOUR,
                policy_review: false,
            },
            output: OutputConfig { dir: PathBuf::from(DEFAULT_OUTPUT_DIR) },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl QaConfig {
    pub fn settings(&self) -> QaSettings {
        QaSettings {
            disclaimer: self.disclaimer.clone(),
            max_per_hour: self.max_per_hour,
            policy_review: self.policy_review,
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(rulebook) = patch.rulebook {
            if let Some(path) = rulebook.path {
                self.rulebook.path = path;
            }
        }

        if let Some(guardrails) = patch.guardrails {
            if let Some(path) = guardrails.path {
                self.guardrails.path = Some(path);
            }
        }

        if let Some(qa) = patch.qa {
            if let Some(disclaimer) = qa.disclaimer {
                self.qa.disclaimer = disclaimer;
            }
            if let Some(max_per_hour) = qa.max_per_hour {
                self.qa.max_per_hour = max_per_hour;
            }
            if let Some(policy_review) = qa.policy_review {
                self.qa.policy_review = policy_review;
            }
        }

        if let Some(output) = patch.output {
            if let Some(dir) = output.dir {
                self.output.dir = dir;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LEASECHECK_RULEBOOK_PATH") {
            self.rulebook.path = PathBuf::from(value);
        }
        if let Some(value) = read_env("LEASECHECK_GUARDRAILS_PATH") {
            self.guardrails.path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("LEASECHECK_QA_DISCLAIMER") {
            self.qa.disclaimer = value;
        }
        if let Some(value) = read_env("LEASECHECK_QA_MAX_PER_HOUR") {
            self.qa.max_per_hour = parse_u32("LEASECHECK_QA_MAX_PER_HOUR", &value)?;
        }
        if let Some(value) = read_env("LEASECHECK_QA_POLICY_REVIEW") {
            self.qa.policy_review = parse_bool("LEASECHECK_QA_POLICY_REVIEW", &value)?;
        }

        if let Some(value) = read_env("LEASECHECK_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(value);
        }

        let log_level =
            read_env("LEASECHECK_LOGGING_LEVEL").or_else(|| read_env("LEASECHECK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LEASECHECK_LOGGING_FORMAT").or_else(|| read_env("LEASECHECK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(rulebook_path) = overrides.rulebook_path {
            self.rulebook.path = rulebook_path;
        }
        if let Some(guardrails_path) = overrides.guardrails_path {
            self.guardrails.path = Some(guardrails_path);
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output.dir = output_dir;
        }
        if let Some(max_per_hour) = overrides.max_per_hour {
            self.qa.max_per_hour = max_per_hour;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_paths(self)?;
        validate_qa(&self.qa)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing config file: the explicit path, else `leasecheck.toml`,
/// else `config/leasecheck.toml`.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_paths(config: &AppConfig) -> Result<(), ConfigError> {
    if config.rulebook.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("rulebook.path must not be empty".to_string()));
    }

    if config.guardrails.path.as_ref().is_some_and(|path| path.as_os_str().is_empty()) {
        return Err(ConfigError::Validation(
            "guardrails.path must not be empty when set".to_string(),
        ));
    }

    if config.output.dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("output.dir must not be empty".to_string()));
    }

    Ok(())
}

fn validate_qa(qa: &QaConfig) -> Result<(), ConfigError> {
    if qa.disclaimer.trim().is_empty() {
        return Err(ConfigError::Validation("qa.disclaimer must not be empty".to_string()));
    }

    if qa.max_per_hour == 0 || qa.max_per_hour > MAX_PER_HOUR_CEILING {
        return Err(ConfigError::Validation(format!(
            "qa.max_per_hour must be in range 1..={MAX_PER_HOUR_CEILING}"
        )));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    rulebook: Option<RulebookPatch>,
    guardrails: Option<GuardrailsPatch>,
    qa: Option<QaPatch>,
    output: Option<OutputPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RulebookPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct GuardrailsPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct QaPatch {
    disclaimer: Option<String>,
    max_per_hour: Option<u32>,
    policy_review: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct OutputPatch {
    dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let config = AppConfig::default();
        config.validate().map_err(|err| format!("defaults should validate: {err}"))?;

        ensure(config.qa.max_per_hour == 20, "default rate limit should be 20/hour")?;
        ensure(config.guardrails.path.is_none(), "guardrails should be off by default")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_LEASECHECK_RULES_DIR", "/srv/rules");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("leasecheck.toml");
            fs::write(
                &path,
                r#"
[rulebook]
path = "${TEST_LEASECHECK_RULES_DIR}/rulebook.yaml"

[guardrails]
path = "${TEST_LEASECHECK_RULES_DIR}/guardrail.yaml"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.rulebook.path == PathBuf::from("/srv/rules/rulebook.yaml"),
                "rulebook path should be interpolated from environment",
            )?;
            ensure(
                config.guardrails.path == Some(PathBuf::from("/srv/rules/guardrail.yaml")),
                "guardrails path should be interpolated from environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_LEASECHECK_RULES_DIR"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&["TEST_LEASECHECK_UNSET"]);
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("leasecheck.toml");
        fs::write(&path, "[output]\ndir = \"${TEST_LEASECHECK_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_LEASECHECK_UNSET"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEASECHECK_LOG_LEVEL", "warn");
        env::set_var("LEASECHECK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["LEASECHECK_LOG_LEVEL", "LEASECHECK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEASECHECK_OUTPUT_DIR", "/tmp/from-env");
        env::set_var("LEASECHECK_QA_MAX_PER_HOUR", "5");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("leasecheck.toml");
            fs::write(
                &path,
                r#"
[rulebook]
path = "rules/from-file.yaml"

[output]
dir = "from-file"

[qa]
max_per_hour = 10
policy_review = true

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    rulebook_path: Some(PathBuf::from("rules/from-override.yaml")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.rulebook.path == PathBuf::from("rules/from-override.yaml"),
                "override rulebook path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.output.dir == PathBuf::from("/tmp/from-env"),
                "env output dir should win over file and defaults",
            )?;
            ensure(config.qa.max_per_hour == 5, "env rate limit should win over file")?;
            ensure(config.qa.policy_review, "file policy_review should survive")?;
            Ok(())
        })();

        clear_vars(&["LEASECHECK_OUTPUT_DIR", "LEASECHECK_QA_MAX_PER_HOUR"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEASECHECK_QA_MAX_PER_HOUR", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("qa.max_per_hour")
            );
            ensure(has_message, "validation failure should mention qa.max_per_hour")
        })();

        clear_vars(&["LEASECHECK_QA_MAX_PER_HOUR"]);
        result
    }

    #[test]
    fn malformed_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("LEASECHECK_QA_POLICY_REVIEW", "sometimes");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "LEASECHECK_QA_POLICY_REVIEW"),
                "error should name the malformed variable",
            )
        })();

        clear_vars(&["LEASECHECK_QA_POLICY_REVIEW"]);
        result
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing file failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if *path == missing),
            "error should carry the expected path",
        )
    }
}
