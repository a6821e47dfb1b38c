use thiserror::Error;

use crate::{
    artifacts::ArtifactError,
    domain::intake::IntakeError,
    guardrails::{GuardrailError, QaError},
    rulebook::RulebookError,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid rulebook: {0}")]
    InvalidRulebook(String),
    #[error("invalid intake document: {0}")]
    InvalidIntake(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("io failure: {0}")]
    Io(String),
    #[error("rendering failure: {0}")]
    Rendering(String),
    #[error("guardrail failure: {0}")]
    Guardrail(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "The input could not be processed. Check inputs and try again.",
            Self::ServiceUnavailable { .. } => {
                "A required file or resource is unavailable. Check paths and retry."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let correlation_id = "unassigned".to_owned();
        match value {
            ApplicationError::Domain(error) => {
                Self::BadRequest { message: error.to_string(), correlation_id }
            }
            ApplicationError::Io(message) => Self::ServiceUnavailable { message, correlation_id },
            ApplicationError::Rendering(message)
            | ApplicationError::Guardrail(message)
            | ApplicationError::Configuration(message) => Self::Internal { message, correlation_id },
        }
    }
}

impl From<RulebookError> for ApplicationError {
    fn from(value: RulebookError) -> Self {
        match value {
            RulebookError::Missing(_) | RulebookError::Read { .. } => Self::Io(value.to_string()),
            other => Self::Domain(DomainError::InvalidRulebook(other.to_string())),
        }
    }
}

impl From<IntakeError> for ApplicationError {
    fn from(value: IntakeError) -> Self {
        Self::Domain(DomainError::InvalidIntake(value.to_string()))
    }
}

impl From<ArtifactError> for ApplicationError {
    fn from(value: ArtifactError) -> Self {
        match value {
            ArtifactError::InvalidDate(_) | ArtifactError::InvalidEventWindow { .. } => {
                Self::Domain(DomainError::InvariantViolation(value.to_string()))
            }
            ArtifactError::Template(_) => Self::Rendering(value.to_string()),
        }
    }
}

impl From<GuardrailError> for ApplicationError {
    fn from(value: GuardrailError) -> Self {
        match value {
            GuardrailError::Missing(_) | GuardrailError::Read { .. } => Self::Io(value.to_string()),
            other => Self::Guardrail(other.to_string()),
        }
    }
}

impl From<QaError> for ApplicationError {
    fn from(value: QaError) -> Self {
        match value {
            QaError::MissingUserId => {
                Self::Domain(DomainError::InvariantViolation(value.to_string()))
            }
            QaError::Pattern(_) => Self::Guardrail(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::errors::{ApplicationError, DomainError, InterfaceError};
    use crate::guardrails::QaError;
    use crate::rulebook::RulebookError;

    #[test]
    fn domain_error_maps_to_bad_request_interface_error() {
        let interface = ApplicationError::from(DomainError::InvariantViolation(
            "clause list is empty".to_owned(),
        ))
        .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(
            interface.user_message(),
            "The input could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn missing_rulebook_maps_to_service_unavailable() {
        let interface = ApplicationError::from(RulebookError::Missing(PathBuf::from("rules.yaml")))
            .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn invalid_rule_maps_to_domain_error() {
        let error = ApplicationError::from(RulebookError::InvalidRule {
            position: 3,
            reason: "`id` must not be empty".to_owned(),
        });

        assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidRulebook(_))));
    }

    #[test]
    fn missing_user_id_is_a_bad_request() {
        let interface = ApplicationError::from(QaError::MissingUserId).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::BadRequest { .. }));
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface = ApplicationError::Configuration("rulebook path is empty".to_owned())
            .into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }
}
