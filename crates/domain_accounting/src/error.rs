//! Accounting mapping errors

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use core_kernel::{CoreError, PortError};

/// Reason a single parameter was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// A required slot or parameter was not supplied
    Required,
    /// The parameter is not recognized for the product type
    Unsupported,
    /// The value has the wrong JSON type or is out of range
    InvalidValue,
    /// The referenced GL account has a category the slot does not accept
    InvalidAccountCategory,
    /// The referenced charge is not of the kind the collection expects
    InvalidChargeKind,
}

/// One rejected parameter within a validation batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub parameter: String,
    pub code: ValidationCode,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.parameter, self.message)
    }
}

/// Every problem found in one request, reported together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, parameter: impl Into<String>, code: ValidationCode, message: impl Into<String>) {
        self.0.push(FieldError {
            parameter: parameter.into(),
            code,
            message: message.into(),
        });
    }

    pub fn required(&mut self, parameter: &str) {
        self.push(parameter, ValidationCode::Required, format!("The parameter `{}` is mandatory", parameter));
    }

    pub fn unsupported(&mut self, parameter: &str) {
        self.push(parameter, ValidationCode::Unsupported, format!("The parameter `{}` is not supported", parameter));
    }

    pub fn invalid(&mut self, parameter: &str, message: impl Into<String>) {
        self.push(parameter, ValidationCode::InvalidValue, message);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Returns true if the batch holds an error for `parameter`
    pub fn contains(&self, parameter: &str) -> bool {
        self.0.iter().any(|e| e.parameter == parameter)
    }

    /// Converts the batch into a `Result`, failing if any error was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Errors that can occur while configuring product accounting
#[derive(Debug, Error)]
pub enum MappingError {
    /// The payload failed validation; carries every error found
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Duplicate key in a collection or an existing mapping
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced product, GL account, payment type, charge or configuration does not exist
    #[error("{entity} with id {id} does not exist")]
    NotFound {
        entity: String,
        id: String,
    },

    /// The storage or reference adapter failed
    #[error("Port error: {0}")]
    Port(PortError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MappingError {
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        MappingError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MappingError::Conflict(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, MappingError::Validation(_))
    }

    /// Returns the validation batch, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            MappingError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for MappingError {
    fn from(errors: ValidationErrors) -> Self {
        MappingError::Validation(errors)
    }
}

impl From<PortError> for MappingError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => MappingError::NotFound { entity: entity_type, id },
            PortError::Conflict { message } => {
                MappingError::Conflict(format!("Mapping already exists: {}", message))
            }
            other => MappingError::Port(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collects_all_errors() {
        let mut errors = ValidationErrors::new();
        errors.required("fundSourceAccountId");
        errors.unsupported("bogus");

        assert_eq!(errors.len(), 2);
        assert!(errors.contains("bogus"));
        assert!(errors.to_string().contains("fundSourceAccountId"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_port_conflict_becomes_descriptive_conflict() {
        let error: MappingError = PortError::conflict("fund_source for loan:PRD-1").into();
        match error {
            MappingError::Conflict(message) => assert!(message.starts_with("Mapping already exists")),
            other => panic!("Expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_port_not_found_is_preserved() {
        let error: MappingError = PortError::not_found("GlAccount", "GL-9").into();
        assert!(matches!(error, MappingError::NotFound { .. }));
        assert!(error.to_string().contains("GL-9"));
    }
}
