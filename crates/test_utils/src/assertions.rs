//! Custom Test Assertions
//!
//! Assertion helpers for mapping errors and stored snapshots that give more
//! meaningful failure messages than a bare `assert!`.

use core_kernel::GlAccountId;
use domain_accounting::{
    CommandOutcome, ConfigurationSnapshot, MappingError, MappingSlot, ValidationCode, ValidationErrors,
};

/// Returns the validation batch of an error
///
/// # Panics
///
/// Panics if the error is not a validation failure
pub fn expect_validation(error: &MappingError) -> &ValidationErrors {
    error
        .validation_errors()
        .unwrap_or_else(|| panic!("Expected validation error, got {:?}", error))
}

/// Asserts that the batch holds an entry for `parameter` with `code`
pub fn assert_field_error(error: &MappingError, parameter: &str, code: ValidationCode) {
    let errors = expect_validation(error);
    assert!(
        errors.errors().iter().any(|e| e.parameter == parameter && e.code == code),
        "Expected {:?} on `{}`, got: {}",
        code,
        parameter,
        errors
    );
}

/// Asserts that the error is a not-found for `entity`
pub fn assert_not_found(error: &MappingError, entity: &str) {
    match error {
        MappingError::NotFound { entity: actual, .. } => assert_eq!(
            actual, entity,
            "Expected {} not found, got {} not found",
            entity, actual
        ),
        other => panic!("Expected {} not found, got {:?}", entity, other),
    }
}

pub fn assert_conflict(error: &MappingError) {
    assert!(
        matches!(error, MappingError::Conflict(_)),
        "Expected conflict, got {:?}",
        error
    );
}

/// Asserts that `slot` is bound to `gl_account_id`
pub fn assert_slot_bound(snapshot: &ConfigurationSnapshot, slot: MappingSlot, gl_account_id: i64) {
    match snapshot.gl_mapping(slot) {
        Some(mapping) => assert_eq!(
            mapping.gl_account_id,
            GlAccountId::new(gl_account_id),
            "Slot {} bound to {}, expected GL-{}",
            slot,
            mapping.gl_account_id,
            gl_account_id
        ),
        None => panic!("Slot {} is not bound", slot),
    }
}

pub fn assert_slot_unbound(snapshot: &ConfigurationSnapshot, slot: MappingSlot) {
    assert!(
        snapshot.gl_mapping(slot).is_none(),
        "Expected slot {} to be unbound",
        slot
    );
}

/// Asserts that the change map lists exactly `parameters`
pub fn assert_changed_parameters(outcome: &CommandOutcome, parameters: &[&str]) {
    let mut actual: Vec<&str> = outcome.changes.keys().map(String::as_str).collect();
    let mut expected = parameters.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected, "Unexpected change map: {:?}", outcome.changes);
}
