//! Common validation utilities.

use validator::ValidationError;

/// Maximum length of a serial number.
const MAX_SERIAL_NUMBER_LENGTH: usize = 64;

/// Maximum length of a free-text reason or note.
const MAX_NOTE_LENGTH: usize = 2000;

/// Maximum number of proof references attached to a single operation.
const MAX_PROOF_REFS: usize = 20;

/// Validates that a serial number is non-empty, trimmed and within length limits.
pub fn validate_serial_number(number: &str) -> Result<(), ValidationError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("serial_number_empty");
        err.message = Some("Serial number must not be empty".into());
        return Err(err);
    }
    if trimmed.len() != number.len() {
        let mut err = ValidationError::new("serial_number_whitespace");
        err.message = Some("Serial number must not have leading or trailing whitespace".into());
        return Err(err);
    }
    if number.len() > MAX_SERIAL_NUMBER_LENGTH {
        let mut err = ValidationError::new("serial_number_length");
        err.message = Some("Serial number must be at most 64 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a requested quantity is strictly positive.
pub fn validate_positive_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity > 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_positive");
        err.message = Some("Quantity must be greater than zero".into());
        Err(err)
    }
}

/// Validates that a required quantity is non-negative.
pub fn validate_non_negative_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("quantity_non_negative");
        err.message = Some("Quantity must not be negative".into());
        Err(err)
    }
}

/// Validates that a free-text note fits within the storage limit.
pub fn validate_note_length(note: &str) -> Result<(), ValidationError> {
    if note.len() <= MAX_NOTE_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("note_length");
        err.message = Some("Note must be at most 2000 characters".into());
        Err(err)
    }
}

/// Validates a list of opaque proof references (URLs or storage identifiers).
///
/// The engine never interprets reference contents, only bounds them.
pub fn validate_proof_refs(refs: &[String]) -> Result<(), ValidationError> {
    if refs.len() > MAX_PROOF_REFS {
        let mut err = ValidationError::new("proof_refs_count");
        err.message = Some("At most 20 proof references are allowed".into());
        return Err(err);
    }
    if refs.iter().any(|r| r.trim().is_empty()) {
        let mut err = ValidationError::new("proof_ref_empty");
        err.message = Some("Proof references must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Returns true when a justification note is present and non-blank.
pub fn has_justification(notes: &str) -> bool {
    !notes.trim().is_empty()
}
