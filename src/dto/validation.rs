//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a required text field holds more than whitespace.
pub fn validate_required_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required_text");
        err.message = Some("value must not be empty".into());
        return Err(err);
    }
    Ok(())
}
