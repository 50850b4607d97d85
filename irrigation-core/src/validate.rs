//! Checks on the two free-text inputs.

use crate::error::{Error, Result};

const MIN_LEN: usize = 2;

/// Words that end the session when typed at any prompt.
pub const EXIT_KEYWORDS: &[&str] = &["exit", "quit"];

pub fn is_exit_keyword(input: &str) -> bool {
    let input = input.trim();
    EXIT_KEYWORDS.iter().any(|k| input.eq_ignore_ascii_case(k))
}

/// Trimmed crop type, or a validation error.
pub fn crop_type(input: &str) -> Result<String> {
    non_trivial(input, "Crop type")
}

/// Trimmed location, or a validation error.
pub fn location(input: &str) -> Result<String> {
    non_trivial(input, "Location")
}

fn non_trivial(input: &str, what: &str) -> Result<String> {
    let value = input.trim();

    if value.is_empty() {
        return Err(Error::Validation(format!("{what} cannot be empty.")));
    }
    if value.chars().count() < MIN_LEN {
        return Err(Error::Validation(format!(
            "{what} must be at least {MIN_LEN} characters."
        )));
    }

    Ok(value.to_string())
}
