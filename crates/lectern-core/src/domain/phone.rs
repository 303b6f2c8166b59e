//! Korean mobile number helpers.

use crate::error::FormError;

const PHONE_DIGITS: usize = 11;

pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Format a (possibly partial) phone number with dashes as the user types.
///
/// Non-digits are dropped first, so formatting already-dashed output is a no-op.
pub fn format_phone_number(input: &str) -> String {
    let mut digits = digits_only(input);
    digits.truncate(PHONE_DIGITS);

    match digits.len() {
        0..=3 => digits,
        4..=7 => format!("{}-{}", &digits[..3], &digits[3..]),
        8..=10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
    }
}

/// Digits-only phone number as the backend stores it.
pub fn normalize_phone(input: &str) -> Result<String, FormError> {
    let digits = digits_only(input);
    if digits.len() != PHONE_DIGITS {
        return Err(FormError::InvalidPhone);
    }
    Ok(digits)
}
