//! Text field normalization shared by transactions and wallets.

use super::error::LedgerError;

/// Width of the transaction title column.
pub const TITLE_MAX_CHARS: usize = 200;

/// Width of category and wallet name columns.
pub const NAME_MAX_CHARS: usize = 100;

/// Trims `value` and checks it is non-blank and at most `max` characters.
///
/// # Errors
///
/// `BlankField` for an empty or whitespace-only value, `FieldTooLong` when
/// the trimmed value does not fit its column.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, LedgerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::BlankField(field));
    }
    if trimmed.chars().count() > max {
        return Err(LedgerError::FieldTooLong { field, max });
    }
    Ok(trimmed.to_string())
}
