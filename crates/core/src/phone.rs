//! Phone-number normalization
//!
//! The phone number is the identity key for a lead. Every phone value read
//! from a CSV upload or from the backing sheet must go through
//! [`normalize_phone`] before comparison or indexing, so that the same
//! logical number always produces the same key.

/// Normalize a raw phone value to its digits-only key.
///
/// Handles the artifacts seen in real uploads: surrounding whitespace,
/// punctuation ("98765-43210"), and the trailing ".0" that numeric-typed
/// spreadsheet cells grow when exported.
///
/// Idempotent: normalizing an already-normalized key is a no-op.
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_float_suffix = trimmed.strip_suffix(".0").unwrap_or(trimmed);
    without_float_suffix
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect()
}
