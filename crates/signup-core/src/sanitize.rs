//! Per-keystroke sanitization of digit-only fields.

use serde::{Deserialize, Serialize};

/// Fields that only ever hold ASCII digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitField {
    TaxId,
    PhoneNumber,
    Passphrase,
}

impl DigitField {
    pub const ALL: [DigitField; 3] = [
        DigitField::TaxId,
        DigitField::PhoneNumber,
        DigitField::Passphrase,
    ];

    /// Label used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            DigitField::TaxId => "tax ID",
            DigitField::PhoneNumber => "phone number",
            DigitField::Passphrase => "passphrase",
        }
    }

    /// Message raised when an edit contained non-digit characters.
    pub fn digits_only_message(self) -> String {
        format!("{} accepts digits only", self.label())
    }
}

/// Result of sanitizing one raw edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    /// The digits of the raw input; always accepted as the new field content.
    pub value: String,
    /// Empty when the raw input was already digit-only.
    pub error: String,
    /// Whether `value` differs from the previous content.
    pub changed: bool,
}

/// Strip every non-digit from `raw`.
///
/// The edit is never refused: the stripped value always becomes the new
/// content, and `error` reports whether anything was removed.
pub fn sanitize_digits(raw: &str, previous: &str, field: DigitField) -> Sanitized {
    let value: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let error = if value.len() == raw.len() {
        String::new()
    } else {
        field.digits_only_message()
    };

    let changed = value != previous;

    Sanitized {
        value,
        error,
        changed,
    }
}
