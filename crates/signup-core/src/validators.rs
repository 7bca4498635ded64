//! Field and form validators.
//!
//! All validators are pure: they return booleans or a [`ValidationError`]
//! and never touch submission state.

use crate::error::ValidationError;
use crate::form::RegistrationForm;
use regex::Regex;
use secrecy::ExposeSecret;
use std::sync::OnceLock;

/// Required tax identifier length.
pub const TAX_ID_LENGTH: usize = 11;

/// Accepted phone number lengths, area code included.
pub const PHONE_MIN_LENGTH: usize = 10;
pub const PHONE_MAX_LENGTH: usize = 11;

/// Required passphrase length.
pub const PASSPHRASE_LENGTH: usize = 6;

/// Known national two-digit area codes.
pub const VALID_AREA_CODES: [&str; 67] = [
    "11", "12", "13", "14", "15", "16", "17", "18", "19", //
    "21", "22", "24", "27", "28", //
    "31", "32", "33", "34", "35", "37", "38", //
    "41", "42", "43", "44", "45", "46", "47", "48", "49", //
    "51", "53", "54", "55", //
    "61", "62", "63", "64", "65", "66", "67", "68", "69", //
    "71", "73", "74", "75", "77", "79", //
    "81", "82", "83", "84", "85", "86", "87", "88", "89", //
    "91", "92", "93", "94", "95", "96", "97", "98", "99",
];

/// Monotonic 6-digit runs rejected as weak passphrases.
pub const WEAK_SEQUENCES: [&str; 10] = [
    "012345", "123456", "234567", "345678", "456789", //
    "987654", "876543", "765432", "654321", "543210",
];

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Matches `local@domain.tld`: no whitespace, exactly one `@`, and a dot in
/// the domain with at least one character on each side.
pub fn is_email_valid(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_tax_id_valid(tax_id: &str) -> bool {
    tax_id.len() == TAX_ID_LENGTH && is_all_digits(tax_id)
}

/// True when the first two characters of `phone` are a known area code.
pub fn is_area_code_valid(phone: &str) -> bool {
    phone
        .get(..2)
        .map(|ddd| VALID_AREA_CODES.contains(&ddd))
        .unwrap_or(false)
}

fn is_phone_length_valid(phone: &str) -> bool {
    (PHONE_MIN_LENGTH..=PHONE_MAX_LENGTH).contains(&phone.len()) && is_all_digits(phone)
}

pub fn is_phone_valid(phone: &str) -> bool {
    is_phone_length_valid(phone) && is_area_code_valid(phone)
}

pub fn is_passphrase_length_valid(passphrase: &str) -> bool {
    passphrase.len() == PASSPHRASE_LENGTH && is_all_digits(passphrase)
}

/// True for all-identical digits or one of the ten canonical sequences.
///
/// Other guessable patterns are accepted on purpose.
pub fn is_passphrase_weak(passphrase: &str) -> bool {
    let first = passphrase.chars().next();
    passphrase.chars().all(|c| Some(c) == first) || WEAK_SEQUENCES.contains(&passphrase)
}

pub fn are_all_fields_present(form: &RegistrationForm) -> bool {
    [
        form.tax_id.as_str(),
        form.full_name.as_str(),
        form.email.as_str(),
        form.phone_number.as_str(),
        form.passphrase.expose_secret().as_str(),
    ]
    .iter()
    .all(|value| !value.trim().is_empty())
}

/// Run the full validation chain, stopping at the first violated rule.
///
/// Order: presence, tax ID, e-mail, phone length, area code, passphrase
/// length, passphrase strength.
pub fn validate_form(form: &RegistrationForm) -> Result<(), ValidationError> {
    if !are_all_fields_present(form) {
        return Err(ValidationError::MissingFields);
    }
    if !is_tax_id_valid(&form.tax_id) {
        return Err(ValidationError::InvalidTaxIdLength);
    }
    if !is_email_valid(&form.email) {
        return Err(ValidationError::InvalidEmailFormat);
    }
    if !is_phone_length_valid(&form.phone_number) {
        return Err(ValidationError::InvalidPhone);
    }
    if !is_area_code_valid(&form.phone_number) {
        return Err(ValidationError::InvalidAreaCode);
    }

    let passphrase = form.passphrase.expose_secret();
    if !is_passphrase_length_valid(passphrase) {
        return Err(ValidationError::InvalidPassphraseLength);
    }
    if is_passphrase_weak(passphrase) {
        return Err(ValidationError::WeakPassphrase);
    }

    Ok(())
}

/// Local check performed before a sign-in attempt.
pub fn validate_login(email: &str, passphrase: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || passphrase.trim().is_empty() {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

/// Local check performed before requesting a password reset.
pub fn validate_password_reset(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !is_email_valid(email) {
        return Err(ValidationError::InvalidEmailFormat);
    }
    Ok(())
}

fn is_all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}
