//! Error taxonomy for registration attempts.
//!
//! Local validation failures and provider failures end up in the same
//! [`SubmitError`] so callers only ever handle one shape.

use std::fmt;
use thiserror::Error;

/// Local validation failures, detected before the account provider is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("all fields are required")]
    MissingFields,

    #[error("please enter your e-mail")]
    MissingEmail,

    #[error("tax ID must have exactly 11 digits")]
    InvalidTaxIdLength,

    #[error("invalid e-mail format")]
    InvalidEmailFormat,

    #[error("phone number must have 10 or 11 digits including the area code")]
    InvalidPhone,

    #[error("invalid area code")]
    InvalidAreaCode,

    #[error("passphrase must have exactly 6 digits")]
    InvalidPassphraseLength,

    #[error("passphrase is too weak: avoid sequences and repeated digits")]
    WeakPassphrase,
}

impl ValidationError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => "MissingFields",
            ValidationError::MissingEmail => "MissingEmail",
            ValidationError::InvalidTaxIdLength => "InvalidTaxIdLength",
            ValidationError::InvalidEmailFormat => "InvalidEmailFormat",
            ValidationError::InvalidPhone => "InvalidPhone",
            ValidationError::InvalidAreaCode => "InvalidAreaCode",
            ValidationError::InvalidPassphraseLength => "InvalidPassphraseLength",
            ValidationError::WeakPassphrase => "WeakPassphrase",
        }
    }
}

/// Machine-readable failure code reported by the account provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    EmailAlreadyInUse,
    WeakPassword,
    /// Any code without a dedicated mapping.
    Other(String),
}

impl ProviderErrorCode {
    /// Parse a provider code, accepting an optional `auth/` namespace prefix.
    pub fn parse(code: &str) -> Self {
        let code = code.trim();
        match code.strip_prefix("auth/").unwrap_or(code) {
            "email-already-in-use" => ProviderErrorCode::EmailAlreadyInUse,
            "weak-password" => ProviderErrorCode::WeakPassword,
            other => ProviderErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProviderErrorCode::EmailAlreadyInUse => "email-already-in-use",
            ProviderErrorCode::WeakPassword => "weak-password",
            ProviderErrorCode::Other(code) => code,
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by an account provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("account provider error [{code}]: {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Build an error from a raw provider code string.
    pub fn from_code(code: &str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::parse(code), message)
    }
}

/// The single failure taxonomy of a registration attempt.
///
/// `Display` yields the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("email already registered")]
    EmailAlreadyRegistered,

    #[error("password rejected by provider policy")]
    PasswordRejected,

    #[error("authentication error, try again")]
    Authentication,
}

impl SubmitError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::Validation(e) => e.code(),
            SubmitError::EmailAlreadyRegistered => "EmailAlreadyRegistered",
            SubmitError::PasswordRejected => "PasswordRejected",
            SubmitError::Authentication => "AuthenticationError",
        }
    }

    /// Whether the failure was detected locally, before any provider call.
    pub fn is_local(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}

impl From<&ProviderError> for SubmitError {
    fn from(e: &ProviderError) -> Self {
        match e.code {
            ProviderErrorCode::EmailAlreadyInUse => SubmitError::EmailAlreadyRegistered,
            ProviderErrorCode::WeakPassword => SubmitError::PasswordRejected,
            ProviderErrorCode::Other(_) => SubmitError::Authentication,
        }
    }
}

impl From<ProviderError> for SubmitError {
    fn from(e: ProviderError) -> Self {
        SubmitError::from(&e)
    }
}
