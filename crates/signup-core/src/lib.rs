//! Registration input validation and submission orchestration.
//!
//! - `sanitize`: keeps digit-only fields digit-only on every keystroke
//! - `validators`: pure field and form checks, plus the fixed-order chain
//! - `form`: the form record, live field errors and change subscriptions
//! - `orchestrator`: the submission state machine
//! - `provider`: the account-creation contract and an in-memory provider

pub mod error;
pub mod form;
pub mod orchestrator;
pub mod provider;
pub mod sanitize;
pub mod validators;

pub use error::{ProviderError, ProviderErrorCode, SubmitError, ValidationError};
pub use form::{Field, FieldEdit, FieldErrorSet, FormEvent, FormState, RegistrationForm};
pub use orchestrator::{SignupOrchestrator, SubmissionState, SubmitOutcome};
pub use provider::{AccountHandle, AccountProvider, MemoryAccountProvider};
pub use sanitize::{sanitize_digits, DigitField, Sanitized};
