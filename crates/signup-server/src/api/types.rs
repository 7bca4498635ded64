//! API request and response types.

use crate::session::SessionSnapshot;
use serde::{Deserialize, Serialize};
use signup_core::{Field, FieldErrorSet, SubmissionState};
use uuid::Uuid;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub active_sessions: usize,
    pub accounts: usize,
}

/// Response after opening a registration session.
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
    pub state: String,
}

/// Field values as shown to the client. The passphrase is masked.
#[derive(Debug, Serialize)]
pub struct FieldsView {
    pub tax_id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub passphrase: String,
}

/// Submission state as shown to the client.
#[derive(Debug, Serialize)]
pub struct StateView {
    pub status: String,
    pub busy: bool,
    /// User-facing message of the current failure
    pub error: Option<String>,
    pub code: Option<String>,
}

impl From<&SubmissionState> for StateView {
    fn from(state: &SubmissionState) -> Self {
        Self {
            status: state.name().to_string(),
            busy: state.is_busy(),
            error: state.error().map(|e| e.to_string()),
            code: state.error().map(|e| e.code().to_string()),
        }
    }
}

/// Full session view.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub created_at: String,
    pub fields: FieldsView,
    pub errors: FieldErrorSet,
    pub state: StateView,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(snapshot: SessionSnapshot) -> Self {
        let form = &snapshot.form;
        Self {
            session_id: snapshot.id,
            created_at: snapshot.created_at.to_rfc3339(),
            fields: FieldsView {
                tax_id: form.tax_id.clone(),
                full_name: form.full_name.clone(),
                email: form.email.clone(),
                phone_number: form.phone_number.clone(),
                passphrase: display_value(Field::Passphrase, form.value(Field::Passphrase)),
            },
            errors: snapshot.errors.clone(),
            state: StateView::from(&snapshot.state),
        }
    }
}

/// Request to replace a field's content with a raw edit.
#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub value: String,
}

/// Response after a field edit.
#[derive(Debug, Serialize)]
pub struct UpdateFieldResponse {
    pub field: Field,
    /// Stored value after sanitization
    pub value: String,
    /// Live error for the field, empty when the input was accepted as typed
    pub error: String,
}

/// Response after a successful submission.
#[derive(Debug, Serialize)]
pub struct AccountCreatedResponse {
    pub uid: Uuid,
    pub email: String,
    pub created_at: String,
    /// Where the client should go next
    pub next: String,
}

/// Request to check sign-in input.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub passphrase: String,
}

/// Request to send password reset instructions.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

/// Generic acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Mask secret field values for display.
pub fn display_value(field: Field, value: &str) -> String {
    match field {
        Field::Passphrase => "*".repeat(value.chars().count()),
        _ => value.to_string(),
    }
}
