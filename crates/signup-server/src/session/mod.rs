//! Registration sessions.
//!
//! A session is one pass through the registration screen: it owns the form
//! being filled in and the orchestrator for its submissions. Nothing is
//! persisted; a session disappears on success, when the client ends it, or
//! once it outlives the configured TTL.

mod registry;

pub use registry::{SessionRegistry, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL};

use chrono::{DateTime, Utc};
use signup_core::{
    AccountProvider, Field, FieldEdit, FieldErrorSet, FormState, RegistrationForm,
    SignupOrchestrator, SubmissionState, SubmitOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Point-in-time copy of a session's state.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub form: RegistrationForm,
    pub errors: FieldErrorSet,
    pub state: SubmissionState,
}

/// One registration session.
pub struct SignupSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    form: Mutex<FormState>,
    orchestrator: SignupOrchestrator,
}

impl SignupSession {
    /// Open a session in the `Idle` state.
    pub fn new(provider: Arc<dyn AccountProvider>) -> Self {
        let id = Uuid::new_v4();

        let mut form = FormState::new();
        form.subscribe(move |event| {
            debug!(session_id = %id, field = %event.field(), "Form updated");
        });

        Self {
            id,
            created_at: Utc::now(),
            form: Mutex::new(form),
            orchestrator: SignupOrchestrator::new(provider),
        }
    }

    /// Apply one raw field edit.
    pub async fn edit(&self, field: Field, raw: &str) -> (FieldEdit, String) {
        let mut form = self.form.lock().await;
        let edit = form.edit(field, raw);
        let value = form.form().value(field).to_string();
        (edit, value)
    }

    /// Submit the form as it currently stands.
    ///
    /// The form lock is released before the provider is called, so edits
    /// made while submitting apply to the next attempt.
    pub async fn submit(&self) -> SubmitOutcome {
        let form = self.form.lock().await.form().clone();
        self.orchestrator.submit(&form).await
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// True once the session is at least `ttl` old at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.created_at)
            .to_std()
            .map(|age| age >= ttl)
            .unwrap_or(false)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let form = self.form.lock().await;
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            form: form.form().clone(),
            errors: form.errors().clone(),
            state: self.orchestrator.state(),
        }
    }
}
