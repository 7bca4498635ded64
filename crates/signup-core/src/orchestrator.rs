//! Submission state machine.
//!
//! `Idle -> Validating -> Submitting -> {Succeeded, Failed}`, with a retry
//! from `Failed` (or a fresh attempt from `Succeeded`) going back through
//! `Validating`. At most one attempt is in flight per orchestrator.

use crate::error::SubmitError;
use crate::form::RegistrationForm;
use crate::provider::{AccountHandle, AccountProvider};
use crate::validators::validate_form;
use futures::FutureExt;
use secrecy::ExposeSecret;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Where a registration attempt currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded(AccountHandle),
    Failed(SubmitError),
}

impl SubmissionState {
    /// True while an attempt is in flight; resubmission must be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded(_) | SubmissionState::Failed(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&SubmitError> {
        match self {
            SubmissionState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Result of a call to [`SignupOrchestrator::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The account was created; the caller should move on to sign-in.
    Succeeded(AccountHandle),
    Failed(SubmitError),
    /// Another attempt was already in flight; nothing was done.
    Ignored,
}

/// Sequences validation and account creation for one form session.
pub struct SignupOrchestrator {
    provider: Arc<dyn AccountProvider>,
    state: watch::Sender<SubmissionState>,
}

impl SignupOrchestrator {
    pub fn new(provider: Arc<dyn AccountProvider>) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self { provider, state }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// Observe every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Run one registration attempt.
    ///
    /// Ignored while another attempt is validating or submitting. Every
    /// failure, local or provider-side, ends in `Failed` with a mapped
    /// [`SubmitError`].
    #[instrument(skip_all)]
    pub async fn submit(&self, form: &RegistrationForm) -> SubmitOutcome {
        let started = self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            *state = SubmissionState::Validating;
            true
        });
        if !started {
            debug!("Submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }

        if let Err(e) = validate_form(form) {
            info!(code = e.code(), "Registration rejected by local validation");
            let error = SubmitError::from(e);
            self.state.send_replace(SubmissionState::Failed(error.clone()));
            return SubmitOutcome::Failed(error);
        }

        self.state.send_replace(SubmissionState::Submitting);
        let guard = SubmittingGuard::new(&self.state);

        let call = self
            .provider
            .create_account(&form.email, form.passphrase.expose_secret());
        let result = AssertUnwindSafe(call).catch_unwind().await;

        let (state, outcome) = match result {
            Ok(Ok(handle)) => {
                info!(uid = %handle.uid, "Registration succeeded");
                (
                    SubmissionState::Succeeded(handle.clone()),
                    SubmitOutcome::Succeeded(handle),
                )
            }
            Ok(Err(e)) => {
                warn!(code = %e.code, error = %e.message, "Account provider rejected registration");
                let error = SubmitError::from(&e);
                (
                    SubmissionState::Failed(error.clone()),
                    SubmitOutcome::Failed(error),
                )
            }
            Err(_) => {
                error!("Account provider call panicked");
                (
                    SubmissionState::Failed(SubmitError::Authentication),
                    SubmitOutcome::Failed(SubmitError::Authentication),
                )
            }
        };

        guard.finish(state);
        outcome
    }
}

/// Clears the busy state when an in-flight provider call is dropped
/// before it completes.
struct SubmittingGuard<'a> {
    state: &'a watch::Sender<SubmissionState>,
    finished: bool,
}

impl<'a> SubmittingGuard<'a> {
    fn new(state: &'a watch::Sender<SubmissionState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, state: SubmissionState) {
        self.finished = true;
        self.state.send_replace(state);
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Registration attempt dropped while submitting");
        self.state.send_if_modified(|state| {
            if *state != SubmissionState::Submitting {
                return false;
            }
            *state = SubmissionState::Failed(SubmitError::Authentication);
            true
        });
    }
}
