//! HTTP request handlers.

use super::types::{
    display_value, AccountCreatedResponse, HealthResponse, LoginRequest, MessageResponse,
    PasswordResetRequest, SessionCreatedResponse, SessionResponse, UpdateFieldRequest,
    UpdateFieldResponse,
};
use super::AppState;
use crate::error::ServiceError;
use crate::session::SignupSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use signup_core::validators::{validate_login, validate_password_reset};
use signup_core::{Field, SubmitOutcome};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let active_sessions = state.sessions.read().await.count();
    let accounts = state.accounts.count().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        active_sessions,
        accounts,
    })
}

/// Open a registration session.
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), ServiceError> {
    let session = SignupSession::new(state.provider());
    let session = state.sessions.write().await.insert(session)?;

    info!(session_id = %session.id, "Registration session opened");

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.id,
            state: "idle".to_string(),
        }),
    ))
}

/// Current view of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ServiceError> {
    let session = find_session(&state, id).await?;
    Ok(Json(SessionResponse::from(session.snapshot().await)))
}

/// Apply one raw edit to a field.
pub async fn update_field(
    State(state): State<AppState>,
    Path((id, field)): Path<(Uuid, String)>,
    Json(request): Json<UpdateFieldRequest>,
) -> Result<Json<UpdateFieldResponse>, ServiceError> {
    let field: Field = field.parse().map_err(ServiceError::UnknownField)?;
    let session = find_session(&state, id).await?;

    let (edit, value) = session.edit(field, &request.value).await;

    Ok(Json(UpdateFieldResponse {
        field,
        value: display_value(field, &value),
        error: edit.error,
    }))
}

/// Submit the session's form for account creation.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<AccountCreatedResponse>), ServiceError> {
    let session = find_session(&state, id).await?;
    info!(session_id = %id, "Registration submitted");

    match session.submit().await {
        SubmitOutcome::Succeeded(account) => {
            state.sessions.write().await.remove(&id);
            info!(session_id = %id, uid = %account.uid, "Registration completed, session closed");

            Ok((
                StatusCode::CREATED,
                Json(AccountCreatedResponse {
                    uid: account.uid,
                    email: account.email,
                    created_at: account.created_at.to_rfc3339(),
                    next: "login".to_string(),
                }),
            ))
        }
        SubmitOutcome::Failed(e) => {
            info!(session_id = %id, code = e.code(), "Registration failed");
            Err(e.into())
        }
        SubmitOutcome::Ignored => {
            warn!(session_id = %id, "Duplicate submission while in flight");
            Err(ServiceError::SubmissionInProgress)
        }
    }
}

/// End a session without submitting.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or(ServiceError::SessionNotFound(id))?;

    info!(session_id = %id, "Registration session closed");
    Ok(StatusCode::NO_CONTENT)
}

/// Check sign-in input before it is sent anywhere.
pub async fn check_login(
    Json(request): Json<LoginRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    validate_login(&request.email, &request.passphrase)?;

    Ok(Json(MessageResponse {
        message: "ok".to_string(),
    }))
}

/// Request password reset instructions.
///
/// The response is the same whether or not an account exists.
pub async fn password_reset(
    Json(request): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ServiceError> {
    validate_password_reset(&request.email)?;
    info!("Password reset requested");

    Ok(Json(MessageResponse {
        message: format!(
            "If an account exists for {}, instructions to reset the password were sent.",
            request.email
        ),
    }))
}

async fn find_session(state: &AppState, id: Uuid) -> Result<Arc<SignupSession>, ServiceError> {
    state
        .sessions
        .read()
        .await
        .get(&id)
        .ok_or(ServiceError::SessionNotFound(id))
}
