// src/handlers/session.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{
    error::AppError,
    state::AppState,
    utils::jwt::{Claims, sign_jwt},
};

/// Opens a new portal session (one per browser tab).
///
/// Returns 201 Created and a bearer token for every other route.
pub async fn create_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session_id = state.store.create().await?;
    let token = sign_jwt(&session_id, &state.config.jwt_secret, state.config.jwt_expiration)?;

    tracing::info!("Created portal session {}", session_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "type": "Bearer"
        })),
    ))
}

/// Where the session currently stands.
pub async fn current_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;

    Ok(Json(json!({
        "step": session.flow.as_ref().map(|flow| flow.step()),
        "assignmentId": session.assignment_id,
        "signedIn": session.context.is_signed_in()
    })))
}
