// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, state::AppState, utils::jwt::Claims};

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    let user = session.context.require_user()?;

    let active_module = session
        .context
        .assessment
        .as_ref()
        .zip(session.assignment_id.as_ref())
        .map(|(sealed, id)| {
            json!({
                "id": id,
                "title": sealed.assessment().title(),
                "moduleType": sealed.assessment().kind(),
                "step": session.flow.as_ref().map(|flow| flow.step())
            })
        });

    Ok(Json(json!({
        "name": user.name,
        "signedIn": true,
        "activeModule": active_module,
        "completedCount": session.completed.len()
    })))
}

/// Finished attempts, most recent last.
pub async fn completed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    Ok(Json(json!({ "completed": session.completed })))
}
