// src/handlers/module.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    gate::{self, GateOutcome},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Deserialize)]
pub struct EnterModuleRequest {
    #[serde(default)]
    pub password: String,
}

/// Module page: loads the assessment behind the password gate.
pub async fn open_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let result = gate::open_module(&mut session, state.api.as_ref(), &id).await;
    // The module id is kept even when loading failed.
    state.store.save(&claims.sub, &session).await?;
    let view = result?;

    tracing::info!("Session {} opened {} module {}", claims.sub, view.module_type, id);

    Ok(Json(view))
}

/// Password attempt. Unlimited retries.
pub async fn enter_module(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<EnterModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    match gate::enter(&mut session, &id, &req.password)? {
        GateOutcome::Granted => {
            state.store.save(&claims.sub, &session).await?;
            tracing::info!("Session {} unlocked module {}", claims.sub, id);

            Ok(Json(json!({
                "message": "Access Granted",
                "redirect": format!("/guidelines/{}", id)
            })))
        }
        GateOutcome::Denied => {
            tracing::warn!("Session {} entered a wrong password for module {}", claims.sub, id);
            Err(AppError::AuthError("Incorrect Password".to_string()))
        }
    }
}
