// src/handlers/feedback.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    flow::Step,
    models::submission::FeedbackRequest,
    state::AppState,
    storage::SessionState,
    utils::{html::clean_html, jwt::Claims},
};

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub feedback: String,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(form): Json<FeedbackForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (_, flow) = session.active(&id)?;
    flow.require(Step::Feedback, "send feedback")?;

    let feedback = clean_html(&form.feedback);
    if feedback.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Please enter some feedback or click 'Skip'".to_string(),
        ));
    }

    let request = FeedbackRequest {
        assignment_id: id.clone(),
        feedback,
    };
    state
        .api
        .create_feedback(&request)
        .await
        .map_err(|e| e.upstream_context("Failed to submit feedback. Please try again."))?;

    complete(&mut session, &id)?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({
        "message": "Thank you for your feedback!",
        "redirect": "/completed"
    })))
}

pub async fn skip_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    complete(&mut session, &id)?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({
        "message": "Moving to completed assignments",
        "redirect": "/completed"
    })))
}

fn complete(session: &mut SessionState, id: &str) -> Result<(), AppError> {
    let (_, flow) = session.active_mut(id)?;
    flow.finish_feedback()?;
    session.record_completion();
    tracing::info!("Module {} completed", id);
    Ok(())
}
