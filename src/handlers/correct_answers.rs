// src/handlers/correct_answers.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    flow::Step,
    models::assessment::Assessment,
    state::AppState,
    utils::jwt::Claims,
};

/// Every quiz question with all options and their correctness flags.
pub async fn show_correct_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active(&id)?;
    flow.require(Step::CorrectAnswers, "view the correct answers")?;

    let Assessment::Quiz(quiz) = sealed.assessment() else {
        return Err(AppError::NotFound("Essays have no correct answers page".to_string()));
    };

    Ok(Json(json!({
        "title": quiz.title,
        "questions": quiz.questions
    })))
}

pub async fn continue_from_correct_answers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (_, flow) = session.active_mut(&id)?;
    flow.finish_correct_answers()?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({
        "message": "Loading feedback...",
        "redirect": format!("/feedback/{}", id)
    })))
}
