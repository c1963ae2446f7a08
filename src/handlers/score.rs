// src/handlers/score.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    error::AppError,
    flow::Step,
    scoring::ScoreCard,
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
pub struct ScoreView {
    pub title: String,
    #[serde(flatten)]
    pub card: ScoreCard,
}

pub async fn show_score(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active(&id)?;
    flow.require_reached(Step::Scoring, "view the score")?;

    let assessment = sealed.assessment();
    let score = session.score.clone().unwrap_or(Value::Null);

    Ok(Json(ScoreView {
        title: assessment.title().to_string(),
        card: ScoreCard::new(score, assessment.question_count()),
    }))
}

pub async fn continue_from_score(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (_, flow) = session.active_mut(&id)?;
    let next = flow.continue_from_score()?;
    state.store.save(&claims.sub, &session).await?;

    let (message, redirect) = match next {
        Step::CorrectAnswers => ("Loading correct answers...", format!("/correct_answers/{}", id)),
        _ => ("Loading feedback...", format!("/feedback/{}", id)),
    };

    Ok(Json(json!({ "message": message, "redirect": redirect })))
}
