// src/handlers/guidelines.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::{
    error::AppError,
    flow::Step,
    handlers::report_quiz_session,
    models::assessment::{AssessmentKind, format_time_limit},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidelinesView {
    pub title: String,
    pub module_type: AssessmentKind,
    pub guidelines: Vec<String>,
    pub time_limit: u32,
    pub time_limit_label: String,
}

pub async fn show_guidelines(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active(&id)?;
    flow.require_reached(Step::Guidelines, "view the guidelines")?;

    let assessment = sealed.assessment();
    let time_limit = assessment.time_limit();
    let view = GuidelinesView {
        title: assessment.title().to_string(),
        module_type: assessment.kind(),
        guidelines: assessment.guidelines().to_vec(),
        time_limit,
        time_limit_label: format_time_limit(time_limit),
    };

    if time_limit > 0 && session.time_limit != Some(time_limit) {
        session.time_limit = Some(time_limit);
        state.store.save(&claims.sub, &session).await?;
    }

    Ok(Json(view))
}

/// "Accept & continue". Starts the clock for the attempt.
pub async fn accept_guidelines(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    let student_id = session.context.require_user()?.id.clone();

    let (sealed, flow) = session.active_mut(&id)?;
    let guideline_count = sealed.assessment().guidelines().len();
    flow.accept_guidelines(guideline_count)?;

    let started_at = Utc::now();
    session.started_at = Some(started_at);
    state.store.save(&claims.sub, &session).await?;

    report_quiz_session(state.api.as_ref(), &id, &student_id, false).await;
    tracing::info!("Session {} started module {}", claims.sub, id);

    Ok(Json(json!({
        "message": "Loading the Assignment... Get Ready!",
        "redirect": format!("/assignment/{}", id)
    })))
}
