// src/handlers/assignment.rs

use std::collections::BTreeMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::AppError,
    flow::Step,
    models::assessment::{Assessment, AssessmentKind, PublicQuestion},
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweringView {
    pub title: String,
    pub module_type: AssessmentKind,
    pub time_limit: Option<u32>,
    pub questions: Vec<PublicQuestion>,
    pub user_answers: BTreeMap<usize, String>,
    pub current_question_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: String,
}

/// Answering page, restored from the saved progress.
pub async fn show_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active(&id)?;
    flow.require(Step::Answering, "answer questions")?;

    let assessment = sealed.assessment();
    Ok(Json(AnsweringView {
        title: assessment.title().to_string(),
        module_type: assessment.kind(),
        time_limit: session.time_limit,
        questions: assessment.public_questions(),
        user_answers: session.progress.user_answers.clone(),
        current_question_index: session.progress.current_question_index,
    }))
}

/// Saves one answer. Quiz answers must name an option of that question.
pub async fn record_answer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, index)): Path<(String, usize)>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let total = {
        let (sealed, flow) = session.active(&id)?;
        flow.require(Step::Answering, "answer questions")?;

        let assessment = sealed.assessment();
        if let Assessment::Quiz(quiz) = assessment {
            let known = quiz
                .questions
                .get(index)
                .is_some_and(|q| q.options.iter().any(|o| o.id == req.answer));
            if !req.answer.trim().is_empty() && !known && index < quiz.questions.len() {
                return Err(AppError::BadRequest(
                    "Unknown option for this question".to_string(),
                ));
            }
        }
        assessment.question_count()
    };

    session.progress.record(index, req.answer, total)?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(session.progress))
}

/// "Submit" on the answering page opens the review.
pub async fn review_assignment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (_, flow) = session.active_mut(&id)?;
    flow.begin_review()?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({ "redirect": format!("/submissionpage/{}", id) })))
}
