// src/handlers/submission.rs

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
    models::{
        assessment::{Assessment, AssessmentKind},
        submission::{EssaySubmission, QuizSubmission},
    },
    scoring::ReviewSummary,
    state::AppState,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub title: String,
    pub module_type: AssessmentKind,
    #[serde(flatten)]
    pub summary: ReviewSummary,
    pub confirm_pending: bool,
}

pub async fn show_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active(&id)?;
    flow.require(Step::SubmissionReview, "review the submission")?;

    let assessment = sealed.assessment();
    Ok(Json(ReviewView {
        title: assessment.title().to_string(),
        module_type: assessment.kind(),
        summary: ReviewSummary::new(session.progress.answered_count(), assessment.question_count()),
        confirm_pending: flow.is_confirm_pending(),
    }))
}

/// "Go back": resume answering on the last question.
pub async fn go_back(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (sealed, flow) = session.active_mut(&id)?;
    let total = sealed.assessment().question_count();
    flow.return_to_answering()?;
    session.progress.rewind_to_last(total);
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({
        "redirect": format!("/assignment/{}", id),
        "progress": session.progress
    })))
}

/// Opens the confirm dialog.
pub async fn initiate_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let answered = session.progress.answered_count();
    let (sealed, flow) = session.active_mut(&id)?;
    let assessment = sealed.assessment();
    let summary = ReviewSummary::new(answered, assessment.question_count());
    let prompt = format!(
        "Are you sure you want to submit your {}? This action cannot be undone.",
        assessment.kind().noun()
    );
    flow.initiate_submission()?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({
        "prompt": prompt,
        "warning": summary.warning(),
        "answeredQuestions": summary.answered_questions,
        "totalQuestions": summary.total_questions
    })))
}

pub async fn cancel_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.context.require_user()?;

    let (_, flow) = session.active_mut(&id)?;
    flow.cancel_submission()?;
    state.store.save(&claims.sub, &session).await?;

    Ok(Json(json!({ "confirmPending": false })))
}

/// Confirms the dialog and submits the stored answers.
///
/// The flow only advances once the server has returned a score; a failed
/// submission leaves the student on the review page.
pub async fn confirm_submission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    let user = session.context.require_user()?.clone();

    let (_, flow) = session.active_mut(&id)?;
    flow.confirm_submission()?;
    state.store.save(&claims.sub, &session).await?;

    report_quiz_session(state.api.as_ref(), &id, &user.id, true).await;

    let started_at = session.started_at.unwrap_or_else(Utc::now);
    let (sealed, _) = session.active(&id)?;
    let kind = sealed.assessment().kind();
    let result = match sealed.assessment() {
        Assessment::Quiz(quiz) => {
            let submission = QuizSubmission::from_progress(quiz, &session.progress, &user.id, started_at);
            state.api.submit_quiz(&id, &submission).await
        }
        Assessment::Essay(essay) => {
            let submission = EssaySubmission::from_progress(essay, &session.progress, &user, started_at);
            state.api.submit_essay(&id, &submission).await
        }
    };

    let result = result.map_err(|e| {
        tracing::error!("Session {} failed to submit module {}: {:?}", claims.sub, id, e);
        e
    })?;

    session.score = Some(result.score);
    let (_, flow) = session.active_mut(&id)?;
    flow.record_score()?;
    session.progress.clear();
    state.store.save(&claims.sub, &session).await?;

    tracing::info!("Session {} submitted {} {}", claims.sub, kind.noun(), id);

    Ok(Json(json!({
        "message": format!("{} submitted successfully!", kind),
        "redirect": format!("/scorepage/{}", id)
    })))
}
