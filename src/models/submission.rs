// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    assessment::{AssessmentKind, EssayAssignment, QuizAssignment},
    progress::ProgressSnapshot,
    user::User,
};

/// One answered quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: String,
    pub selected_option_id: String,
}

/// Body of `POST /api/v1/{id}/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    pub user_id: String,
    pub answers: Vec<QuizAnswer>,
    pub start_time: DateTime<Utc>,
}

impl QuizSubmission {
    /// Only answered questions are sent; the server marks the rest incorrect.
    pub fn from_progress(
        quiz: &QuizAssignment,
        progress: &ProgressSnapshot,
        user_id: &str,
        start_time: DateTime<Utc>,
    ) -> Self {
        let answers = progress
            .user_answers
            .iter()
            .filter_map(|(index, option_id)| {
                quiz.questions.get(*index).map(|question| QuizAnswer {
                    question_id: question.id.clone(),
                    selected_option_id: option_id.clone(),
                })
            })
            .collect();

        Self {
            user_id: user_id.to_string(),
            answers,
            start_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssayAnswer {
    pub question_id: String,
    pub model_answer: String,
    pub student_answer: String,
}

/// Body of `POST /api/v1/essay/{id}/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EssaySubmission {
    pub assignment_id: String,
    pub user_id: String,
    pub registration_number: String,
    pub answers: Vec<EssayAnswer>,
    pub start_time: DateTime<Utc>,
}

impl EssaySubmission {
    /// Every question is sent, unanswered ones with an empty student answer.
    pub fn from_progress(
        essay: &EssayAssignment,
        progress: &ProgressSnapshot,
        user: &User,
        start_time: DateTime<Utc>,
    ) -> Self {
        let answers = essay
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| EssayAnswer {
                question_id: question.id.clone(),
                model_answer: question.answer.clone(),
                student_answer: progress.answer(index).unwrap_or_default().to_string(),
            })
            .collect();

        Self {
            assignment_id: essay.id.clone(),
            user_id: user.id.clone(),
            registration_number: user.registration_number.clone(),
            answers,
            start_time,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionResult {
    /// Raw score; numeric in practice but not guaranteed.
    #[serde(default)]
    pub score: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionResponse {
    #[serde(default)]
    pub success: bool,
    pub submission: Option<SubmissionResult>,
}

/// Body of `POST /api/v1/feedback/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub assignment_id: String,
    pub feedback: String,
}

/// Body of the best-effort `quiz-session/start` and `quiz-session/complete` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSessionEvent {
    pub quiz_id: String,
    pub student_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A finished attempt, listed on the completed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAssessment {
    pub assignment_id: String,
    pub title: String,
    pub module_type: AssessmentKind,
    pub score: serde_json::Value,
    pub percentage: Option<i64>,
    pub completed_at: DateTime<Utc>,
}
