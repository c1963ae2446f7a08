// src/handlers/mod.rs

use chrono::Utc;

use crate::{client::AssessmentApi, models::submission::QuizSessionEvent};

pub mod assignment;
pub mod auth;
pub mod correct_answers;
pub mod dashboard;
pub mod feedback;
pub mod guidelines;
pub mod module;
pub mod score;
pub mod session;
pub mod submission;

/// Best-effort quiz-session notification. Failures are logged and swallowed.
pub(crate) async fn report_quiz_session(api: &dyn AssessmentApi, quiz_id: &str, student_id: &str, completing: bool) {
    let event = QuizSessionEvent {
        quiz_id: quiz_id.to_string(),
        student_id: student_id.to_string(),
        timestamp: Utc::now(),
    };

    let result = if completing {
        api.complete_quiz_session(&event).await
    } else {
        api.start_quiz_session(&event).await
    };

    if let Err(e) = result {
        tracing::warn!("Quiz session notification for {} failed: {:?}", quiz_id, e);
    }
}
