// src/client.rs

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    error::AppError,
    models::{
        assessment::{Assessment, EssayAssignment, EssayEnvelope, QuizAssignment, QuizEnvelope},
        submission::{
            EssaySubmission, FeedbackRequest, QuizSessionEvent, QuizSubmission, SubmissionResponse,
            SubmissionResult,
        },
        user::{
            Authenticated, LoginRequest, LoginResponse, RegistrationRequest, RegistrationResponse,
        },
    },
};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const SIGN_IN_FAILED: &str = "An error occurred. Please try again.";
pub const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";
pub const SUBMISSION_FAILED: &str = "An error occurred during submission. Please try again.";

/// The remote assessment API the portal drives.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    async fn fetch_quiz(&self, id: &str) -> Result<Option<QuizAssignment>, AppError>;

    async fn fetch_essay(&self, id: &str) -> Result<Option<EssayAssignment>, AppError>;

    async fn login(&self, request: &LoginRequest) -> Result<Authenticated, AppError>;

    /// Returns the activation token when the server asks for email activation.
    async fn register(&self, request: &RegistrationRequest) -> Result<Option<String>, AppError>;

    async fn submit_quiz(&self, id: &str, submission: &QuizSubmission) -> Result<SubmissionResult, AppError>;

    async fn submit_essay(&self, id: &str, submission: &EssaySubmission) -> Result<SubmissionResult, AppError>;

    async fn create_feedback(&self, feedback: &FeedbackRequest) -> Result<(), AppError>;

    async fn start_quiz_session(&self, event: &QuizSessionEvent) -> Result<(), AppError>;

    async fn complete_quiz_session(&self, event: &QuizSessionEvent) -> Result<(), AppError>;

    /// Resolves an id to a quiz or an essay. The quiz is asked for first and
    /// the essay only when no quiz exists, so a quiz wins if both do.
    async fn lookup(&self, id: &str) -> Result<Option<Assessment>, AppError> {
        if let Some(quiz) = self.fetch_quiz(id).await? {
            return Ok(Some(Assessment::Quiz(quiz)));
        }
        Ok(self.fetch_essay(id).await?.map(Assessment::Essay))
    }
}

/// `AssessmentApi` over HTTP. Timeouts are reqwest's defaults.
#[derive(Debug, Clone)]
pub struct HttpAssessmentApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAssessmentApi {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// `{base}/api/v1/{segments..}` with every segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::InternalServerError(format!(
                    "Assessment API base URL cannot carry a path: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// GETs an envelope; 404 means the resource does not exist.
    async fn fetch_envelope<T: DeserializeOwned + Send>(&self, url: Url) -> Result<Option<T>, AppError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::error!("GET {} answered {}", url, status);
            return Err(AppError::Upstream(format!("Assessment API answered {}", status)));
        }

        Ok(Some(response.json::<T>().await?))
    }

    async fn post_submission<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<SubmissionResult, AppError> {
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Submission to {} failed: {}", url, e);
                AppError::Upstream(SUBMISSION_FAILED.to_string())
            })?;

        let status = response.status();
        let parsed = response.json::<SubmissionResponse>().await.ok();

        match parsed {
            Some(SubmissionResponse {
                success: true,
                submission,
            }) if status.is_success() => Ok(submission.unwrap_or_default()),
            _ => {
                tracing::error!("Submission to {} rejected with {}", url, status);
                Err(AppError::Upstream(SUBMISSION_FAILED.to_string()))
            }
        }
    }

    async fn post_event<B: Serialize + Sync>(&self, url: Url, body: &B) -> Result<(), AppError> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "POST {} answered {}",
                url,
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AssessmentApi for HttpAssessmentApi {
    async fn fetch_quiz(&self, id: &str) -> Result<Option<QuizAssignment>, AppError> {
        let url = self.endpoint(&[id])?;
        Ok(self
            .fetch_envelope::<QuizEnvelope>(url)
            .await?
            .and_then(|envelope| envelope.assignment))
    }

    async fn fetch_essay(&self, id: &str) -> Result<Option<EssayAssignment>, AppError> {
        let url = self.endpoint(&["essay", id])?;
        Ok(self
            .fetch_envelope::<EssayEnvelope>(url)
            .await?
            .and_then(|envelope| envelope.essay_assignment))
    }

    /// Accepted when the server answers 200 or reports `success`.
    async fn login(&self, request: &LoginRequest) -> Result<Authenticated, AppError> {
        let url = self.endpoint(&["login-user"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Sign-in request failed: {}", e);
                AppError::AuthError(SIGN_IN_FAILED.to_string())
            })?;

        let status = response.status();
        let body = response.json::<LoginResponse>().await.ok();

        if !status.is_success() {
            let message = body
                .and_then(|b| b.message)
                .unwrap_or_else(|| SIGN_IN_FAILED.to_string());
            return Err(AppError::AuthError(message));
        }

        let body = body.ok_or_else(|| AppError::AuthError(SIGN_IN_FAILED.to_string()))?;
        if status != StatusCode::OK && !body.success {
            return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
        }

        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Ok(Authenticated { access_token, user }),
            _ => Err(AppError::AuthError(INVALID_CREDENTIALS.to_string())),
        }
    }

    /// Accepted when the server answers 201 or reports `success`.
    async fn register(&self, request: &RegistrationRequest) -> Result<Option<String>, AppError> {
        let url = self.endpoint(&["registration"])?;
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Registration request failed: {}", e);
                AppError::BadRequest(REGISTRATION_FAILED.to_string())
            })?;

        let status = response.status();
        let body = response.json::<RegistrationResponse>().await.ok();

        if !status.is_success() {
            let message = body
                .and_then(|b| b.message)
                .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
            return Err(AppError::BadRequest(message));
        }

        match body {
            Some(body) if status == StatusCode::CREATED || body.success => Ok(body.activation_token),
            None if status == StatusCode::CREATED => Ok(None),
            _ => Err(AppError::BadRequest(REGISTRATION_FAILED.to_string())),
        }
    }

    async fn submit_quiz(&self, id: &str, submission: &QuizSubmission) -> Result<SubmissionResult, AppError> {
        let url = self.endpoint(&[id, "submit"])?;
        self.post_submission(url, submission).await
    }

    async fn submit_essay(&self, id: &str, submission: &EssaySubmission) -> Result<SubmissionResult, AppError> {
        let url = self.endpoint(&["essay", id, "submit"])?;
        self.post_submission(url, submission).await
    }

    async fn create_feedback(&self, feedback: &FeedbackRequest) -> Result<(), AppError> {
        let url = self.endpoint(&["feedback", "create"])?;
        self.post_event(url, feedback).await
    }

    async fn start_quiz_session(&self, event: &QuizSessionEvent) -> Result<(), AppError> {
        let url = self.endpoint(&["quiz-session", "start"])?;
        self.post_event(url, event).await
    }

    async fn complete_quiz_session(&self, event: &QuizSessionEvent) -> Result<(), AppError> {
        let url = self.endpoint(&["quiz-session", "complete"])?;
        self.post_event(url, event).await
    }
}
