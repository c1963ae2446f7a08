// src/storage.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use axum::{
    Extension,
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    config::SESSION_STATE_VERSION,
    context::SessionContext,
    error::AppError,
    flow::AssessmentFlow,
    gate::SealedAssessment,
    models::{progress::ProgressSnapshot, submission::CompletedAssessment},
    scoring,
    utils::jwt::Claims,
};

/// Everything the portal remembers about one browser tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub version: u32,

    #[serde(default)]
    pub context: SessionContext,

    /// Id of the module last opened. Written before the password gate.
    #[serde(default)]
    pub assignment_id: Option<String>,

    #[serde(default)]
    pub flow: Option<AssessmentFlow>,

    /// Minutes, only stored when positive.
    #[serde(default)]
    pub time_limit: Option<u32>,

    #[serde(default)]
    pub progress: ProgressSnapshot,

    /// Set when the guidelines are accepted; sent as the submission start time.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// Raw score of the last submission.
    #[serde(default)]
    pub score: Option<Value>,

    #[serde(default)]
    pub completed: Vec<CompletedAssessment>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            version: SESSION_STATE_VERSION,
            context: SessionContext::default(),
            assignment_id: None,
            flow: None,
            time_limit: None,
            progress: ProgressSnapshot::default(),
            started_at: None,
            score: None,
            completed: Vec::new(),
        }
    }
}

impl SessionState {
    /// Records the module id. Switching to another module drops the
    /// attempt data of the previous one.
    pub fn record_module(&mut self, id: &str) {
        if self.assignment_id.as_deref() != Some(id) {
            self.reset_attempt();
            self.assignment_id = Some(id.to_string());
        }
    }

    /// Puts a freshly fetched assessment into the context and restarts the flow.
    pub fn load_assessment(&mut self, sealed: SealedAssessment) {
        self.flow = Some(AssessmentFlow::new(sealed.assessment().kind()));
        self.context.assessment = Some(sealed);
    }

    pub fn clear_assessment(&mut self) {
        self.context.assessment = None;
        self.flow = None;
    }

    /// The loaded assessment and its flow, if they belong to module `id`.
    pub fn active(&self, id: &str) -> Result<(&SealedAssessment, &AssessmentFlow), AppError> {
        match (&self.context.assessment, &self.flow) {
            (Some(sealed), Some(flow)) if self.assignment_id.as_deref() == Some(id) => Ok((sealed, flow)),
            _ => Err(no_active_assessment()),
        }
    }

    pub fn active_mut(&mut self, id: &str) -> Result<(&SealedAssessment, &mut AssessmentFlow), AppError> {
        if self.assignment_id.as_deref() != Some(id) {
            return Err(no_active_assessment());
        }
        match (&self.context.assessment, &mut self.flow) {
            (Some(sealed), Some(flow)) => Ok((sealed, flow)),
            _ => Err(no_active_assessment()),
        }
    }

    /// Appends the active attempt to the completed list.
    pub fn record_completion(&mut self) {
        let (Some(id), Some(sealed)) = (&self.assignment_id, &self.context.assessment) else {
            return;
        };
        let assessment = sealed.assessment();
        let score = self.score.clone().unwrap_or(Value::Null);

        self.completed.push(CompletedAssessment {
            assignment_id: id.clone(),
            title: assessment.title().to_string(),
            module_type: assessment.kind(),
            percentage: scoring::percentage(&score, assessment.question_count()),
            score,
            completed_at: Utc::now(),
        });
    }

    /// Sign-out: tears the context down along with the attempt in progress.
    /// The completed list survives.
    pub fn logout(&mut self) {
        self.context.teardown();
        self.reset_attempt();
        self.assignment_id = None;
    }

    fn reset_attempt(&mut self) {
        self.clear_assessment();
        self.time_limit = None;
        self.progress.clear();
        self.started_at = None;
        self.score = None;
    }
}

fn no_active_assessment() -> AppError {
    AppError::NotFound("No active assessment for this module".to_string())
}

pub fn encode_state(state: &SessionState) -> Result<String, AppError> {
    Ok(serde_json::to_string(state)?)
}

/// Decodes a stored payload. A payload from another version, or one that
/// no longer decodes, yields `None`.
pub fn decode_state(payload: &str) -> Option<SessionState> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let version = value.get("version").and_then(Value::as_u64);
    if version != Some(u64::from(SESSION_STATE_VERSION)) {
        tracing::warn!("Discarding session state with version {:?}", version);
        return None;
    }

    match serde_json::from_value(value) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!("Discarding undecodable session state: {}", e);
            None
        }
    }
}

type LockMap = Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>;

/// Exclusive access to one session until dropped.
pub struct SessionGuard {
    id: String,
    locks: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Nobody else holds or waits for this lock.
        if locks.get(&self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.id);
        }
    }
}

/// Session states keyed by portal session id, stored in SQLite.
#[derive(Debug, Clone)]
pub struct SessionStore {
    pool: SqlitePool,
    locks: LockMap,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            locks: LockMap::default(),
        }
    }

    /// Waits until no other request works on session `id`.
    pub async fn lock(&self, id: &str) -> SessionGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(id.to_string()).or_default().clone()
        };
        let guard = lock.lock_owned().await;

        SessionGuard {
            id: id.to_string(),
            locks: self.locks.clone(),
            guard: Some(guard),
        }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// Creates an empty session and returns its id.
    pub async fn create(&self) -> Result<String, AppError> {
        let id = Uuid::new_v4().to_string();
        self.save(&id, &SessionState::default()).await?;
        Ok(id)
    }

    /// Loads a session; unknown ids and discarded payloads give an empty one.
    pub async fn load(&self, id: &str) -> Result<SessionState, AppError> {
        let payload: Option<String> =
            sqlx::query_scalar::<_, String>("SELECT payload FROM portal_sessions WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to load session {}: {:?}", id, e);
                    AppError::from(e)
                })?;

        Ok(payload
            .as_deref()
            .and_then(decode_state)
            .unwrap_or_default())
    }

    pub async fn save(&self, id: &str, state: &SessionState) -> Result<(), AppError> {
        let payload = encode_state(state)?;

        sqlx::query(
            r#"
            INSERT INTO portal_sessions (id, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save session {}: {:?}", id, e);
            AppError::from(e)
        })?;

        Ok(())
    }
}

/// Axum Middleware: runs the requests of one session one at a time.
///
/// Handlers load, change, then save the whole state, sometimes with an
/// upstream call in between. Must be used AFTER `auth_middleware`.
pub async fn session_lock_middleware(
    State(store): State<SessionStore>,
    Extension(claims): Extension<Claims>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let _guard = store.lock(&claims.sub).await;
    next.run(req).await
}
