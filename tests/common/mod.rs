// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use portal::{
    client::HttpAssessmentApi, config::Config, routes, state::AppState, storage::SessionStore,
};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use url::Url;

pub const QUIZ_ID: &str = "net-101";
pub const QUIZ_PASSWORD: &str = "Open Sesame";
pub const ESSAY_ID: &str = "moral-7";
pub const ESSAY_PASSWORD: &str = "essay-pass";
pub const EMPTY_GUIDELINES_ID: &str = "draft-5";
/// Quiz whose submission is answered only after a delay.
pub const SLOW_QUIZ_ID: &str = "slow-3";
/// Quiz whose submission is always rejected.
pub const BROKEN_QUIZ_ID: &str = "broken-4";

pub const REGISTRATION_NUMBER: &str = "EG/2019/1234";
pub const PASSWORD: &str = "secret123";

/// Requests the mock assessment API has received, keyed by path.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    fn push(&self, path: &str, body: Value) {
        self.calls.lock().unwrap().push((path.to_string(), body));
    }

    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

pub struct TestApp {
    pub address: String,
    pub upstream: Recorder,
    pub client: reqwest::Client,
}

fn quiz_fixture(id: &str, guidelines: Vec<&str>, password: &str) -> Value {
    let questions: Vec<Value> = (1..=10)
        .map(|n| {
            json!({
                "_id": format!("q{}", n),
                "questionText": format!("Question {}", n),
                "options": [
                    { "_id": format!("q{}-a", n), "text": "Right", "isCorrect": true },
                    { "_id": format!("q{}-b", n), "text": "Wrong", "isCorrect": false }
                ]
            })
        })
        .collect();

    json!({
        "assignment": {
            "_id": id,
            "title": "Computer Networks",
            "password": password,
            "timeLimit": 90,
            "guidelines": guidelines,
            "questions": questions
        }
    })
}

fn essay_fixture() -> Value {
    json!({
        "essayAssignment": {
            "_id": ESSAY_ID,
            "title": "Engineering Ethics",
            "password": ESSAY_PASSWORD,
            "guidelines": ["Write in full sentences"],
            "questions": [
                { "_id": "e1", "questionText": "Discuss safety.", "answer": "Model answer one" },
                { "_id": "e2", "questionText": "Discuss duty.", "answer": "Model answer two" }
            ]
        }
    })
}

async fn fetch_quiz(Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        QUIZ_ID => (StatusCode::OK, Json(quiz_fixture(QUIZ_ID, vec!["Work alone", "No notes"], QUIZ_PASSWORD))),
        EMPTY_GUIDELINES_ID => (StatusCode::OK, Json(quiz_fixture(EMPTY_GUIDELINES_ID, vec![], "empty"))),
        SLOW_QUIZ_ID | BROKEN_QUIZ_ID => (StatusCode::OK, Json(quiz_fixture(&id, vec!["Work alone"], QUIZ_PASSWORD))),
        _ => (StatusCode::NOT_FOUND, Json(json!({ "message": "Assignment not found" }))),
    }
}

async fn fetch_essay(Path(id): Path<String>) -> impl IntoResponse {
    if id == ESSAY_ID {
        (StatusCode::OK, Json(essay_fixture()))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": "Essay not found" })))
    }
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["registrationNumber"] == REGISTRATION_NUMBER && body["password"] == PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "accessToken": "upstream-access-token",
                "user": { "_id": "u1", "name": "Nimal Perera", "registrationNumber": REGISTRATION_NUMBER }
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid credentials" })),
        )
    }
}

async fn register(Json(body): Json<Value>) -> impl IntoResponse {
    match body["email"].as_str() {
        Some("taken@example.com") => (
            StatusCode::CONFLICT,
            Json(json!({ "success": false, "message": "User already exists" })),
        ),
        Some("activate@example.com") => (
            StatusCode::CREATED,
            Json(json!({ "success": true, "activationToken": "act/1 2" })),
        ),
        _ => (StatusCode::CREATED, Json(json!({ "success": true }))),
    }
}

/// Scores one point per option id ending in `-a`.
async fn submit_quiz(
    State(recorder): State<Recorder>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let score = body["answers"]
        .as_array()
        .map(|answers| {
            answers
                .iter()
                .filter(|a| a["selectedOptionId"].as_str().is_some_and(|o| o.ends_with("-a")))
                .count()
        })
        .unwrap_or(0);
    recorder.push(&format!("/submit/{}", id), body);

    match id.as_str() {
        BROKEN_QUIZ_ID => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Grader offline" })),
        ),
        _ => {
            if id == SLOW_QUIZ_ID {
                tokio::time::sleep(Duration::from_millis(400)).await;
            }
            (
                StatusCode::OK,
                Json(json!({ "success": true, "submission": { "score": score } })),
            )
        }
    }
}

async fn submit_essay(
    State(recorder): State<Recorder>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    recorder.push(&format!("/essay/submit/{}", id), body);
    Json(json!({ "success": true, "submission": { "score": 1 } }))
}

async fn feedback(State(recorder): State<Recorder>, Json(body): Json<Value>) -> impl IntoResponse {
    recorder.push("/feedback", body);
    (StatusCode::CREATED, Json(json!({ "success": true })))
}

async fn session_start(State(recorder): State<Recorder>, Json(body): Json<Value>) -> impl IntoResponse {
    recorder.push("/quiz-session/start", body);
    StatusCode::OK
}

/// Always fails; the portal must carry on regardless.
async fn session_complete(State(recorder): State<Recorder>, Json(body): Json<Value>) -> impl IntoResponse {
    recorder.push("/quiz-session/complete", body);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_upstream(recorder: Recorder) -> String {
    let app = Router::new()
        .route("/api/v1/login-user", post(login))
        .route("/api/v1/registration", post(register))
        .route("/api/v1/feedback/create", post(feedback))
        .route("/api/v1/quiz-session/start", post(session_start))
        .route("/api/v1/quiz-session/complete", post(session_complete))
        .route("/api/v1/essay/{id}", get(fetch_essay))
        .route("/api/v1/essay/{id}/submit", post(submit_essay))
        .route("/api/v1/{id}", get(fetch_quiz))
        .route("/api/v1/{id}/submit", post(submit_quiz))
        .with_state(recorder);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Spawns the mock assessment API and the portal on random ports.
pub async fn spawn_app() -> TestApp {
    let recorder = Recorder::default();
    let upstream_address = spawn_upstream(recorder.clone()).await;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    let store = SessionStore::new(pool);
    store.migrate().await.expect("Failed to migrate session store");

    let config = Config {
        api_base_url: Url::parse(&upstream_address).unwrap(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        remember_me_expiration: 3600,
        rust_log: "error".to_string(),
        port: 0,
    };

    let state = AppState {
        store,
        api: Arc::new(HttpAssessmentApi::new(config.api_base_url.clone())),
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        upstream: recorder,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }

    /// Opens a portal session and returns its bearer token.
    pub async fn new_session(&self) -> String {
        let response = self
            .client
            .post(self.url("/sessions"))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 201);

        let body: Value = response.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, token: &str, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// New session, signed in as the fixture student.
    pub async fn signed_in_session(&self) -> String {
        let token = self.new_session().await;
        let response = self
            .post(
                &token,
                "/auth/signin",
                json!({ "registrationNumber": REGISTRATION_NUMBER, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 200);
        token
    }

    /// Opens and unlocks a module.
    pub async fn unlock(&self, token: &str, id: &str, password: &str) {
        let response = self.get(token, &format!("/modules/{}", id)).await;
        assert_eq!(response.status().as_u16(), 200);

        let response = self
            .post(token, &format!("/modules/{}/enter", id), json!({ "password": password }))
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }
}
