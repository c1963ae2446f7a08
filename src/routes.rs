// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{
        assignment, auth, correct_answers, dashboard, feedback, guidelines, module, score, session,
        submission,
    },
    state::AppState,
    storage::session_lock_middleware,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `POST /api/sessions` is public and hands out the bearer token.
/// * Every other route requires that token and runs under its session's lock.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new().route("/sessions", post(session::create_session));

    let auth_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/signin", post(auth::sign_in))
        .route("/logout", post(auth::logout));

    let module_routes = Router::new()
        .route("/{id}", get(module::open_module))
        .route("/{id}/enter", post(module::enter_module));

    let guideline_routes = Router::new()
        .route("/{id}", get(guidelines::show_guidelines))
        .route("/{id}/accept", post(guidelines::accept_guidelines));

    let assignment_routes = Router::new()
        .route("/{id}", get(assignment::show_assignment))
        .route("/{id}/answers/{index}", put(assignment::record_answer))
        .route("/{id}/review", post(assignment::review_assignment));

    let submission_routes = Router::new()
        .route("/{id}", get(submission::show_review))
        .route("/{id}/back", post(submission::go_back))
        .route("/{id}/initiate", post(submission::initiate_submission))
        .route("/{id}/cancel", post(submission::cancel_submission))
        .route("/{id}/confirm", post(submission::confirm_submission));

    let score_routes = Router::new()
        .route("/{id}", get(score::show_score))
        .route("/{id}/continue", post(score::continue_from_score));

    let correct_answer_routes = Router::new()
        .route("/{id}", get(correct_answers::show_correct_answers))
        .route("/{id}/continue", post(correct_answers::continue_from_correct_answers));

    let feedback_routes = Router::new()
        .route("/{id}", post(feedback::submit_feedback))
        .route("/{id}/skip", post(feedback::skip_feedback));

    let protected_routes = Router::new()
        .route("/sessions/current", get(session::current_session))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/completed", get(dashboard::completed))
        .nest("/auth", auth_routes)
        .nest("/modules", module_routes)
        .nest("/guidelines", guideline_routes)
        .nest("/assignment", assignment_routes)
        .nest("/submission", submission_routes)
        .nest("/score", score_routes)
        .nest("/correct-answers", correct_answer_routes)
        .nest("/feedback", feedback_routes)
        // Layers run bottom-up: auth first, then the per-session lock.
        .route_layer(middleware::from_fn_with_state(state.clone(), session_lock_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
