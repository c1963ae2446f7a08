// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppError,
    models::user::{SignInForm, SignUpForm},
    state::AppState,
    utils::jwt::{Claims, sign_jwt},
};

/// `?module=<id>` when the student arrived through a module link.
#[derive(Debug, Default, Deserialize)]
pub struct EntryParams {
    pub module: Option<String>,
}

/// Registers a new student with the assessment API.
///
/// Validates every field first; nothing is sent upstream on failure.
pub async fn sign_up(
    State(state): State<AppState>,
    Query(params): Query<EntryParams>,
    Json(form): Json<SignUpForm>,
) -> Result<impl IntoResponse, AppError> {
    form.check()?;

    let activation_token = state.api.register(&form.into_request()).await?;

    let (redirect, info) = match activation_token {
        Some(token) => {
            let token: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
            (
                format!("/activate?token={}", token),
                Some("Please check your email to activate your account."),
            )
        }
        None => match params.module {
            Some(id) => (format!("/signin/{}", id), None),
            None => ("/signin".to_string(), None),
        },
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful!",
            "info": info,
            "redirect": redirect
        })),
    ))
}

/// Signs the student in and stores the upstream token in the session.
///
/// "Remember me" re-issues the portal token with the long lifetime.
pub async fn sign_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<EntryParams>,
    Json(form): Json<SignInForm>,
) -> Result<impl IntoResponse, AppError> {
    form.check()?;

    let authenticated = state.api.login(&form.to_request()).await.map_err(|e| {
        tracing::warn!("Sign-in failed for {}: {:?}", form.registration_number, e);
        e
    })?;

    let mut session = state.store.load(&claims.sub).await?;
    let name = authenticated.user.name.clone();
    session.context.sign_in(authenticated, form.remember_me);
    state.store.save(&claims.sub, &session).await?;

    let token = if form.remember_me {
        Some(sign_jwt(
            &claims.sub,
            &state.config.jwt_secret,
            state.config.remember_me_expiration,
        )?)
    } else {
        None
    };

    let redirect = match params.module {
        Some(id) => format!("/waiting/{}", id),
        None => "/dashboard".to_string(),
    };

    tracing::info!("Session {} signed in as {}", claims.sub, form.registration_number);

    Ok(Json(json!({
        "message": "Logged in successfully!",
        "name": name,
        "redirect": redirect,
        "token": token
    })))
}

/// Clears the user, the upstream token and the attempt in progress.
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let mut session = state.store.load(&claims.sub).await?;
    session.logout();
    state.store.save(&claims.sub, &session).await?;

    tracing::info!("Session {} signed out", claims.sub);

    Ok(Json(json!({ "redirect": "/signin" })))
}
