//! Sign-in and session endpoints

use api_types::auth::{SessionView, SignIn};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::Session;

use crate::{ServerError, server::ServerState};

/// Exchanges credentials for a bearer token.
pub async fn sign_in(
    State(state): State<ServerState>,
    payload: Result<Json<SignIn>, JsonRejection>,
) -> Result<Json<SessionView>, ServerError> {
    let Json(payload) = payload?;
    let session = state
        .engine
        .sign_in(&payload.identifier, &payload.secret)
        .await?;
    tracing::info!("signed in {}", session.user_id);
    Ok(Json(session.into()))
}

/// The session attached by the auth layer, still valid.
pub async fn session(Extension(session): Extension<Session>) -> Json<SessionView> {
    Json(session.into())
}

pub async fn refresh(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.engine.refresh_session(&session.token).await?;
    Ok(Json(session.into()))
}

pub async fn sign_out(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.sign_out(&session.token).await?;
    tracing::info!("signed out {}", session.user_id);
    Ok(StatusCode::NO_CONTENT)
}
