use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod auth;
mod records;
mod server;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// The request could not be extracted: malformed JSON body, query or
    /// path. Keeps the status axum picked for it.
    Rejected { status: StatusCode, message: String },
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidCredentials | EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Corrupted(_) | EngineError::Hashing(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::Validation(_)
        | EngineError::InvalidRange(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Corrupted(detail) => {
            tracing::error!("corrupted record: {detail}");
            "internal server error".to_string()
        }
        EngineError::Hashing(detail) => {
            tracing::error!("secret hashing failed: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Rejected { status, message } => {
                tracing::debug!("rejected request: {message}");
                (status, message)
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

macro_rules! rejected_from {
    ($($rejection:ty),+) => {
        $(impl From<$rejection> for ServerError {
            fn from(value: $rejection) -> Self {
                Self::Rejected {
                    status: value.status(),
                    message: value.body_text(),
                }
            }
        })+
    };
}

rejected_from!(JsonRejection, QueryRejection, PathRejection);
