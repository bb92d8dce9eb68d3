use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Failures of the binary: configuration, local files, terminal.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    View(#[from] ViewError),
}

/// Failures talking to the record store or the auth service.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session missing or expired")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Server(String),
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// What a view surfaces to the user.
///
/// `Validation` is raised before any request is made. `Auth` covers bad
/// credentials and missing sessions. `Store` carries the message of a failed
/// insert, list or delete. `Busy` refuses a second action while one is
/// outstanding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("{0}")]
    Validation(String),
    #[error("Aguarde a operação em andamento")]
    Busy,
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Store(String),
}

impl From<ClientError> for ViewError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::InvalidCredentials => {
                Self::Auth("Usuário ou senha inválidos".to_string())
            }
            ClientError::Unauthorized => {
                Self::Auth("Sessão expirada, faça login novamente".to_string())
            }
            ClientError::Validation(message) => Self::Validation(message),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<EngineError> for ViewError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::Validation(message) | EngineError::InvalidRange(message) => {
                Self::Validation(message)
            }
            EngineError::InvalidCredentials | EngineError::Unauthenticated => {
                Self::Auth(value.to_string())
            }
            other => Self::Store(other.to_string()),
        }
    }
}
