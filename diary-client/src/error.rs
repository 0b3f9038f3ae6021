use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiaryClientError {
    // Сеть и разбор ответа
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    // Ответы сервера
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    // Проверки формы
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Not logged in, please log in first")]
    NotLoggedIn,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiaryClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiaryClientError::NotFound(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            DiaryClientError::Unauthorized(_) | DiaryClientError::NotLoggedIn
        )
    }

    /// 401 and 403 both end the session and send the user back to login.
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            DiaryClientError::Unauthorized(_) | DiaryClientError::Forbidden(_)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DiaryClientError::Validation(_))
    }

    /// Builds the error for a non-2xx response from its status and body.
    pub fn from_status(status: u16, body: &str, fallback: &str) -> Self {
        let message = crate::models::ApiErrorBody::message_from(body)
            .unwrap_or_else(|| fallback.to_string());

        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Api { status, message },
        }
    }
}
