use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq)]
pub enum AppErrorType {
    PayloadValidationError,
    AuthError,
    AuthRequired,
    NetworkError,
    ApiError { code: String, message: String },
    JsonParseError,
    SerializationError,
    NotFoundError,
    CacheError,
    UnsupportedSchema,
    InternalServerError,
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{error_type:?}: {message:?}")]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: Option<String>,
    pub cause: Option<String>,
}

impl AppError {
    pub fn message(&self) -> String {
        match &*self {
            AppError {
                message: Some(message),
                ..
            } => message.clone(),

            AppError {
                message: None,
                error_type: AppErrorType::NotFoundError,
                ..
            } => "The requested item was not found".to_string(),
            _ => "An unexpected error has occurred".to_string(),
        }
    }

    pub fn validation_error(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::PayloadValidationError,
            message: Some(error.to_string()),
        }
    }

    pub fn unauthorized(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::AuthError,
            message: Some(error.to_string()),
        }
    }

    pub fn auth_required(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::AuthRequired,
            message: Some(error.to_string()),
        }
    }

    pub fn network_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::NetworkError,
            message: Some("Erro de conexão com o servidor".to_string()),
        }
    }

    pub fn not_found(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::NotFoundError,
            message: Some(error.to_string()),
        }
    }

    pub fn internal_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalServerError,
            message: Some(error.to_string()),
        }
    }

    pub fn unsupported_schema(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::UnsupportedSchema,
            message: Some(error.to_string()),
        }
    }

    /// True when the backend rejected the credential (401). The session
    /// store must reset to anonymous when it sees one of these.
    pub fn is_unauthorized(&self) -> bool {
        self.error_type == AppErrorType::AuthError
    }

    /// True when the action was refused locally because no user is
    /// logged in. The caller redirects to the login view; no request
    /// was sent.
    pub fn requires_login(&self) -> bool {
        self.error_type == AppErrorType::AuthRequired
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError {
            message: None,
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalServerError,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return AppError {
                cause: Some(error.to_string()),
                error_type: AppErrorType::JsonParseError,
                message: Some("Resposta inválida do servidor".to_string()),
            };
        }
        AppError::network_error(error)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::JsonParseError,
            message: Some("Resposta inválida do servidor".to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(error: validator::ValidationErrors) -> Self {
        AppError::validation_error(error)
    }
}

/// Wire envelope every backend endpoint answers with:
/// `{ success, data, message, error }`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Server-reported business errors come back verbatim, preferring
    /// the `error` field over `message` like the original web client.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Erro interno do servidor".to_string())
    }

    pub fn into_data(self, status_code: u16) -> Result<T, AppError> {
        if self.success {
            if let Some(data) = self.data {
                return Ok(data);
            }
        }
        let message = self.failure_message();
        Err(AppError {
            error_type: AppErrorType::ApiError {
                code: status_code.to_string(),
                message: message.clone(),
            },
            message: Some(message),
            cause: None,
        })
    }
}

pub fn parse_envelope<T: DeserializeOwned>(body: &str, status_code: u16) -> Result<T, AppError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body)?;
    envelope.into_data(status_code)
}
