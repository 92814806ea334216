use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use std::time::Duration;

use crate::core::{ApiEnvelope, AppConfig, AppError};

/// Shared HTTP client for the backend API. Holds the base URL, the
/// bounded timeouts and the bearer credential; the credential cell is
/// written only by the session store.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_timeout: Duration,
    bearer: RwLock<Option<Secret<String>>>,
}

impl ApiClient {
    pub fn build(config: &AppConfig) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.backend_api.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.backend_api.base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload.request_timeout(),
            bearer: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    pub(crate) fn set_bearer(&self, token: Option<Secret<String>>) {
        if let Ok(mut bearer) = self.bearer.write() {
            *bearer = token;
        }
    }

    pub fn has_bearer(&self) -> bool {
        self.bearer
            .read()
            .map(|bearer| bearer.is_some())
            .unwrap_or(false)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.bearer.read() {
            Ok(bearer) => match bearer.as_ref() {
                Some(token) => builder.bearer_auth(token.expose_secret()),
                None => builder,
            },
            Err(_) => builder,
        }
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.get(self.endpoint(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.post(self.endpoint(path)))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.put(self.endpoint(path)))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.authorize(self.http.delete(self.endpoint(path)))
    }

    /// Sends the request and unwraps the `{success, data, ...}`
    /// envelope into `T`.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, AppError> {
        let response = builder.send().await.map_err(AppError::from)?;
        Self::decode(response).await
    }

    /// Same as [`execute`](Self::execute) for endpoints whose success
    /// reply carries no data block.
    pub(crate) async fn execute_empty(&self, builder: RequestBuilder) -> Result<(), AppError> {
        let response = builder.send().await.map_err(AppError::from)?;
        let status = response.status();
        let body = response.text().await.map_err(AppError::from)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::unauthorized(failure_message(&body, "Sessão expirada")));
        }

        let envelope: ApiEnvelope<serde_json::Value> = serde_json::from_str(&body)?;
        if status.is_success() && envelope.success {
            return Ok(());
        }
        let message = envelope.failure_message();
        Err(AppError {
            error_type: crate::core::AppErrorType::ApiError {
                code: status.as_u16().to_string(),
                message: message.clone(),
            },
            message: Some(message),
            cause: None,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
        let status = response.status();
        let body = response.text().await.map_err(AppError::from)?;

        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::unauthorized(failure_message(&body, "Sessão expirada")));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::not_found(failure_message(
                &body,
                "O recurso solicitado não foi encontrado",
            )));
        }

        crate::core::parse_envelope(&body, status.as_u16())
    }
}

/// Pulls the server's own wording out of an error body, falling back
/// to a generic message when the body is not the usual envelope.
fn failure_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .map(|envelope| envelope.failure_message())
        .unwrap_or_else(|_| fallback.to_string())
}
