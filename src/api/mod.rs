//! Backend REST client.
//!
//! One thin client over `reqwest` with the base URL validated up front,
//! bearer auth from the saved session, and a single response/envelope
//! handling path shared by every route. Resource methods live in the
//! submodules, grouped the way the backend groups its routes.

pub mod agenda;
pub mod auth;
pub mod consultations;
pub mod files;
pub mod history;
pub mod mail;
pub mod patients;
pub mod reports;
pub mod users;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::models::Envelope;
use crate::session::Session;

/// Client-side errors for backend interactions.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not logged in; run `login` first")]
    NotAuthenticated,

    #[error("The backend rejected the session token")]
    Unauthorized,

    #[error("A session is already active for this user; log out first")]
    SessionActive,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Backend error (code {code}): {message}")]
    Backend { code: String, message: String },

    #[error("The backend returned no data")]
    EmptyData,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(String),
}

/// REST client for the practice-management backend.
#[derive(Debug)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    /// Create a new client from config, carrying the saved session if any.
    pub fn new(config: &Config, session: Option<Session>) -> Result<Self, ApiError> {
        let cleaned_url = config.api_base_url.trim_end_matches('/');

        let parsed = url::Url::parse(cleaned_url)
            .map_err(|e| ApiError::UrlError(format!("Invalid URL '{}': {}", cleaned_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::UrlError(format!(
                "URL must use http or https scheme, got: {}",
                parsed.scheme()
            )));
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: cleaned_url.to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The saved session, or a not-logged-in error.
    pub fn session(&self) -> Result<&Session, ApiError> {
        self.session.as_ref().ok_or(ApiError::NotAuthenticated)
    }

    /// Practice id of the logged-in user, as it appears in route paths.
    pub fn empresa_id(&self) -> Result<String, ApiError> {
        Ok(self.session()?.user.empresa_id())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn attach_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// GET a route and return the envelope's `data` (`Null` when absent).
    pub(crate) async fn get_data(&self, path: &str) -> Result<Value, ApiError> {
        debug!(path, "GET");
        let response = self.attach_auth(self.http_client.get(self.url(path))).send().await?;
        Self::unwrap_envelope(self.handle_response(response).await?)
    }

    /// POST a JSON body and return the envelope's `data`.
    pub(crate) async fn post_data<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        debug!(path, "POST");
        let response = self
            .attach_auth(self.http_client.post(self.url(path)).json(body))
            .send()
            .await?;
        Self::unwrap_envelope(self.handle_response(response).await?)
    }

    /// PATCH a JSON body and return the envelope's `data`.
    pub(crate) async fn patch_data<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        debug!(path, "PATCH");
        let response = self
            .attach_auth(self.http_client.patch(self.url(path)).json(body))
            .send()
            .await?;
        Self::unwrap_envelope(self.handle_response(response).await?)
    }

    /// DELETE a route and return the envelope's `data`.
    pub(crate) async fn delete_data(&self, path: &str) -> Result<Value, ApiError> {
        debug!(path, "DELETE");
        let response = self
            .attach_auth(self.http_client.delete(self.url(path)))
            .send()
            .await?;
        Self::unwrap_envelope(self.handle_response(response).await?)
    }

    /// POST a multipart form and return the envelope's `data`.
    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, ApiError> {
        debug!(path, "POST multipart");
        let response = self
            .attach_auth(self.http_client.post(self.url(path)).multipart(form))
            .send()
            .await?;
        Self::unwrap_envelope(self.handle_response(response).await?)
    }

    /// Deserialize the `data` payload into a typed model.
    pub(crate) fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
        if data.is_null() {
            return Err(ApiError::EmptyData);
        }
        Ok(serde_json::from_value(data)?)
    }

    /// Map HTTP status to the error taxonomy, then parse the envelope.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<Envelope<Value>, ApiError> {
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            reqwest::StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::AccessDenied(body))
            }
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Validation(body))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::Backend {
                    code: status.as_u16().to_string(),
                    message: body,
                })
            }
        }
    }

    /// An envelope with a non-200 code carries its error text in `data`.
    fn unwrap_envelope(envelope: Envelope<Value>) -> Result<Value, ApiError> {
        if !envelope.code_is_ok() {
            let message = match &envelope.data {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "no details".to_string(),
            };
            return Err(ApiError::Backend {
                code: envelope.code_text(),
                message,
            });
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
