//! Auth REST Client
//!
//! JSON over HTTPS against the `/auth` backend. Every failure is folded
//! into an [`ApiError`] carrying a user-facing message and a code.

use super::state::User;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub const NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Normalised API failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub code: Option<String>,
    pub status: Option<u16>,
}

impl ApiError {
    /// No response was received at all
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() {
                "Network error occurred".to_string()
            } else {
                message
            },
            code: Some(NETWORK_ERROR.to_string()),
            status: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.code.as_deref() == Some(NETWORK_ERROR)
    }

    /// Build from an error response. The message comes from `message`,
    /// then `error`, then the status line; the code from `code`, then the
    /// HTTP status.
    pub fn from_response(status: u16, body: &str) -> Self {
        let data: Option<Value> = serde_json::from_str(body).ok();
        let field = |name: &str| -> Option<String> {
            let v = data.as_ref()?.get(name)?;
            match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        };

        let message = field("message")
            .or_else(|| field("error"))
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        let code = field("code").or_else(|| Some(status.to_string()));

        Self {
            message,
            code,
            status: Some(status),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::from_response(status.as_u16(), ""),
            None => Self::network(e.to_string()),
        }
    }
}

/// Payload returned by every auth endpoint; absent fields default
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuthResponse {
    pub token: Option<String>,
    pub user: Option<User>,
    pub message: Option<String>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub role: String,
    pub individual_type: Option<String>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyOtpBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
struct ResetBody<'a> {
    email: &'a str,
    password: &'a str,
    token: &'a str,
}

#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl AuthClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bearer: None,
        })
    }

    /// Attach a session token to subsequent requests
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(body);
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} failed: {}", path, e);
            ApiError::network(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_response(status.as_u16(), &text);
            tracing::warn!("{} rejected ({}): {}", path, status, err.message);
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(AuthResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| ApiError {
            message: format!("Invalid response from server: {}", e),
            code: Some("INVALID_RESPONSE".to_string()),
            status: Some(status.as_u16()),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post("login", &LoginBody { email, password }).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post("register", request).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<AuthResponse, ApiError> {
        self.post("forgot-password", &EmailBody { email }).await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse, ApiError> {
        self.post("verify-otp", &VerifyOtpBody { email, otp }).await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        password: &str,
        token: &str,
    ) -> Result<AuthResponse, ApiError> {
        self.post(
            "reset-password",
            &ResetBody {
                email,
                password,
                token,
            },
        )
        .await
    }
}
