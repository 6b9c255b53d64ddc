//! Auth State
//!
//! Session user, token and the transient request status of the auth
//! screens. Errors and success messages are consumed at most once.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Investor,
    Tokenizer,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Investor => "investor",
            Self::Tokenizer => "tokenizer",
        }
    }
}

/// Organisation kind a tokenizer registers as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndividualType {
    Company,
    Broker,
    AssetIssuer,
    Institution,
}

impl IndividualType {
    pub const ALL: [IndividualType; 4] = [
        Self::Company,
        Self::Broker,
        Self::AssetIssuer,
        Self::Institution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Broker => "broker",
            Self::AssetIssuer => "asset_issuer",
            Self::Institution => "institution",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Broker => "Broker",
            Self::AssetIssuer => "Asset Issuer",
            Self::Institution => "Institution",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "userType")]
    pub role: Option<String>,
}

/// Bearer token, wiped from memory when dropped
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Which request is in flight, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOp {
    Login,
    Signup,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<AuthToken>,
    pub is_authenticated: bool,
    pub email_for_reset: Option<String>,

    #[serde(skip)]
    pub is_loading: bool,
    #[serde(skip)]
    error: Option<String>,
    #[serde(skip)]
    message: Option<String>,
    /// Token the OTP check handed back for the password reset
    #[serde(skip)]
    pub reset_token: Option<AuthToken>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, op: AuthOp) {
        tracing::debug!("Auth request started: {:?}", op);
        self.is_loading = true;
        self.error = None;
    }

    pub fn fail(&mut self, op: AuthOp, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("Auth request {:?} failed: {}", op, message);
        self.is_loading = false;
        self.error = Some(message);
    }

    pub fn login_succeeded(&mut self, user: Option<User>, token: Option<String>) {
        self.is_loading = false;
        self.is_authenticated = true;
        self.user = user;
        self.token = token.map(AuthToken::new);
        self.message = Some("Login successful".to_string());
        tracing::info!("Signed in");
    }

    pub fn signup_succeeded(&mut self, token: Option<String>) {
        self.is_loading = false;
        if let Some(t) = token {
            self.token = Some(AuthToken::new(t));
        }
        self.message = Some("Signup successful. Please verify your email.".to_string());
    }

    pub fn otp_sent(&mut self, email: &str) {
        self.is_loading = false;
        self.email_for_reset = Some(email.to_string());
        self.message = Some("OTP sent to your email".to_string());
    }

    pub fn otp_verified(&mut self, reset_token: Option<String>) {
        self.is_loading = false;
        self.reset_token = reset_token.map(AuthToken::new);
        self.message = Some("OTP verified successfully".to_string());
    }

    pub fn password_reset(&mut self) {
        self.is_loading = false;
        self.email_for_reset = None;
        self.reset_token = None;
        self.message = Some("Password reset successful".to_string());
    }

    pub fn logout(&mut self) {
        if let Some(mut token) = self.token.take() {
            token.zeroize();
        }
        self.user = None;
        self.is_authenticated = false;
        self.error = None;
        self.message = None;
        tracing::info!("Signed out");
    }

    pub fn set_email_for_reset(&mut self, email: impl Into<String>) {
        self.email_for_reset = Some(email.into());
    }

    pub fn clear_email_for_reset(&mut self) {
        self.email_for_reset = None;
    }

    /// Take the pending error, leaving none behind
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    /// Take the pending success message, leaving none behind
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn has_pending_message(&self) -> bool {
        self.message.is_some()
    }

    /// Drop transient request status after loading from storage
    pub fn normalize(&mut self) {
        self.is_loading = false;
        self.error = None;
        self.message = None;
        if self.token.is_none() && self.user.is_none() {
            self.is_authenticated = false;
        }
    }
}
