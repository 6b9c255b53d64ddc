//! Error Types
//!
//! Crate-wide error type with stable error codes. Component errors
//! (wallet, API, session) convert into [`OnboardError`] at the seams
//! where they leave their module.

use crate::auth::client::ApiError;
use crate::onboarding::provider::WalletError;
use crate::onboarding::session::SessionError;
use thiserror::Error;

/// Stable, machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Api,
    Network,
    Wallet,
    Precondition,
    Session,
    Config,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::Api => "API_ERROR",
            Self::Network => "NETWORK_ERROR",
            Self::Wallet => "WALLET_ERROR",
            Self::Precondition => "PRECONDITION",
            Self::Session => "SESSION_ERROR",
            Self::Config => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum OnboardError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("Missing precondition: {0}")]
    Precondition(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OnboardError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Api(e) if e.is_network() => ErrorCode::Network,
            Self::Api(_) => ErrorCode::Api,
            Self::Wallet(_) => ErrorCode::Wallet,
            Self::Precondition(_) => ErrorCode::Precondition,
            Self::Session(_) => ErrorCode::Session,
            Self::Config(_) => ErrorCode::Config,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Whether the user can recover by retrying or navigating.
    /// Nothing in the wizard is fatal; only broken local setup is.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, OnboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            OnboardError::Validation("otp".into()).code(),
            ErrorCode::Validation
        );
        assert_eq!(
            OnboardError::Wallet(WalletError::NoAccounts).code(),
            ErrorCode::Wallet
        );
        assert_eq!(
            OnboardError::Api(ApiError::network("connection refused")).code(),
            ErrorCode::Network
        );
        assert_eq!(ErrorCode::Network.to_string(), "NETWORK_ERROR");
    }

    #[test]
    fn test_recoverable() {
        assert!(OnboardError::Wallet(WalletError::Timeout(45)).is_recoverable());
        assert!(OnboardError::Precondition("email".into()).is_recoverable());
        assert!(!OnboardError::Config("bad".into()).is_recoverable());
    }
}
