//! VTrade Onboarding - Digital asset issuance in the terminal
//!
//! A keyboard-driven client for the VTrade tokenization platform: sign in,
//! connect a wallet, and walk the seven-step issuance wizard.
//!
//! ## Features
//!
//! - **Auth screens:** sign-in, sign-up, and the forgot-password / OTP / reset chain
//! - **Wallet gating:** steps that need a signer stay locked until a wallet is connected
//! - **Resumable:** progress is saved to `~/.vtrade/session.json` and restored on start
//! - **Pluggable wallets:** a simulated provider or any JSON-RPC endpoint
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive mode
//! vtrade
//!
//! # Straight to the wizard
//! vtrade start --skip-auth
//!
//! # Where did I leave off?
//! vtrade status
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod onboarding;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorCode, OnboardError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
