//! Authentication
//!
//! Sign-in, sign-up, and the forgot-password / OTP / reset chain.

pub mod client;
pub mod forms;
pub mod otp;
pub mod screens;
pub mod state;

pub use client::{ApiError, AuthClient, AuthResponse, RegisterRequest};
pub use screens::{AuthScreen, Route};
pub use state::{AuthState, AuthToken, IndividualType, User, UserRole};
