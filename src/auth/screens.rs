//! Auth screen routing and precondition guards

use super::state::AuthState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScreen {
    SignIn,
    SignUp,
    ForgotPassword,
    VerifyOtp,
    ResetPassword,
}

impl AuthScreen {
    pub fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Create Account",
            Self::ForgotPassword => "Forgot Password",
            Self::VerifyOtp => "Enter OTP",
            Self::ResetPassword => "Reset Password",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Self::SignIn => "Welcome back! Sign in to continue tokenizing your assets.",
            Self::SignUp => "Join as an investor or a tokenizer.",
            Self::ForgotPassword => "Enter your email and we will send you an OTP.",
            Self::VerifyOtp => "Enter the OTP that we have sent to your email address",
            Self::ResetPassword => "Choose a new password for your account.",
        }
    }

    /// Screens that only make sense with an email on record
    pub fn needs_reset_email(&self) -> bool {
        matches!(self, Self::VerifyOtp | Self::ResetPassword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth(AuthScreen),
    Wizard,
}

/// Where the user actually lands when asking for `screen`. A missing
/// precondition sends them back to the screen that establishes it.
pub fn guard(screen: AuthScreen, auth: &AuthState) -> Route {
    if screen.needs_reset_email() && auth.email_for_reset.is_none() {
        tracing::debug!("{:?} without an email on record, redirecting", screen);
        return Route::Auth(AuthScreen::SignIn);
    }
    Route::Auth(screen)
}

/// Where to go after `screen` completed its request successfully
pub fn after_success(screen: AuthScreen, auth: &AuthState) -> Route {
    match screen {
        AuthScreen::SignIn => Route::Wizard,
        AuthScreen::SignUp => Route::Auth(AuthScreen::SignIn),
        AuthScreen::ForgotPassword => guard(AuthScreen::VerifyOtp, auth),
        AuthScreen::VerifyOtp if auth.email_for_reset.is_some() => {
            Route::Auth(AuthScreen::ResetPassword)
        }
        AuthScreen::VerifyOtp => Route::Wizard,
        AuthScreen::ResetPassword => Route::Auth(AuthScreen::SignIn),
    }
}
