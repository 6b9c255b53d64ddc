//! Auth Screen Input
//!
//! Form buffers, focus and field errors for the five auth screens.

use super::events::keys;
use crate::auth::forms::{
    Field, FieldErrors, ForgotPasswordForm, OtpForm, ResetPasswordForm, SignInForm, SignUpForm,
};
use crate::auth::otp::OtpCountdown;
use crate::auth::{AuthScreen, IndividualType, UserRole};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the app should do after handling an auth key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCommand {
    None,
    /// Validate the current form and send it
    Submit,
    Navigate(AuthScreen),
    /// Ask for a new OTP
    Resend,
    Quit,
}

#[derive(Debug, Clone)]
pub struct AuthForms {
    pub sign_in: SignInForm,
    pub sign_up: SignUpForm,
    pub forgot: ForgotPasswordForm,
    pub otp: OtpForm,
    pub reset: ResetPasswordForm,
    pub focused: usize,
    pub errors: FieldErrors,
    pub countdown: OtpCountdown,
}

impl AuthForms {
    pub fn new(resend_secs: u32) -> Self {
        Self {
            sign_in: SignInForm::default(),
            sign_up: SignUpForm::default(),
            forgot: ForgotPasswordForm::default(),
            otp: OtpForm::default(),
            reset: ResetPasswordForm::default(),
            focused: 0,
            errors: FieldErrors::default(),
            countdown: OtpCountdown::new(resend_secs),
        }
    }

    /// Inputs shown on `screen`, top to bottom
    pub fn fields(&self, screen: AuthScreen) -> Vec<Field> {
        match screen {
            AuthScreen::SignIn => vec![Field::Email, Field::Password],
            AuthScreen::SignUp => {
                let mut fields = vec![
                    Field::UserType,
                    Field::EmailOrPhone,
                    Field::Password,
                    Field::ConfirmPassword,
                ];
                if self.sign_up.user_type == Some(UserRole::Tokenizer) {
                    fields.insert(1, Field::IndividualType);
                }
                fields
            }
            AuthScreen::ForgotPassword => vec![Field::Email],
            AuthScreen::VerifyOtp => vec![Field::Otp],
            AuthScreen::ResetPassword => vec![Field::Password, Field::ConfirmPassword],
        }
    }

    pub fn focused_field(&self, screen: AuthScreen) -> Option<Field> {
        self.fields(screen).get(self.focused).copied()
    }

    /// Text shown for `field` on `screen`
    pub fn value(&self, screen: AuthScreen, field: Field) -> String {
        let text = match (screen, field) {
            (AuthScreen::SignIn, Field::Email) => &self.sign_in.email,
            (AuthScreen::SignIn, Field::Password) => &self.sign_in.password,
            (AuthScreen::SignUp, Field::EmailOrPhone) => &self.sign_up.email_or_phone,
            (AuthScreen::SignUp, Field::Password) => &self.sign_up.password,
            (AuthScreen::SignUp, Field::ConfirmPassword) => &self.sign_up.confirm_password,
            (AuthScreen::SignUp, Field::UserType) => {
                return self
                    .sign_up
                    .user_type
                    .map(|r| match r {
                        UserRole::Investor => "Investor",
                        UserRole::Tokenizer => "Tokenizer",
                    })
                    .unwrap_or("Select a user type")
                    .to_string();
            }
            (AuthScreen::SignUp, Field::IndividualType) => {
                return self
                    .sign_up
                    .individual_type
                    .map(|t| t.label())
                    .unwrap_or("Select an individual type")
                    .to_string();
            }
            (AuthScreen::ForgotPassword, Field::Email) => &self.forgot.email,
            (AuthScreen::VerifyOtp, Field::Otp) => &self.otp.otp,
            (AuthScreen::ResetPassword, Field::Password) => &self.reset.password,
            (AuthScreen::ResetPassword, Field::ConfirmPassword) => &self.reset.confirm_password,
            _ => return String::new(),
        };
        text.clone()
    }

    fn text_mut(&mut self, screen: AuthScreen, field: Field) -> Option<&mut String> {
        match (screen, field) {
            (AuthScreen::SignIn, Field::Email) => Some(&mut self.sign_in.email),
            (AuthScreen::SignIn, Field::Password) => Some(&mut self.sign_in.password),
            (AuthScreen::SignUp, Field::EmailOrPhone) => Some(&mut self.sign_up.email_or_phone),
            (AuthScreen::SignUp, Field::Password) => Some(&mut self.sign_up.password),
            (AuthScreen::SignUp, Field::ConfirmPassword) => Some(&mut self.sign_up.confirm_password),
            (AuthScreen::ForgotPassword, Field::Email) => Some(&mut self.forgot.email),
            (AuthScreen::ResetPassword, Field::Password) => Some(&mut self.reset.password),
            (AuthScreen::ResetPassword, Field::ConfirmPassword) => {
                Some(&mut self.reset.confirm_password)
            }
            _ => None,
        }
    }

    /// Run the local checks for `screen`, keeping the errors for display
    pub fn validate(&mut self, screen: AuthScreen) -> bool {
        let result = match screen {
            AuthScreen::SignIn => self.sign_in.validate(),
            AuthScreen::SignUp => self.sign_up.validate(),
            AuthScreen::ForgotPassword => self.forgot.validate(),
            AuthScreen::VerifyOtp => self.otp.validate(),
            AuthScreen::ResetPassword => self.reset.validate(),
        };
        match result {
            Ok(()) => {
                self.errors = FieldErrors::default();
                true
            }
            Err(errors) => {
                tracing::debug!("{} form has {} invalid field(s)", screen.title(), errors.len());
                self.errors = errors;
                false
            }
        }
    }

    /// Reset focus and errors when another screen is shown
    pub fn enter(&mut self, screen: AuthScreen) {
        self.focused = 0;
        self.errors = FieldErrors::default();
        match screen {
            AuthScreen::VerifyOtp => self.otp = OtpForm::default(),
            AuthScreen::ResetPassword => self.reset = ResetPasswordForm::default(),
            _ => {}
        }
    }

    pub fn handle_key(&mut self, event: KeyEvent, screen: AuthScreen) -> AuthCommand {
        if keys::is_quit(&event) {
            return AuthCommand::Quit;
        }

        if let Some(cmd) = Self::link(&event, screen) {
            return cmd;
        }

        let count = self.fields(screen).len();
        if keys::is_next_field(&event) || keys::is_down(&event) {
            self.focused = (self.focused + 1) % count;
            return AuthCommand::None;
        }
        if keys::is_prev_field(&event) || keys::is_up(&event) {
            self.focused = (self.focused + count - 1) % count;
            return AuthCommand::None;
        }
        if keys::is_enter(&event) {
            return AuthCommand::Submit;
        }

        let Some(field) = self.focused_field(screen) else {
            self.focused = 0;
            return AuthCommand::None;
        };

        match field {
            Field::UserType => {
                if matches!(event.code, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                    self.sign_up.user_type = Some(match self.sign_up.user_type {
                        Some(UserRole::Investor) => UserRole::Tokenizer,
                        _ => UserRole::Investor,
                    });
                    if self.sign_up.user_type == Some(UserRole::Investor) {
                        self.sign_up.individual_type = None;
                    }
                }
            }
            Field::IndividualType => {
                let all = IndividualType::ALL;
                let current = self
                    .sign_up
                    .individual_type
                    .and_then(|t| all.iter().position(|a| *a == t));
                let next = match event.code {
                    KeyCode::Right | KeyCode::Char(' ') => {
                        Some(current.map_or(0, |i| (i + 1) % all.len()))
                    }
                    KeyCode::Left => Some(current.map_or(0, |i| (i + all.len() - 1) % all.len())),
                    _ => None,
                };
                if let Some(i) = next {
                    self.sign_up.individual_type = Some(all[i]);
                }
            }
            Field::Otp => match event.code {
                KeyCode::Char(c) => self.otp.push_digit(c),
                KeyCode::Backspace => {
                    self.otp.otp.pop();
                }
                _ => {}
            },
            _ => {
                if let Some(text) = self.text_mut(screen, field) {
                    match event.code {
                        KeyCode::Char(c)
                            if !event
                                .modifiers
                                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                        {
                            text.push(c);
                        }
                        KeyCode::Backspace => {
                            text.pop();
                        }
                        _ => {}
                    }
                }
            }
        }
        AuthCommand::None
    }

    pub fn handle_paste(&mut self, text: &str, screen: AuthScreen) {
        match self.focused_field(screen) {
            Some(Field::Otp) => text.chars().for_each(|c| self.otp.push_digit(c)),
            Some(field) => {
                if let Some(buf) = self.text_mut(screen, field) {
                    buf.push_str(text.trim());
                }
            }
            None => {}
        }
    }

    /// Links between screens
    fn link(event: &KeyEvent, screen: AuthScreen) -> Option<AuthCommand> {
        let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
        match (screen, event.code) {
            (AuthScreen::SignIn, KeyCode::Char('n')) if ctrl => {
                Some(AuthCommand::Navigate(AuthScreen::SignUp))
            }
            (AuthScreen::SignIn, KeyCode::Char('f')) if ctrl => {
                Some(AuthCommand::Navigate(AuthScreen::ForgotPassword))
            }
            (AuthScreen::VerifyOtp, KeyCode::Char('r')) if ctrl => Some(AuthCommand::Resend),
            (AuthScreen::VerifyOtp, KeyCode::Esc) => {
                Some(AuthCommand::Navigate(AuthScreen::ForgotPassword))
            }
            (AuthScreen::SignIn, KeyCode::Esc) => Some(AuthCommand::None),
            (_, KeyCode::Esc) => Some(AuthCommand::Navigate(AuthScreen::SignIn)),
            _ => None,
        }
    }
}
