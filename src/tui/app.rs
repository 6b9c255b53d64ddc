//! TUI Application State
//!
//! Owns the auth slice, the wizard controller and every background task
//! (provider calls, settle timers, account polling, OTP countdown, auth
//! requests). Background work reports back through [`TuiEvent`]s; state is
//! only ever changed on the event loop.

use super::auth::{AuthCommand, AuthForms};
use super::events::{EventHandler, TuiEvent};
use super::onboarding::{WizardCommand, WizardInput};
use crate::auth::client::{AuthClient, AuthResponse, RegisterRequest};
use crate::auth::forms::Contact;
use crate::auth::otp::spawn_countdown;
use crate::auth::screens::{self, AuthScreen, Route};
use crate::auth::state::{AuthOp, AuthState};
use crate::auth::ApiError;
use crate::config::Config;
use crate::error::OnboardError;
use crate::onboarding::provider::{self, AccountsEvent};
use crate::onboarding::wallet::ConnectionTicket;
use crate::onboarding::{
    Action, ConnectingStatus, Effect, OnboardingController, PersistedSession, SessionStore,
};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Ticks a toast stays visible (the terminal ticks every 100 ms)
const TOAST_TICKS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    expires_at: usize,
}

pub struct App {
    // Core state
    pub route: Route,
    pub auth: AuthState,
    pub wizard: OnboardingController,

    // UI state
    pub auth_forms: AuthForms,
    pub wizard_input: WizardInput,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    // Animation state
    pub animation_frame: usize,

    config: Config,
    client: AuthClient,
    store: SessionStore,
    dirty: bool,

    event_handler: EventHandler,
    account_watch: Option<CancellationToken>,
    otp_timer: Option<CancellationToken>,
}

impl App {
    /// Build the app from configuration, resuming the stored session
    pub fn new(config: Config) -> Result<Self> {
        let store = SessionStore::new(config.session.path.clone());
        let session = store.load_or_default();
        let client = AuthClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )
        .map_err(OnboardError::from)?
        .with_bearer(session.auth.token.as_ref().map(|t| t.expose().to_string()));

        let wizard = OnboardingController::from_state(
            session.onboarding,
            Duration::from_millis(config.wallet.success_display_ms),
        );
        let mut wizard_input = WizardInput::new();
        wizard_input.sync(wizard.state());

        let route = if session.auth.is_authenticated {
            Route::Wizard
        } else {
            Route::Auth(AuthScreen::SignIn)
        };

        Ok(Self {
            route,
            auth: session.auth,
            wizard,
            auth_forms: AuthForms::new(config.otp.resend_secs),
            wizard_input,
            toast: None,
            should_quit: false,
            animation_frame: 0,
            config,
            client,
            store,
            dirty: false,
            event_handler: EventHandler::new(),
            account_watch: None,
            otp_timer: None,
        })
    }

    /// Go straight to the wizard without signing in
    pub fn skip_auth(&mut self) {
        tracing::info!("Skipping sign-in");
        self.route = Route::Wizard;
    }

    /// Start the background work a resumed session needs
    pub fn initialize(&mut self) {
        if self.wizard.state().wallet.is_connected() {
            self.start_account_watch();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get event sender
    pub fn event_sender(&self) -> mpsc::UnboundedSender<TuiEvent> {
        self.event_handler.sender()
    }

    /// Receive next event
    pub async fn next_event(&mut self) -> Option<TuiEvent> {
        self.event_handler.next().await
    }

    /// Handle an event
    pub async fn handle_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => self.handle_key_event(key_event),
            TuiEvent::Paste(text) => self.handle_paste(&text),
            TuiEvent::Quit => {
                self.should_quit = true;
            }
            TuiEvent::Tick => {
                self.animation_frame = self.animation_frame.wrapping_add(1);
                if self
                    .toast
                    .as_ref()
                    .is_some_and(|t| t.expires_at <= self.animation_frame)
                {
                    self.toast = None;
                }
                if self.dirty {
                    self.persist();
                }
            }
            TuiEvent::WalletResolved { attempt, outcome } => {
                if let Err(e) = &outcome {
                    tracing::warn!("Wallet connection attempt {} failed: {}", attempt, e);
                }
                self.apply(Action::ConnectionResolved { attempt, outcome });
                if self.wizard.state().wallet.connecting_status == ConnectingStatus::Error {
                    self.show_toast("Failed to connect wallet. Please try again.", ToastKind::Error);
                }
            }
            TuiEvent::WalletSettled { attempt } => {
                self.apply(Action::ConnectionSettled { attempt });
            }
            TuiEvent::AccountsChanged(AccountsEvent { provider, accounts }) => {
                let was_connected = self.wizard.state().wallet.is_connected();
                self.apply(Action::AccountsChanged { provider, accounts });
                if was_connected && !self.wizard.state().wallet.is_connected() {
                    self.show_toast("Wallet disconnected", ToastKind::Info);
                }
            }
            TuiEvent::OtpTick(remaining) => {
                self.auth_forms.countdown.set_remaining(remaining);
            }
            TuiEvent::AuthCompleted { screen, result } => {
                self.complete_auth(screen, result);
            }
            TuiEvent::Resize(_, _) => {
                // Handled by the render loop
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, event: crossterm::event::KeyEvent) {
        match self.route {
            Route::Auth(screen) => {
                if self.auth.is_loading {
                    if super::events::keys::is_quit(&event) {
                        self.should_quit = true;
                    }
                    return;
                }
                match self.auth_forms.handle_key(event, screen) {
                    AuthCommand::None => {}
                    AuthCommand::Submit => self.submit_auth(screen),
                    AuthCommand::Navigate(target) => self.navigate(target),
                    AuthCommand::Resend => self.resend_otp(),
                    AuthCommand::Quit => self.should_quit = true,
                }
            }
            Route::Wizard => {
                match self.wizard_input.handle_key(event, self.wizard.state()) {
                    WizardCommand::None => {}
                    WizardCommand::Dispatch(action) => self.apply(action),
                    WizardCommand::Logout => self.logout(),
                    WizardCommand::Quit => self.should_quit = true,
                }
            }
        }
    }

    fn handle_paste(&mut self, text: &str) {
        match self.route {
            Route::Auth(screen) => self.auth_forms.handle_paste(text, screen),
            Route::Wizard => {
                if let WizardCommand::Dispatch(action) =
                    self.wizard_input.handle_paste(text, self.wizard.state())
                {
                    self.apply(action);
                }
            }
        }
    }

    // --- Wizard ---

    /// Dispatch to the controller and carry out the returned effect
    pub fn apply(&mut self, action: Action) {
        match self.wizard.dispatch(action) {
            Effect::None => {}
            Effect::Changed => self.dirty = true,
            Effect::Blocked(reason) => {
                tracing::debug!("Action blocked: {}", reason);
                self.show_toast(reason.to_string(), ToastKind::Error);
            }
            Effect::Connect(ticket) => {
                self.dirty = true;
                self.spawn_connect(ticket);
            }
            Effect::SettleAfter { attempt, delay } => {
                self.dirty = true;
                self.show_toast("Wallet connected", ToastKind::Success);
                let tx = self.event_sender();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(TuiEvent::WalletSettled { attempt });
                });
                self.start_account_watch();
            }
            Effect::Issued(asset) => {
                self.dirty = true;
                tracing::info!("Asset {} submitted on {}", asset.symbol, asset.network);
            }
        }

        if !self.wizard.state().wallet.is_connected() {
            self.stop_account_watch();
        }
        self.wizard_input.sync(self.wizard.state());
    }

    fn spawn_connect(&self, ticket: ConnectionTicket) {
        let tx = self.event_sender();
        let wallet = self.config.wallet.clone();
        tracing::info!("Connecting {} (attempt {})", ticket.provider, ticket.attempt);

        tokio::spawn(async move {
            let timeout = Duration::from_secs(wallet.connect_timeout_secs);
            let outcome = match provider::provider_for(ticket.provider, &wallet) {
                Ok(p) => provider::connect_with_timeout(p.as_ref(), timeout).await,
                Err(e) => Err(e),
            };
            let _ = tx.send(TuiEvent::WalletResolved {
                attempt: ticket.attempt,
                outcome,
            });
        });
    }

    fn start_account_watch(&mut self) {
        self.stop_account_watch();
        let Some(kind) = self.wizard.state().wallet.selected_provider else {
            return;
        };
        let source = match provider::provider_for(kind, &self.config.wallet) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Cannot watch {} accounts: {}", kind, e);
                return;
            }
        };

        let (acc_tx, mut acc_rx) = mpsc::unbounded_channel();
        let token = provider::watch_accounts(
            source,
            Duration::from_secs(self.config.wallet.account_poll_secs),
            acc_tx,
        );
        let tx = self.event_sender();
        tokio::spawn(async move {
            while let Some(event) = acc_rx.recv().await {
                if tx.send(TuiEvent::AccountsChanged(event)).is_err() {
                    break;
                }
            }
        });
        self.account_watch = Some(token);
    }

    fn stop_account_watch(&mut self) {
        if let Some(token) = self.account_watch.take() {
            token.cancel();
        }
    }

    // --- Auth ---

    fn navigate(&mut self, target: AuthScreen) {
        let route = screens::guard(target, &self.auth);
        self.set_route(route);
    }

    fn set_route(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        tracing::debug!("Route {:?} -> {:?}", self.route, route);
        self.route = route;
        if let Route::Auth(screen) = route {
            self.auth_forms.enter(screen);
            if screen == AuthScreen::VerifyOtp {
                self.start_otp_countdown();
            }
        }
    }

    fn submit_auth(&mut self, screen: AuthScreen) {
        if !self.auth_forms.validate(screen) {
            return;
        }

        let client = self.client.clone();
        let tx = self.event_sender();
        let op = auth_op(screen);

        let request: std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<AuthResponse, ApiError>> + Send>,
        > = match screen {
            AuthScreen::SignIn => {
                let email = self.auth_forms.sign_in.email.trim().to_string();
                let password = self.auth_forms.sign_in.password.clone();
                Box::pin(async move { client.login(&email, &password).await })
            }
            AuthScreen::SignUp => {
                let (email, phone) = match Contact::parse(&self.auth_forms.sign_up.email_or_phone) {
                    Contact::Email(e) => (Some(e), None),
                    Contact::Phone(p) => (None, Some(p)),
                };
                let request = RegisterRequest {
                    email,
                    phone,
                    password: self.auth_forms.sign_up.password.clone(),
                    role: self
                        .auth_forms
                        .sign_up
                        .user_type
                        .map(|r| r.as_str())
                        .unwrap_or_default()
                        .to_string(),
                    individual_type: self
                        .auth_forms
                        .sign_up
                        .individual_type_for_request()
                        .map(|t| t.as_str().to_string()),
                };
                Box::pin(async move { client.register(&request).await })
            }
            AuthScreen::ForgotPassword => {
                let email = self.auth_forms.forgot.email.trim().to_string();
                Box::pin(async move { client.forgot_password(&email).await })
            }
            AuthScreen::VerifyOtp => {
                let Some(email) = self.auth.email_for_reset.clone() else {
                    self.navigate(AuthScreen::VerifyOtp);
                    return;
                };
                let otp = self.auth_forms.otp.otp.clone();
                Box::pin(async move { client.verify_otp(&email, &otp).await })
            }
            AuthScreen::ResetPassword => {
                let Some(email) = self.auth.email_for_reset.clone() else {
                    self.navigate(AuthScreen::ResetPassword);
                    return;
                };
                let password = self.auth_forms.reset.password.clone();
                let token = self
                    .auth
                    .reset_token
                    .as_ref()
                    .map(|t| t.expose().to_string())
                    .unwrap_or_default();
                Box::pin(async move { client.reset_password(&email, &password, &token).await })
            }
        };

        self.auth.begin(op);
        tokio::spawn(async move {
            let result = request.await;
            let _ = tx.send(TuiEvent::AuthCompleted { screen, result });
        });
    }

    fn complete_auth(&mut self, screen: AuthScreen, result: Result<AuthResponse, ApiError>) {
        let op = auth_op(screen);
        let succeeded = result.is_ok();
        match result {
            Ok(response) => match screen {
                AuthScreen::SignIn => {
                    self.auth.login_succeeded(response.user, response.token);
                    self.client = self
                        .client
                        .clone()
                        .with_bearer(self.auth.token.as_ref().map(|t| t.expose().to_string()));
                }
                AuthScreen::SignUp => self.auth.signup_succeeded(response.token),
                AuthScreen::ForgotPassword => {
                    let email = self.auth_forms.forgot.email.trim().to_string();
                    self.auth.otp_sent(&email);
                }
                AuthScreen::VerifyOtp => self.auth.otp_verified(response.token),
                AuthScreen::ResetPassword => self.auth.password_reset(),
            },
            Err(e) => self.auth.fail(op, e.message),
        }

        if let Some(error) = self.auth.take_error() {
            self.show_toast(error, ToastKind::Error);
        }
        if let Some(message) = self.auth.take_message() {
            self.show_toast(message, ToastKind::Success);
        }

        if succeeded {
            self.dirty = true;
            let route = screens::after_success(screen, &self.auth);
            if screen == AuthScreen::ForgotPassword && route == self.route {
                // Resent from the OTP screen
                self.auth_forms.enter(AuthScreen::VerifyOtp);
                self.start_otp_countdown();
            }
            self.set_route(route);
        }
    }

    fn resend_otp(&mut self) {
        if !self.auth_forms.countdown.can_resend() {
            return;
        }
        let Some(email) = self.auth.email_for_reset.clone() else {
            self.navigate(AuthScreen::VerifyOtp);
            return;
        };
        self.auth_forms.forgot.email = email;
        self.submit_auth(AuthScreen::ForgotPassword);
    }

    fn start_otp_countdown(&mut self) {
        if let Some(token) = self.otp_timer.take() {
            token.cancel();
        }
        let total = self.config.otp.resend_secs;
        self.auth_forms.countdown.set_remaining(total);
        let tx = self.event_sender();
        self.otp_timer = Some(spawn_countdown(total, move |left| {
            let _ = tx.send(TuiEvent::OtpTick(left));
        }));
    }

    fn logout(&mut self) {
        self.auth.logout();
        self.client = self.client.clone().with_bearer(None);
        self.dirty = true;
        self.set_route(Route::Auth(AuthScreen::SignIn));
    }

    // --- Misc ---

    pub fn show_toast(&mut self, text: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            text: text.into(),
            kind,
            expires_at: self.animation_frame + TOAST_TICKS,
        });
    }

    /// Write the session now if anything changed
    pub fn persist(&mut self) {
        let session = PersistedSession::new(self.auth.clone(), self.wizard.state().clone());
        match self.store.save(&session) {
            Ok(()) => self.dirty = false,
            Err(e) => tracing::warn!("Failed to save session: {}", e),
        }
    }

    /// Stop background tasks and flush the session before exit
    pub fn shutdown(&mut self) {
        self.stop_account_watch();
        if let Some(token) = self.otp_timer.take() {
            token.cancel();
        }
        if self.dirty {
            self.persist();
        }
    }
}

fn auth_op(screen: AuthScreen) -> AuthOp {
    match screen {
        AuthScreen::SignIn => AuthOp::Login,
        AuthScreen::SignUp => AuthOp::Signup,
        AuthScreen::ForgotPassword => AuthOp::ForgotPassword,
        AuthScreen::VerifyOtp => AuthOp::VerifyOtp,
        AuthScreen::ResetPassword => AuthOp::ResetPassword,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::WizardStep;
    use crate::onboarding::draft::AssetType;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.session.path = dir.path().join("session.json");
        config.api.base_url = "http://127.0.0.1:9".to_string();
        config.wallet.simulated_latency_ms = 0;
        config.wallet.simulated_success_rate = 1.0;
        config.wallet.success_display_ms = 0;
        config
    }

    fn key(code: KeyCode) -> TuiEvent {
        TuiEvent::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[tokio::test]
    async fn test_starts_on_sign_in() {
        let dir = TempDir::new().unwrap();
        let app = App::new(test_config(&dir)).unwrap();
        assert_eq!(app.route, Route::Auth(AuthScreen::SignIn));
    }

    #[tokio::test]
    async fn test_invalid_sign_in_stays_local() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(test_config(&dir)).unwrap();
        app.handle_event(key(KeyCode::Enter)).await.unwrap();
        assert!(!app.auth.is_loading);
        assert!(!app.auth_forms.errors.is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_response_routes_to_wizard() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(test_config(&dir)).unwrap();
        app.handle_event(TuiEvent::AuthCompleted {
            screen: AuthScreen::SignIn,
            result: Ok(AuthResponse {
                token: Some("tok".into()),
                ..Default::default()
            }),
        })
        .await
        .unwrap();

        assert_eq!(app.route, Route::Wizard);
        assert!(app.auth.is_authenticated);
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(ToastKind::Success));
    }

    #[tokio::test]
    async fn test_failed_request_shows_error_once() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(test_config(&dir)).unwrap();
        app.handle_event(TuiEvent::AuthCompleted {
            screen: AuthScreen::SignIn,
            result: Err(ApiError::network("")),
        })
        .await
        .unwrap();

        assert_eq!(app.route, Route::Auth(AuthScreen::SignIn));
        assert_eq!(
            app.toast.as_ref().map(|t| t.text.as_str()),
            Some("Network error occurred")
        );
        assert!(app.auth.take_error().is_none());
    }

    #[tokio::test]
    async fn test_verify_otp_without_email_redirects() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(test_config(&dir)).unwrap();
        app.navigate(AuthScreen::VerifyOtp);
        assert_eq!(app.route, Route::Auth(AuthScreen::SignIn));
    }

    #[tokio::test]
    async fn test_wallet_connect_through_events() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(test_config(&dir)).unwrap();
        app.skip_auth();

        app.apply(Action::SelectAssetType(AssetType::Equity));
        app.apply(Action::Next);
        app.apply(Action::SelectNetwork("polygon".into()));
        app.apply(Action::Next);
        app.apply(Action::OpenWalletModal);
        app.apply(Action::SelectProvider(crate::onboarding::WalletProvider::Phantom));
        app.apply(Action::Connect);
        assert!(app.wizard.state().wallet.is_connecting());

        // Provider answer, then the settle timer
        while app.wizard.current_step() == WizardStep::Wallet {
            let event = app.next_event().await.unwrap();
            app.handle_event(event).await.unwrap();
        }

        assert_eq!(app.wizard.current_step(), WizardStep::PreMinting);
        assert!(app.wizard.state().wallet.is_connected());
        assert!(!app.wizard.state().wallet.show_modal);
        app.shutdown();
    }

    #[tokio::test]
    async fn test_session_persisted_on_tick() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let mut app = App::new(config.clone()).unwrap();
        app.skip_auth();
        app.apply(Action::SelectAssetType(AssetType::RealEstate));
        app.handle_event(TuiEvent::Tick).await.unwrap();

        let resumed = App::new(config).unwrap();
        assert_eq!(
            resumed.wizard.state().draft.asset_type,
            Some(AssetType::RealEstate)
        );
    }
}
