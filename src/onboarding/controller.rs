//! Onboarding Controller
//!
//! Owns the whole wizard state. Every mutation goes through
//! [`OnboardingController::dispatch`], which checks gating first and
//! returns an [`Effect`] telling the shell what to do next (start a
//! provider call, schedule the post-connect advance, show the issued
//! asset).

use super::draft::{AssetDraft, AssetType, DraftField, PreMintingItem, PreMintingProgress};
use super::gating::{self, Gate};
use super::navigation::NavigationState;
use super::provider::{WalletError, WalletProviderApi, connect_with_timeout};
use super::steps::WizardStep;
use super::view::{self, StepView};
use super::wallet::{
    AccountsChange, ConnectionTicket, Refusal, Resolution, WalletConnectionState, WalletOption,
    WalletProvider,
};
use crate::utils::{format_currency, format_large_number};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// How long the success state stays on screen before the wizard moves on
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(2000);

/// The onboarding slice as a single value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardingState {
    pub navigation: NavigationState,
    pub wallet: WalletConnectionState,
    pub draft: AssetDraft,
    pub pre_minting: PreMintingProgress,
    pub show_success_modal: bool,
}

impl OnboardingState {
    /// Repair anything a stored copy may carry that cannot be resumed
    pub fn normalize(&mut self) {
        self.navigation.normalize();
        self.wallet.normalize();
        self.pre_minting.dedup();
        if self.navigation.current() != WizardStep::Summary {
            self.show_success_modal = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Next,
    Back,
    GoTo(usize),

    SelectAssetType(AssetType),
    SelectNetwork(String),

    ChooseWalletOption(WalletOption),
    OpenWalletModal,
    CloseWalletModal,
    SelectProvider(WalletProvider),
    Connect,
    ConnectionResolved {
        attempt: Uuid,
        outcome: Result<String, WalletError>,
    },
    /// The success display delay for `attempt` has elapsed
    ConnectionSettled {
        attempt: Uuid,
    },
    RetryConnection,
    DisconnectWallet,
    AccountsChanged {
        provider: WalletProvider,
        accounts: Vec<String>,
    },

    CompletePreMinting(PreMintingItem),
    ResetPreMinting,

    SetField(DraftField, String),
    SetAcceptedTerms(bool),

    Submit,
    CloseSuccessModal,
    Reset,
}

/// Why an action left the state untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    StepIncomplete(WizardStep),
    Unreachable(usize),
    OutOfRange(usize),
    Wallet(Refusal),
    /// Data entry on a wallet-gated step without a connected wallet
    WalletRequired(WizardStep),
    UnknownNetwork(String),
    NotOnSummary,
}

impl std::fmt::Display for Blocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StepIncomplete(step) => write!(f, "Complete \"{}\" first", step.title()),
            Self::Unreachable(n) => write!(f, "Connect your wallet to open step {}", n),
            Self::OutOfRange(n) => write!(f, "There is no step {}", n),
            Self::Wallet(r) => write!(f, "Wallet action not available ({:?})", r),
            Self::WalletRequired(step) => {
                write!(f, "Connect your wallet to fill in \"{}\"", step.title())
            }
            Self::UnknownNetwork(id) => write!(f, "Unknown network '{}'", id),
            Self::NotOnSummary => f.write_str("Review the summary before issuing"),
        }
    }
}

/// What the issuance produced, for the success modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedAsset {
    pub name: String,
    pub symbol: String,
    pub network: String,
    /// `$500,000.00 ($500K)`, absent when supply or price is not numeric
    pub market_cap: Option<String>,
}

impl IssuedAsset {
    pub fn from_draft(draft: &AssetDraft) -> Self {
        Self {
            name: draft.asset_name.clone(),
            symbol: draft.asset_symbol.clone(),
            network: draft
                .network()
                .map(|n| n.display_name.to_string())
                .unwrap_or_default(),
            market_cap: draft.market_cap().map(|cap| {
                format!("{} (${})", format_currency(cap), format_large_number(cap, 1))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing changed
    None,
    Changed,
    Blocked(Blocked),
    /// Run the provider call for this ticket and report back with
    /// [`Action::ConnectionResolved`]
    Connect(ConnectionTicket),
    /// Dispatch [`Action::ConnectionSettled`] after `delay`
    SettleAfter { attempt: Uuid, delay: Duration },
    Issued(IssuedAsset),
}

pub struct OnboardingController {
    state: OnboardingState,
    success_delay: Duration,
}

impl Default for OnboardingController {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_DELAY)
    }
}

impl OnboardingController {
    pub fn new(success_delay: Duration) -> Self {
        Self {
            state: OnboardingState::default(),
            success_delay,
        }
    }

    /// Resume from a stored state
    pub fn from_state(mut state: OnboardingState, success_delay: Duration) -> Self {
        state.normalize();
        Self {
            state,
            success_delay,
        }
    }

    pub fn state(&self) -> &OnboardingState {
        &self.state
    }

    pub fn into_state(self) -> OnboardingState {
        self.state
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.navigation.current()
    }

    pub fn gate(&self) -> Gate {
        let s = &self.state;
        gating::evaluate(&s.navigation, &s.wallet, &s.draft, &s.pre_minting)
    }

    pub fn can_advance(&self) -> bool {
        let s = &self.state;
        gating::can_advance(&s.navigation, &s.wallet, &s.draft, &s.pre_minting)
    }

    pub fn view(&self) -> StepView {
        view::render(&self.state)
    }

    fn wallet_op(&mut self, op: impl FnOnce(&mut WalletConnectionState) -> Result<(), Refusal>) -> Effect {
        match op(&mut self.state.wallet) {
            Ok(()) => Effect::Changed,
            Err(r) => {
                tracing::debug!("Wallet action refused: {:?}", r);
                Effect::Blocked(Blocked::Wallet(r))
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Effect {
        match action {
            Action::Next => self.next(),
            Action::Back => {
                if self.state.navigation.retreat() {
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            Action::GoTo(target) => self.go_to(target),

            Action::SelectAssetType(t) => {
                self.state.draft.asset_type = Some(t);
                Effect::Changed
            }
            Action::SelectNetwork(id) => {
                if self.state.draft.set_network(&id) {
                    Effect::Changed
                } else {
                    Effect::Blocked(Blocked::UnknownNetwork(id))
                }
            }

            Action::ChooseWalletOption(option) => self.wallet_op(|w| w.choose_option(option)),
            Action::OpenWalletModal => self.wallet_op(|w| w.open_modal()),
            Action::CloseWalletModal => self.wallet_op(|w| w.close_modal()),
            Action::SelectProvider(p) => self.wallet_op(|w| w.select_provider(p)),
            Action::Connect => match self.state.wallet.begin_connection() {
                Ok(ticket) => Effect::Connect(ticket),
                Err(r) => Effect::Blocked(Blocked::Wallet(r)),
            },
            Action::ConnectionResolved { attempt, outcome } => {
                match self.state.wallet.resolve(attempt, outcome) {
                    Resolution::Connected { .. } => Effect::SettleAfter {
                        attempt,
                        delay: self.success_delay,
                    },
                    Resolution::Failed => Effect::Changed,
                    Resolution::Stale => Effect::None,
                }
            }
            Action::ConnectionSettled { attempt } => self.settle(attempt),
            Action::RetryConnection => self.wallet_op(|w| w.retry()),
            Action::DisconnectWallet => {
                self.state.wallet.disconnect();
                Effect::Changed
            }
            Action::AccountsChanged { provider, accounts } => {
                match self.state.wallet.accounts_changed(provider, &accounts) {
                    AccountsChange::Ignored => Effect::None,
                    AccountsChange::Disconnected | AccountsChange::Switched(_) => Effect::Changed,
                }
            }

            Action::CompletePreMinting(item) => {
                if let Some(blocked) = self.require_wallet(WizardStep::PreMinting) {
                    return blocked;
                }
                if self.state.pre_minting.complete(item) {
                    tracing::debug!("Pre-minting item done: {:?}", item);
                    Effect::Changed
                } else {
                    Effect::None
                }
            }
            Action::ResetPreMinting => {
                self.state.pre_minting.reset();
                Effect::Changed
            }

            Action::SetField(field, value) => {
                if let Some(blocked) = self.require_wallet(field_step(field)) {
                    return blocked;
                }
                self.state.draft.set_field(field, value);
                Effect::Changed
            }
            Action::SetAcceptedTerms(accepted) => {
                if let Some(blocked) = self.require_wallet(WizardStep::Summary) {
                    return blocked;
                }
                self.state.draft.accepted_terms = accepted;
                Effect::Changed
            }

            Action::Submit => self.submit(),
            Action::CloseSuccessModal => {
                self.state.show_success_modal = false;
                Effect::Changed
            }
            Action::Reset => {
                tracing::info!("Onboarding reset");
                self.state = OnboardingState::default();
                Effect::Changed
            }
        }
    }

    fn require_wallet(&self, step: WizardStep) -> Option<Effect> {
        if gating::needs_wallet_prompt(step, &self.state.wallet) {
            tracing::debug!("Input for {:?} refused without a wallet", step);
            return Some(Effect::Blocked(Blocked::WalletRequired(step)));
        }
        None
    }

    fn next(&mut self) -> Effect {
        let step = self.current_step();
        if !self.can_advance() {
            return Effect::Blocked(Blocked::StepIncomplete(step));
        }
        if step == WizardStep::Summary {
            return self.submit();
        }
        if self.state.navigation.advance() {
            Effect::Changed
        } else {
            Effect::None
        }
    }

    fn go_to(&mut self, target: usize) -> Effect {
        let Some(step) = WizardStep::from_number(target).filter(|_| target <= self.state.navigation.len())
        else {
            return Effect::Blocked(Blocked::OutOfRange(target));
        };
        if !gating::is_reachable(step, &self.state.wallet) {
            return Effect::Blocked(Blocked::Unreachable(target));
        }
        if self.state.navigation.jump(target) {
            Effect::Changed
        } else {
            Effect::None
        }
    }

    fn settle(&mut self, attempt: Uuid) -> Effect {
        if !self.state.wallet.finish_success(attempt) {
            return Effect::None;
        }
        self.state.navigation.advance();
        Effect::Changed
    }

    fn submit(&mut self) -> Effect {
        if self.current_step() != WizardStep::Summary {
            return Effect::Blocked(Blocked::NotOnSummary);
        }
        if !self.can_advance() {
            return Effect::Blocked(Blocked::StepIncomplete(WizardStep::Summary));
        }

        let issued = IssuedAsset::from_draft(&self.state.draft);
        self.state.show_success_modal = true;
        tracing::info!("Issued digital asset {} ({})", issued.name, issued.symbol);
        Effect::Issued(issued)
    }

    /// Run a whole connection through `provider`: pick it in the modal,
    /// call it under `timeout`, and after a success wait out the display
    /// delay before settling.
    pub async fn connect_wallet(
        &mut self,
        provider: &dyn WalletProviderApi,
        timeout: Duration,
    ) -> Result<String, WalletError> {
        if !self.state.wallet.show_modal {
            self.state
                .wallet
                .open_modal()
                .map_err(|r| WalletError::Rejected(format!("{:?}", r)))?;
        }
        self.state
            .wallet
            .select_provider(provider.kind())
            .map_err(|r| WalletError::Rejected(format!("{:?}", r)))?;

        let ticket = match self.dispatch(Action::Connect) {
            Effect::Connect(ticket) => ticket,
            other => return Err(WalletError::Rejected(format!("{:?}", other))),
        };

        let outcome = connect_with_timeout(provider, timeout).await;
        let effect = self.dispatch(Action::ConnectionResolved {
            attempt: ticket.attempt,
            outcome: outcome.clone(),
        });

        if let Effect::SettleAfter { attempt, delay } = effect {
            tokio::time::sleep(delay).await;
            self.dispatch(Action::ConnectionSettled { attempt });
        }
        outcome
    }
}

fn field_step(field: DraftField) -> WizardStep {
    if DraftField::INFO.contains(&field) {
        WizardStep::AssetInfo
    } else {
        WizardStep::AssetDetails
    }
}
