//! Onboarding Wizard Input
//!
//! Cursor and field focus for the wizard screens, and the mapping from key
//! presses to controller actions. This module never mutates wizard state
//! itself; it only says which [`Action`] the app should dispatch.

use super::events::keys;
use crate::onboarding::draft::{AssetType, DraftField, NETWORKS, PreMintingItem, VESTING_PERIODS};
use crate::onboarding::gating;
use crate::onboarding::{
    Action, ConnectingStatus, OnboardingState, WalletOption, WalletProvider, WizardStep,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the app should do after handling a wizard key event
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    /// Nothing special
    None,
    Dispatch(Action),
    Logout,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardInput {
    /// Highlighted row in the current step's option list
    pub cursor: usize,
    /// Focused input on the asset info / details steps
    pub focused_field: usize,
    /// Highlighted provider in the wallet modal
    pub modal_cursor: usize,
    /// Step the cursor positions were computed for
    synced_step: Option<WizardStep>,
}

impl WizardInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-seat the cursor on the stored selection whenever the step changes
    pub fn sync(&mut self, state: &OnboardingState) {
        let step = state.navigation.current();
        if self.synced_step == Some(step) {
            return;
        }
        self.synced_step = Some(step);
        self.focused_field = 0;
        self.cursor = match step {
            WizardStep::AssetType => state
                .draft
                .asset_type
                .and_then(|t| AssetType::ALL.iter().position(|a| *a == t))
                .unwrap_or(0),
            WizardStep::Network => state
                .draft
                .network
                .as_deref()
                .and_then(|id| NETWORKS.iter().position(|n| n.id == id))
                .unwrap_or(0),
            WizardStep::Wallet => match state.wallet.wallet_option {
                Some(WalletOption::Existing) => 1,
                _ => 0,
            },
            WizardStep::PreMinting => PreMintingItem::ALL
                .iter()
                .position(|i| !state.pre_minting.is_complete(*i))
                .unwrap_or(0),
            _ => 0,
        };
    }

    pub fn focused(&self, step: WizardStep) -> Option<DraftField> {
        fields_for(step).get(self.focused_field).copied()
    }

    /// Returns `WizardCommand` indicating what the app should do
    pub fn handle_key(&mut self, event: KeyEvent, state: &OnboardingState) -> WizardCommand {
        if keys::is_quit(&event) {
            return WizardCommand::Quit;
        }
        if keys::is_logout(&event) {
            return WizardCommand::Logout;
        }

        if state.show_success_modal {
            return match event.code {
                // "Go to Dashboard" leaves the finished wizard behind
                KeyCode::Enter => WizardCommand::Dispatch(Action::Reset),
                KeyCode::Esc => WizardCommand::Dispatch(Action::CloseSuccessModal),
                _ => WizardCommand::None,
            };
        }

        if state.wallet.show_modal {
            return self.handle_modal_key(event, state);
        }

        if keys::is_wallet(&event) {
            return WizardCommand::Dispatch(Action::OpenWalletModal);
        }
        if keys::is_disconnect(&event) {
            return WizardCommand::Dispatch(Action::DisconnectWallet);
        }
        if keys::is_reset(&event) {
            return WizardCommand::Dispatch(Action::Reset);
        }
        if let Some(step) = keys::step_jump(&event) {
            return WizardCommand::Dispatch(Action::GoTo(step));
        }
        if keys::is_cancel(&event) {
            return WizardCommand::Dispatch(Action::Back);
        }

        let step = state.navigation.current();
        if gating::needs_wallet_prompt(step, &state.wallet) {
            return match event.code {
                KeyCode::Enter => WizardCommand::Dispatch(Action::OpenWalletModal),
                _ => WizardCommand::None,
            };
        }

        match step {
            WizardStep::AssetType => self.handle_choice_key(event, AssetType::ALL.len(), |i| {
                Action::SelectAssetType(AssetType::ALL[i])
            }),
            WizardStep::Network => self.handle_choice_key(event, NETWORKS.len(), |i| {
                Action::SelectNetwork(NETWORKS[i].id.to_string())
            }),
            WizardStep::Wallet => self.handle_wallet_key(event, state),
            WizardStep::PreMinting => self.handle_pre_minting_key(event, state),
            WizardStep::AssetInfo | WizardStep::AssetDetails => {
                self.handle_field_key(event, step, state)
            }
            WizardStep::Summary => match event.code {
                KeyCode::Char(' ') => {
                    WizardCommand::Dispatch(Action::SetAcceptedTerms(!state.draft.accepted_terms))
                }
                KeyCode::Enter => WizardCommand::Dispatch(Action::Next),
                _ => WizardCommand::None,
            },
        }
    }

    /// Paste into the focused text field
    pub fn handle_paste(&self, text: &str, state: &OnboardingState) -> WizardCommand {
        let step = state.navigation.current();
        if state.wallet.show_modal || gating::needs_wallet_prompt(step, &state.wallet) {
            return WizardCommand::None;
        }
        let Some(field) = self.focused(step) else {
            return WizardCommand::None;
        };
        if field == DraftField::VestingPeriod {
            return WizardCommand::None;
        }
        let mut value = state.draft.field(field).to_string();
        value.extend(text.chars().filter(|c| accepts(field, *c)));
        WizardCommand::Dispatch(Action::SetField(field, value))
    }

    // --- Step-specific key handlers ---

    /// Up/Down moves the highlight and selects; Enter continues
    fn handle_choice_key(
        &mut self,
        event: KeyEvent,
        len: usize,
        select: impl Fn(usize) -> Action,
    ) -> WizardCommand {
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                WizardCommand::Dispatch(select(self.cursor))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(len.saturating_sub(1));
                WizardCommand::Dispatch(select(self.cursor))
            }
            KeyCode::Char(' ') => WizardCommand::Dispatch(select(self.cursor.min(len - 1))),
            KeyCode::Enter => WizardCommand::Dispatch(Action::Next),
            _ => WizardCommand::None,
        }
    }

    fn handle_wallet_key(&mut self, event: KeyEvent, state: &OnboardingState) -> WizardCommand {
        let option_at = |i: usize| {
            if i == 0 {
                WalletOption::New
            } else {
                WalletOption::Existing
            }
        };
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = 0;
                WizardCommand::Dispatch(Action::ChooseWalletOption(option_at(0)))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = 1;
                WizardCommand::Dispatch(Action::ChooseWalletOption(option_at(1)))
            }
            KeyCode::Enter if state.wallet.is_connected() => WizardCommand::Dispatch(Action::Next),
            KeyCode::Enter | KeyCode::Char(' ') => {
                WizardCommand::Dispatch(Action::OpenWalletModal)
            }
            _ => WizardCommand::None,
        }
    }

    fn handle_pre_minting_key(
        &mut self,
        event: KeyEvent,
        state: &OnboardingState,
    ) -> WizardCommand {
        let last = PreMintingItem::ALL.len() - 1;
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                WizardCommand::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1).min(last);
                WizardCommand::None
            }
            KeyCode::Char('r') => WizardCommand::Dispatch(Action::ResetPreMinting),
            KeyCode::Enter if state.pre_minting.all_done() => WizardCommand::Dispatch(Action::Next),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let item = PreMintingItem::ALL[self.cursor.min(last)];
                if state.pre_minting.is_complete(item) {
                    return WizardCommand::None;
                }
                if self.cursor < last {
                    self.cursor += 1;
                }
                WizardCommand::Dispatch(Action::CompletePreMinting(item))
            }
            _ => WizardCommand::None,
        }
    }

    fn handle_field_key(
        &mut self,
        event: KeyEvent,
        step: WizardStep,
        state: &OnboardingState,
    ) -> WizardCommand {
        let fields = fields_for(step);
        let count = fields.len();
        let Some(field) = fields.get(self.focused_field).copied() else {
            self.focused_field = 0;
            return WizardCommand::None;
        };

        let on_vesting = field == DraftField::VestingPeriod;
        if keys::is_next_field(&event) || (keys::is_down(&event) && !on_vesting) {
            self.focused_field = (self.focused_field + 1) % count;
            return WizardCommand::None;
        }
        if keys::is_prev_field(&event) || (keys::is_up(&event) && !on_vesting) {
            self.focused_field = (self.focused_field + count - 1) % count;
            return WizardCommand::None;
        }

        if on_vesting {
            let current = VESTING_PERIODS
                .iter()
                .position(|v| *v == state.draft.vesting_period);
            let pick = match event.code {
                KeyCode::Up | KeyCode::Left => {
                    Some(current.map_or(0, |i| i.saturating_sub(1)))
                }
                KeyCode::Down | KeyCode::Right | KeyCode::Char(' ') => Some(
                    current.map_or(0, |i| (i + 1).min(VESTING_PERIODS.len() - 1)),
                ),
                _ => None,
            };
            if let Some(i) = pick {
                return WizardCommand::Dispatch(Action::SetField(
                    field,
                    VESTING_PERIODS[i].to_string(),
                ));
            }
        }

        match event.code {
            KeyCode::Enter => WizardCommand::Dispatch(Action::Next),
            KeyCode::Backspace if !on_vesting => {
                let mut value = state.draft.field(field).to_string();
                if value.pop().is_none() {
                    return WizardCommand::None;
                }
                WizardCommand::Dispatch(Action::SetField(field, value))
            }
            KeyCode::Char(c)
                if !on_vesting
                    && !event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    && accepts(field, c) =>
            {
                let mut value = state.draft.field(field).to_string();
                value.push(c);
                WizardCommand::Dispatch(Action::SetField(field, value))
            }
            _ => WizardCommand::None,
        }
    }

    fn handle_modal_key(&mut self, event: KeyEvent, state: &OnboardingState) -> WizardCommand {
        let wallet = &state.wallet;
        let last = WalletProvider::ALL.len() - 1;
        match event.code {
            KeyCode::Esc => WizardCommand::Dispatch(Action::CloseWalletModal),
            KeyCode::Up | KeyCode::Char('k') if wallet.connecting_status == ConnectingStatus::Idle => {
                self.modal_cursor = self.modal_cursor.saturating_sub(1);
                WizardCommand::Dispatch(Action::SelectProvider(WalletProvider::ALL[self.modal_cursor]))
            }
            KeyCode::Down | KeyCode::Char('j')
                if wallet.connecting_status == ConnectingStatus::Idle =>
            {
                self.modal_cursor = (self.modal_cursor + 1).min(last);
                WizardCommand::Dispatch(Action::SelectProvider(WalletProvider::ALL[self.modal_cursor]))
            }
            KeyCode::Char(' ') if wallet.connecting_status == ConnectingStatus::Idle => {
                WizardCommand::Dispatch(Action::SelectProvider(
                    WalletProvider::ALL[self.modal_cursor.min(last)],
                ))
            }
            KeyCode::Enter => match wallet.connecting_status {
                ConnectingStatus::Idle if wallet.temp_provider.is_none() => {
                    WizardCommand::Dispatch(Action::SelectProvider(
                        WalletProvider::ALL[self.modal_cursor.min(last)],
                    ))
                }
                ConnectingStatus::Idle => WizardCommand::Dispatch(Action::Connect),
                ConnectingStatus::Error => WizardCommand::Dispatch(Action::RetryConnection),
                ConnectingStatus::Success => WizardCommand::Dispatch(Action::CloseWalletModal),
                ConnectingStatus::Connecting => WizardCommand::None,
            },
            _ => WizardCommand::None,
        }
    }
}

pub fn fields_for(step: WizardStep) -> &'static [DraftField] {
    match step {
        WizardStep::AssetInfo => &DraftField::INFO,
        WizardStep::AssetDetails => &DraftField::DETAILS,
        _ => &[],
    }
}

fn accepts(field: DraftField, c: char) -> bool {
    if field.is_numeric() {
        c.is_ascii_digit() || c == '.'
    } else {
        !c.is_control()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OnboardingController;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn press(input: &mut WizardInput, c: &mut OnboardingController, code: KeyCode) -> WizardCommand {
        let cmd = input.handle_key(key(code), c.state());
        if let WizardCommand::Dispatch(action) = cmd.clone() {
            c.dispatch(action);
            input.sync(c.state());
        }
        cmd
    }

    #[test]
    fn test_arrow_selects_asset_type() {
        let mut c = OnboardingController::default();
        let mut input = WizardInput::new();
        input.sync(c.state());

        press(&mut input, &mut c, KeyCode::Down);
        assert_eq!(c.state().draft.asset_type, Some(AssetType::Debt));
        press(&mut input, &mut c, KeyCode::Enter);
        assert_eq!(c.current_step(), WizardStep::Network);
    }

    #[test]
    fn test_escape_goes_back() {
        let mut c = OnboardingController::default();
        let mut input = WizardInput::new();
        c.dispatch(Action::SelectAssetType(AssetType::Equity));
        c.dispatch(Action::Next);
        input.sync(c.state());

        assert_eq!(
            press(&mut input, &mut c, KeyCode::Esc),
            WizardCommand::Dispatch(Action::Back)
        );
        assert_eq!(c.current_step(), WizardStep::AssetType);
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn test_gated_step_enter_opens_modal() {
        let mut input = WizardInput::new();
        let mut state = OnboardingState::default();
        state.navigation.jump(5);

        assert_eq!(
            input.handle_key(key(KeyCode::Enter), &state),
            WizardCommand::Dispatch(Action::OpenWalletModal)
        );
        assert_eq!(input.handle_key(key(KeyCode::Char('x')), &state), WizardCommand::None);
    }

    #[test]
    fn test_modal_enter_selects_then_connects() {
        let mut c = OnboardingController::default();
        let mut input = WizardInput::new();
        c.dispatch(Action::OpenWalletModal);

        assert_eq!(
            press(&mut input, &mut c, KeyCode::Enter),
            WizardCommand::Dispatch(Action::SelectProvider(WalletProvider::Metamask))
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Enter), c.state()),
            WizardCommand::Dispatch(Action::Connect)
        );
    }

    #[test]
    fn test_numeric_field_filters_input() {
        let mut state = OnboardingState::default();
        state.navigation.jump(6);
        state.wallet.wallet_address = Some("0xabc".into());
        state.wallet.selected_provider = Some(WalletProvider::Metamask);
        let mut input = WizardInput::new();
        input.sync(&state);

        assert_eq!(input.handle_key(key(KeyCode::Char('x')), &state), WizardCommand::None);
        assert_eq!(
            input.handle_key(key(KeyCode::Char('5')), &state),
            WizardCommand::Dispatch(Action::SetField(DraftField::TotalSupply, "5".into()))
        );
    }

    #[test]
    fn test_vesting_cycles_options() {
        let mut state = OnboardingState::default();
        state.navigation.jump(6);
        state.wallet.wallet_address = Some("0xabc".into());
        state.wallet.selected_provider = Some(WalletProvider::Metamask);
        let mut input = WizardInput::new();
        input.sync(&state);
        input.focused_field = 3;

        assert_eq!(
            input.handle_key(key(KeyCode::Right), &state),
            WizardCommand::Dispatch(Action::SetField(
                DraftField::VestingPeriod,
                "3 months".into()
            ))
        );
        state.draft.vesting_period = "1 year".into();
        assert_eq!(
            input.handle_key(key(KeyCode::Right), &state),
            WizardCommand::Dispatch(Action::SetField(
                DraftField::VestingPeriod,
                "2 years".into()
            ))
        );
    }

    #[test]
    fn test_success_modal_keys() {
        let mut state = OnboardingState::default();
        state.show_success_modal = true;
        let mut input = WizardInput::new();
        assert_eq!(
            input.handle_key(key(KeyCode::Enter), &state),
            WizardCommand::Dispatch(Action::Reset)
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Esc), &state),
            WizardCommand::Dispatch(Action::CloseSuccessModal)
        );
    }
}
