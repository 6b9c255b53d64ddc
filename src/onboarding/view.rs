//! Step views
//!
//! `render` turns the wizard state into a plain description of what to
//! show. The terminal shell draws from this and never reads the state
//! directly.

use super::controller::{IssuedAsset, OnboardingState};
use super::draft::{
    AssetSummary, AssetType, DraftField, NETWORKS, Network, PreMintingItem, VESTING_PERIODS,
};
use super::gating;
use super::steps::WizardStep;
use super::wallet::{ConnectingStatus, WalletOption, WalletProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub number: usize,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub active: bool,
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavControls {
    pub show_back: bool,
    pub can_proceed: bool,
    pub next_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: DraftField,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    pub provider: WalletProvider,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBody {
    /// Shown instead of a wallet-gated step while no wallet is connected
    ConnectWalletPrompt { message: &'static str },
    AssetType {
        options: &'static [AssetType],
        selected: Option<AssetType>,
    },
    Network {
        options: &'static [Network],
        selected: Option<String>,
    },
    Wallet {
        option: Option<WalletOption>,
        connected: Option<ConnectedWallet>,
    },
    PreMinting {
        items: Vec<(PreMintingItem, bool)>,
    },
    AssetInfo {
        fields: Vec<FieldView>,
    },
    AssetDetails {
        fields: Vec<FieldView>,
        vesting_options: &'static [&'static str],
    },
    Summary {
        summary: Box<AssetSummary>,
        accepted_terms: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletModalView {
    pub providers: Vec<(WalletProvider, bool)>,
    pub status: ConnectingStatus,
    pub can_close: bool,
    pub can_connect: bool,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub step: WizardStep,
    pub title: &'static str,
    pub description: &'static str,
    pub progress: (usize, usize),
    pub sidebar: Vec<SidebarItem>,
    /// Header wallet badge
    pub wallet: Option<ConnectedWallet>,
    pub body: StepBody,
    pub nav: NavControls,
    pub wallet_modal: Option<WalletModalView>,
    pub success_modal: Option<IssuedAsset>,
}

fn prompt_message(step: WizardStep) -> &'static str {
    match step {
        WizardStep::PreMinting => {
            "You need to connect your wallet before you can proceed with pre-minting steps. Your wallet allows you to securely interact with the blockchain."
        }
        WizardStep::AssetInfo => {
            "You need to connect your wallet to enter your asset information. Your wallet is required to sign and validate asset details."
        }
        WizardStep::AssetDetails => {
            "You need to connect your wallet to specify asset details. Your wallet is required to sign and validate transaction parameters."
        }
        _ => {
            "You need to connect your wallet to issue your digital asset. Your wallet is required to sign the transaction and complete the issuance process."
        }
    }
}

fn fields(state: &OnboardingState, which: &[DraftField]) -> Vec<FieldView> {
    which
        .iter()
        .map(|f| FieldView {
            field: *f,
            value: state.draft.field(*f).to_string(),
        })
        .collect()
}

pub fn render(state: &OnboardingState) -> StepView {
    let step = state.navigation.current();
    let wallet = &state.wallet;

    let connected = match (wallet.selected_provider, &wallet.wallet_address) {
        (Some(provider), Some(address)) => Some(ConnectedWallet {
            provider,
            address: address.clone(),
        }),
        _ => None,
    };

    let body = if gating::needs_wallet_prompt(step, wallet) {
        StepBody::ConnectWalletPrompt {
            message: prompt_message(step),
        }
    } else {
        match step {
            WizardStep::AssetType => StepBody::AssetType {
                options: &AssetType::ALL,
                selected: state.draft.asset_type,
            },
            WizardStep::Network => StepBody::Network {
                options: &NETWORKS,
                selected: state.draft.network.clone(),
            },
            WizardStep::Wallet => StepBody::Wallet {
                option: wallet.wallet_option,
                connected: connected.clone(),
            },
            WizardStep::PreMinting => StepBody::PreMinting {
                items: PreMintingItem::ALL
                    .iter()
                    .map(|i| (*i, state.pre_minting.is_complete(*i)))
                    .collect(),
            },
            WizardStep::AssetInfo => StepBody::AssetInfo {
                fields: fields(state, &DraftField::INFO),
            },
            WizardStep::AssetDetails => StepBody::AssetDetails {
                fields: fields(state, &DraftField::DETAILS),
                vesting_options: &VESTING_PERIODS,
            },
            WizardStep::Summary => StepBody::Summary {
                summary: Box::new(state.draft.summary(wallet.wallet_address.as_deref())),
                accepted_terms: state.draft.accepted_terms,
            },
        }
    };

    let sidebar = state
        .navigation
        .steps
        .iter()
        .map(|s| SidebarItem {
            number: s.id,
            title: s.title.clone(),
            description: s.description.clone(),
            completed: s.completed,
            active: s.active,
            reachable: gating::is_reachable(s.kind, wallet),
        })
        .collect();

    let wallet_modal = wallet.show_modal.then(|| WalletModalView {
        providers: WalletProvider::ALL
            .iter()
            .map(|p| (*p, wallet.temp_provider == Some(*p)))
            .collect(),
        status: wallet.connecting_status,
        can_close: wallet.can_close_modal(),
        can_connect: wallet.temp_provider.is_some()
            && wallet.connecting_status == ConnectingStatus::Idle,
        address: wallet.wallet_address.clone(),
    });

    let success_modal = state
        .show_success_modal
        .then(|| IssuedAsset::from_draft(&state.draft));

    StepView {
        step,
        title: step.title(),
        description: step.description(),
        progress: (step.number(), state.navigation.len()),
        sidebar,
        wallet: connected,
        body,
        nav: NavControls {
            show_back: state.navigation.current_step > 1,
            can_proceed: gating::can_advance(
                &state.navigation,
                wallet,
                &state.draft,
                &state.pre_minting,
            ),
            next_label: if step == WizardStep::Summary {
                "Issue Digital Asset"
            } else {
                "Continue"
            },
        },
        wallet_modal,
        success_modal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::controller::{Action, Effect, OnboardingController};

    #[test]
    fn test_initial_view() {
        let v = render(&OnboardingState::default());
        assert_eq!(v.step, WizardStep::AssetType);
        assert_eq!(v.progress, (1, 7));
        assert!(!v.nav.show_back);
        assert!(!v.nav.can_proceed);
        assert!(matches!(v.body, StepBody::AssetType { selected: None, .. }));
        assert_eq!(v.sidebar.iter().filter(|s| s.reachable).count(), 3);
        assert!(v.wallet_modal.is_none());
    }

    #[test]
    fn test_gated_step_shows_prompt() {
        let mut state = OnboardingState::default();
        state.navigation.jump(5);
        let v = render(&state);
        assert_eq!(
            v.body,
            StepBody::ConnectWalletPrompt {
                message: prompt_message(WizardStep::AssetInfo)
            }
        );
        assert!(v.nav.show_back);
    }

    #[test]
    fn test_modal_view_tracks_status() {
        let mut c = OnboardingController::default();
        c.dispatch(Action::OpenWalletModal);
        let v = c.view();
        let modal = v.wallet_modal.unwrap();
        assert!(!modal.can_connect);
        assert!(modal.can_close);

        c.dispatch(Action::SelectProvider(WalletProvider::Phantom));
        let Effect::Connect(_) = c.dispatch(Action::Connect) else {
            panic!("expected a connect ticket");
        };
        let modal = c.view().wallet_modal.unwrap();
        assert_eq!(modal.status, ConnectingStatus::Connecting);
        assert!(!modal.can_close);
        assert!(!modal.can_connect);
        assert!(modal.providers.contains(&(WalletProvider::Phantom, true)));
    }

    #[test]
    fn test_summary_label() {
        let mut state = OnboardingState::default();
        state.navigation.jump(7);
        let v = render(&state);
        assert_eq!(v.nav.next_label, "Issue Digital Asset");
    }
}
