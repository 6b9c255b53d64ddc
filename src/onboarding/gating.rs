//! Gating Rules
//!
//! Pure predicates over the wizard state. "Can advance" is decided per
//! step from field completeness; "reachable" only looks at the wallet.

use super::draft::{AssetDraft, PreMintingProgress};
use super::navigation::NavigationState;
use super::steps::WizardStep;
use super::wallet::WalletConnectionState;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub can_advance: bool,
    /// 1-based step numbers that a sidebar jump may target
    pub reachable_steps: BTreeSet<usize>,
}

/// Whether the data entered for `step` lets the user move past it
pub fn step_ready(
    step: WizardStep,
    wallet: &WalletConnectionState,
    draft: &AssetDraft,
    progress: &PreMintingProgress,
) -> bool {
    let connected = wallet.is_connected();
    match step {
        WizardStep::AssetType => draft.asset_type.is_some(),
        WizardStep::Network => draft.network.is_some(),
        WizardStep::Wallet => wallet.wallet_option.is_some() || connected,
        WizardStep::PreMinting => connected && progress.all_done(),
        WizardStep::AssetInfo => connected && draft.info_complete(),
        WizardStep::AssetDetails => connected && draft.details_complete(),
        WizardStep::Summary => connected && draft.accepted_terms,
    }
}

/// Steps 1-3 are always reachable, the rest only with a connected wallet
pub fn is_reachable(step: WizardStep, wallet: &WalletConnectionState) -> bool {
    !step.is_wallet_gated() || wallet.is_connected()
}

/// The step body must be replaced by a connect-wallet prompt
pub fn needs_wallet_prompt(step: WizardStep, wallet: &WalletConnectionState) -> bool {
    step.is_wallet_gated() && !wallet.is_connected()
}

pub fn can_advance(
    nav: &NavigationState,
    wallet: &WalletConnectionState,
    draft: &AssetDraft,
    progress: &PreMintingProgress,
) -> bool {
    step_ready(nav.current(), wallet, draft, progress)
}

pub fn evaluate(
    nav: &NavigationState,
    wallet: &WalletConnectionState,
    draft: &AssetDraft,
    progress: &PreMintingProgress,
) -> Gate {
    let reachable_steps = nav
        .steps
        .iter()
        .filter(|s| is_reachable(s.kind, wallet))
        .map(|s| s.id)
        .collect();

    Gate {
        can_advance: can_advance(nav, wallet, draft, progress),
        reachable_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::draft::{AssetType, DraftField, PreMintingItem};
    use crate::onboarding::wallet::{WalletOption, WalletProvider};
    use rstest::rstest;

    fn connected_wallet() -> WalletConnectionState {
        let mut w = WalletConnectionState::new();
        w.open_modal().unwrap();
        w.select_provider(WalletProvider::Metamask).unwrap();
        let t = w.begin_connection().unwrap();
        w.resolve(t.attempt, Ok("0xABCD".into()));
        w.finish_success(t.attempt);
        w
    }

    fn full_draft() -> AssetDraft {
        let mut d = AssetDraft {
            asset_type: Some(AssetType::Debt),
            network: Some("polygon".into()),
            accepted_terms: true,
            ..Default::default()
        };
        for f in DraftField::INFO.iter().chain(DraftField::DETAILS.iter()) {
            d.set_field(*f, "x");
        }
        d
    }

    fn full_progress() -> PreMintingProgress {
        let mut p = PreMintingProgress::default();
        for i in PreMintingItem::ALL {
            p.complete(i);
        }
        p
    }

    #[rstest]
    #[case(WizardStep::AssetType, true)]
    #[case(WizardStep::Network, true)]
    #[case(WizardStep::Wallet, false)]
    #[case(WizardStep::PreMinting, false)]
    #[case(WizardStep::AssetInfo, false)]
    #[case(WizardStep::AssetDetails, false)]
    #[case(WizardStep::Summary, false)]
    fn test_ready_with_full_draft_but_no_wallet(#[case] step: WizardStep, #[case] ready: bool) {
        let wallet = WalletConnectionState::new();
        assert_eq!(
            step_ready(step, &wallet, &full_draft(), &full_progress()),
            ready
        );
    }

    #[rstest]
    #[case(WizardStep::AssetType)]
    #[case(WizardStep::Network)]
    #[case(WizardStep::Wallet)]
    #[case(WizardStep::PreMinting)]
    #[case(WizardStep::AssetInfo)]
    #[case(WizardStep::AssetDetails)]
    #[case(WizardStep::Summary)]
    fn test_ready_with_everything(#[case] step: WizardStep) {
        assert!(step_ready(
            step,
            &connected_wallet(),
            &full_draft(),
            &full_progress()
        ));
    }

    #[rstest]
    #[case(WizardStep::AssetType)]
    #[case(WizardStep::Network)]
    #[case(WizardStep::Wallet)]
    #[case(WizardStep::PreMinting)]
    #[case(WizardStep::AssetInfo)]
    #[case(WizardStep::AssetDetails)]
    #[case(WizardStep::Summary)]
    fn test_not_ready_when_empty(#[case] step: WizardStep) {
        assert!(!step_ready(
            step,
            &connected_wallet_without_option_check(step),
            &AssetDraft::default(),
            &PreMintingProgress::default()
        ));
    }

    // A connected wallet satisfies step 3 on its own, so test that step
    // against a blank wallet.
    fn connected_wallet_without_option_check(step: WizardStep) -> WalletConnectionState {
        if step == WizardStep::Wallet {
            WalletConnectionState::new()
        } else {
            connected_wallet()
        }
    }

    #[test]
    fn test_wallet_step_accepts_option_only() {
        let mut w = WalletConnectionState::new();
        w.choose_option(WalletOption::New).unwrap();
        assert!(step_ready(
            WizardStep::Wallet,
            &w,
            &AssetDraft::default(),
            &PreMintingProgress::default()
        ));
    }

    #[test]
    fn test_pre_minting_needs_all_three() {
        let mut p = PreMintingProgress::default();
        p.complete(PreMintingItem::ApproveToken);
        p.complete(PreMintingItem::ApproveCollection);
        let w = connected_wallet();
        let d = AssetDraft::default();
        assert!(!step_ready(WizardStep::PreMinting, &w, &d, &p));
        p.complete(PreMintingItem::DeployCollection);
        assert!(step_ready(WizardStep::PreMinting, &w, &d, &p));
    }

    #[rstest]
    #[case(false, vec![1, 2, 3])]
    #[case(true, vec![1, 2, 3, 4, 5, 6, 7])]
    fn test_reachable_steps(#[case] connected: bool, #[case] expected: Vec<usize>) {
        let wallet = if connected {
            connected_wallet()
        } else {
            WalletConnectionState::new()
        };
        let gate = evaluate(
            &NavigationState::new(),
            &wallet,
            &full_draft(),
            &full_progress(),
        );
        assert_eq!(gate.reachable_steps.into_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_reachable_ignores_field_completeness() {
        // Connected but nothing filled: later steps are still reachable
        let gate = evaluate(
            &NavigationState::new(),
            &connected_wallet(),
            &AssetDraft::default(),
            &PreMintingProgress::default(),
        );
        assert!(gate.reachable_steps.contains(&5));
        assert!(!gate.can_advance);
    }

    #[test]
    fn test_wallet_prompt() {
        let w = WalletConnectionState::new();
        assert!(!needs_wallet_prompt(WizardStep::Wallet, &w));
        assert!(needs_wallet_prompt(WizardStep::PreMinting, &w));
        assert!(!needs_wallet_prompt(WizardStep::Summary, &connected_wallet()));
    }

    #[test]
    fn test_can_advance_follows_current_step() {
        let mut nav = NavigationState::new();
        let mut d = AssetDraft::default();
        let w = WalletConnectionState::new();
        let p = PreMintingProgress::default();
        assert!(!can_advance(&nav, &w, &d, &p));
        d.asset_type = Some(AssetType::Equity);
        assert!(can_advance(&nav, &w, &d, &p));
        nav.advance();
        assert!(!can_advance(&nav, &w, &d, &p));
    }
}
