//! Step Registry
//!
//! The fixed, ordered list of wizard steps. Steps are identified by
//! [`WizardStep`] everywhere; the 1-based number is only used for
//! display and for the navigation cursor.

use serde::{Deserialize, Serialize};

/// Identifier for each step of the issuance wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    AssetType,
    Network,
    Wallet,
    PreMinting,
    AssetInfo,
    AssetDetails,
    Summary,
}

impl WizardStep {
    /// All steps in registry order
    pub const ALL: [WizardStep; 7] = [
        Self::AssetType,
        Self::Network,
        Self::Wallet,
        Self::PreMinting,
        Self::AssetInfo,
        Self::AssetDetails,
        Self::Summary,
    ];

    /// Step number (1-based)
    pub fn number(&self) -> usize {
        match self {
            Self::AssetType => 1,
            Self::Network => 2,
            Self::Wallet => 3,
            Self::PreMinting => 4,
            Self::AssetInfo => 5,
            Self::AssetDetails => 6,
            Self::Summary => 7,
        }
    }

    /// Look up a step by its 1-based number
    pub fn from_number(n: usize) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.number() == n)
    }

    /// Total number of steps
    pub fn total() -> usize {
        Self::ALL.len()
    }

    /// Sidebar title
    pub fn title(&self) -> &'static str {
        match self {
            Self::AssetType => "Start building your Digital Assets",
            Self::Network => "Select a Network",
            Self::Wallet => "Connect your wallet",
            Self::PreMinting => "Pre-minting required steps",
            Self::AssetInfo => "Enter your Digital Asset information",
            Self::AssetDetails => "Input your Digital Asset details",
            Self::Summary => "Digital Asset Issuance Summary",
        }
    }

    /// Sidebar description
    pub fn description(&self) -> &'static str {
        match self {
            Self::AssetType => {
                "Looking for funding? Ready to share profits? Tokenize your assets and achieve your goals effortlessly!"
            }
            Self::Network => {
                "Choose your preferred blockchain network for tokenization and optimize your transaction costs, speed, and efficiency."
            }
            Self::Wallet => {
                "Your wallet is the gateway to seamless tokenization! Effortlessly manage your digital assets and ensure secure transactions. Connect your wallet now to get started!"
            }
            Self::PreMinting => {
                "You're just 3 steps away from issuing your digital asset. Let's get started!"
            }
            Self::AssetInfo => {
                "Define and showcase the true value of your digital asset with clarity and confidence."
            }
            Self::AssetDetails => {
                "Provide essential details and ensure compliance with legal regulations to secure and validate your digital asset."
            }
            Self::Summary => {
                "You're just one step away from issuing your Digital Asset! Review your details and confirm to proceed."
            }
        }
    }

    /// Whether direct navigation to this step requires a connected wallet
    pub fn is_wallet_gated(&self) -> bool {
        *self > Self::Wallet
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// A registry entry together with its progress flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: usize,
    pub kind: WizardStep,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub active: bool,
}

impl Step {
    fn new(kind: WizardStep) -> Self {
        Self {
            id: kind.number(),
            kind,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            completed: false,
            active: false,
        }
    }
}

/// Build the canonical registry with step 1 active
pub fn registry() -> Vec<Step> {
    let mut steps: Vec<Step> = WizardStep::ALL.iter().map(|k| Step::new(*k)).collect();
    if let Some(first) = steps.first_mut() {
        first.active = true;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_numbers_are_contiguous() {
        for (i, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.number(), i + 1);
            assert_eq!(WizardStep::from_number(i + 1), Some(*step));
        }
        assert_eq!(WizardStep::total(), 7);
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(8), None);
    }

    #[test]
    fn test_registry_initial_flags() {
        let steps = registry();
        assert_eq!(steps.len(), 7);
        assert!(steps[0].active);
        assert_eq!(steps.iter().filter(|s| s.active).count(), 1);
        assert!(steps.iter().all(|s| !s.completed));
        assert_eq!(steps[2].kind, WizardStep::Wallet);
        assert_eq!(steps[2].title, "Connect your wallet");
    }

    #[test]
    fn test_wallet_gated_steps() {
        let gated: Vec<usize> = WizardStep::ALL
            .iter()
            .filter(|s| s.is_wallet_gated())
            .map(|s| s.number())
            .collect();
        assert_eq!(gated, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_step_serializes_kebab_case() {
        let json = serde_json::to_string(&WizardStep::PreMinting).unwrap();
        assert_eq!(json, "\"pre-minting\"");
    }
}
