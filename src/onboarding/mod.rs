//! Onboarding Wizard
//!
//! The seven-step issuance flow: step registry, navigation, the wallet
//! connection machine, gating, and the controller that ties them
//! together.

pub mod controller;
pub mod draft;
pub mod gating;
pub mod navigation;
pub mod provider;
pub mod session;
pub mod steps;
pub mod view;
pub mod wallet;

pub use controller::{Action, Blocked, Effect, IssuedAsset, OnboardingController, OnboardingState};
pub use draft::{AssetDraft, AssetType, DraftField, PreMintingItem, PreMintingProgress};
pub use gating::Gate;
pub use navigation::NavigationState;
pub use provider::{WalletError, WalletProviderApi};
pub use session::{PersistedSession, SessionError, SessionStore};
pub use steps::{Step, WizardStep};
pub use view::{StepBody, StepView};
pub use wallet::{ConnectingStatus, WalletConnectionState, WalletOption, WalletProvider};
