//! Wallet Connection State Machine
//!
//! `idle -> connecting -> {success, error}`, `error -> idle` via retry,
//! `success` holds until the modal closes or the wallet disconnects.
//!
//! Every connection attempt gets an id. Provider results and the delayed
//! auto-advance carry that id back, and anything that no longer matches
//! the live attempt is dropped.

use super::provider::WalletError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the user is creating a new wallet or bringing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletOption {
    New,
    Existing,
}

/// Wallet providers offered in the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalletProvider {
    MagicLink,
    Metamask,
    Phantom,
}

impl WalletProvider {
    pub const ALL: [WalletProvider; 3] = [Self::Metamask, Self::MagicLink, Self::Phantom];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MagicLink => "Magic Link",
            Self::Metamask => "MetaMask",
            Self::Phantom => "Phantom",
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::MagicLink => "magic-link",
            Self::Metamask => "metamask",
            Self::Phantom => "phantom",
        }
    }
}

impl std::fmt::Display for WalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Connection lifecycle status shown in the picker modal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectingStatus {
    #[default]
    Idle,
    Connecting,
    Success,
    Error,
}

/// Handed out by [`WalletConnectionState::begin_connection`]; the caller
/// performs the provider call and reports back with the same attempt id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTicket {
    pub attempt: Uuid,
    pub provider: WalletProvider,
}

/// Why a transition request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    ModalClosed,
    Busy,
    NoProviderSelected,
    AlreadyConnected,
    NotInError,
}

/// What applying a provider result did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Connected { provider: WalletProvider, address: String },
    Failed,
    /// Result belonged to an attempt that is no longer live
    Stale,
}

/// What an external account-change notification did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountsChange {
    Disconnected,
    Switched(String),
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConnectionState {
    pub wallet_option: Option<WalletOption>,
    pub selected_provider: Option<WalletProvider>,
    /// Pending choice inside the picker, not yet connected
    pub temp_provider: Option<WalletProvider>,
    pub connecting_status: ConnectingStatus,
    pub wallet_address: Option<String>,
    pub show_modal: bool,

    /// The live attempt and the provider it was started with
    #[serde(skip)]
    attempt: Option<ConnectionTicket>,
    #[serde(skip)]
    pending_advance: Option<Uuid>,
    /// Last failure detail, for logs only; the UI shows a generic notice
    #[serde(skip)]
    pub last_error: Option<String>,
}

impl WalletConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connected wallet has both an address and a known provider
    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some() && self.selected_provider.is_some()
    }

    fn is_live(&self, attempt: Uuid) -> bool {
        self.attempt.map(|t| t.attempt) == Some(attempt)
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting_status == ConnectingStatus::Connecting
    }

    /// The modal may be dismissed in every status except `connecting`
    pub fn can_close_modal(&self) -> bool {
        !self.is_connecting()
    }

    /// Choose between creating and bringing a wallet. Ignored once connected.
    pub fn choose_option(&mut self, option: WalletOption) -> Result<(), Refusal> {
        if self.is_connected() {
            return Err(Refusal::AlreadyConnected);
        }
        self.wallet_option = Some(option);
        Ok(())
    }

    /// Open the provider picker in a clean `idle` state
    pub fn open_modal(&mut self) -> Result<(), Refusal> {
        if self.is_connecting() {
            return Err(Refusal::Busy);
        }
        self.show_modal = true;
        self.connecting_status = ConnectingStatus::Idle;
        self.temp_provider = None;
        self.attempt = None;
        self.pending_advance = None;
        Ok(())
    }

    /// Close the picker. Resets the status and the pending choice but keeps
    /// any connected wallet. Refused while a connection is in flight.
    pub fn close_modal(&mut self) -> Result<(), Refusal> {
        if !self.can_close_modal() {
            return Err(Refusal::Busy);
        }
        self.show_modal = false;
        self.connecting_status = ConnectingStatus::Idle;
        self.temp_provider = None;
        self.attempt = None;
        Ok(())
    }

    /// Set the pending picker choice. Never connects or disconnects anything.
    pub fn select_provider(&mut self, provider: WalletProvider) -> Result<(), Refusal> {
        if !self.show_modal {
            return Err(Refusal::ModalClosed);
        }
        if self.connecting_status != ConnectingStatus::Idle {
            return Err(Refusal::Busy);
        }
        self.temp_provider = Some(provider);
        Ok(())
    }

    /// Move to `connecting` for the pending choice and hand out a ticket
    /// for the asynchronous provider call.
    pub fn begin_connection(&mut self) -> Result<ConnectionTicket, Refusal> {
        if !self.show_modal {
            return Err(Refusal::ModalClosed);
        }
        if self.connecting_status != ConnectingStatus::Idle {
            return Err(Refusal::Busy);
        }
        let provider = self.temp_provider.ok_or(Refusal::NoProviderSelected)?;

        let ticket = ConnectionTicket {
            attempt: Uuid::new_v4(),
            provider,
        };
        self.attempt = Some(ticket);
        self.pending_advance = None;
        self.connecting_status = ConnectingStatus::Connecting;
        self.last_error = None;
        tracing::info!("Connecting wallet via {} (attempt {})", provider, ticket.attempt);
        Ok(ticket)
    }

    /// Apply the outcome of a provider call.
    pub fn resolve(
        &mut self,
        attempt: Uuid,
        outcome: Result<String, WalletError>,
    ) -> Resolution {
        let ticket = match self.attempt {
            Some(ticket) if ticket.attempt == attempt && self.is_connecting() => ticket,
            _ => {
                tracing::debug!("Ignoring stale wallet result for attempt {}", attempt);
                return Resolution::Stale;
            }
        };

        match outcome {
            Ok(address) => {
                let provider = ticket.provider;
                self.selected_provider = Some(provider);
                self.wallet_address = Some(address.clone());
                self.connecting_status = ConnectingStatus::Success;
                self.pending_advance = Some(attempt);
                tracing::info!("Wallet connected via {}: {}", provider, address);
                Resolution::Connected { provider, address }
            }
            Err(e) => {
                tracing::warn!("Wallet connection failed: {}", e);
                self.connecting_status = ConnectingStatus::Error;
                self.last_error = Some(e.to_string());
                Resolution::Failed
            }
        }
    }

    /// Runs after the success display delay. Closes the picker if it still
    /// shows this attempt and reports whether the wizard should advance.
    pub fn finish_success(&mut self, attempt: Uuid) -> bool {
        if self.pending_advance != Some(attempt) {
            return false;
        }
        self.pending_advance = None;
        if self.is_live(attempt) {
            self.show_modal = false;
            self.connecting_status = ConnectingStatus::Idle;
            self.temp_provider = None;
            self.attempt = None;
        }
        true
    }

    /// Leave `error` and allow a fresh pick. The committed provider is only
    /// dropped when no wallet is held, so an address never loses its provider.
    pub fn retry(&mut self) -> Result<(), Refusal> {
        if self.connecting_status != ConnectingStatus::Error {
            return Err(Refusal::NotInError);
        }
        self.connecting_status = ConnectingStatus::Idle;
        self.temp_provider = None;
        self.attempt = None;
        if self.wallet_address.is_none() {
            self.selected_provider = None;
        }
        Ok(())
    }

    /// Forget the connected wallet. Navigation is not touched.
    pub fn disconnect(&mut self) {
        if let Some(addr) = &self.wallet_address {
            tracing::info!("Wallet disconnected: {}", addr);
        }
        self.wallet_address = None;
        self.selected_provider = None;
        self.wallet_option = None;
        self.pending_advance = None;
    }

    /// Sync with an account change that happened inside the wallet itself.
    pub fn accounts_changed(
        &mut self,
        source: WalletProvider,
        accounts: &[String],
    ) -> AccountsChange {
        match accounts.first() {
            None => {
                if self.wallet_address.is_none() && self.selected_provider.is_none() {
                    return AccountsChange::Ignored;
                }
                self.disconnect();
                AccountsChange::Disconnected
            }
            Some(account) if self.selected_provider == Some(source) => {
                if self.wallet_address.as_deref() == Some(account.as_str()) {
                    return AccountsChange::Ignored;
                }
                tracing::info!("Active {} account changed to {}", source, account);
                self.wallet_address = Some(account.clone());
                AccountsChange::Switched(account.clone())
            }
            Some(_) => AccountsChange::Ignored,
        }
    }

    /// Reset transient fields after loading from storage. A connection
    /// that was in flight when the session was saved has no observer now.
    pub fn normalize(&mut self) {
        self.connecting_status = ConnectingStatus::Idle;
        self.show_modal = false;
        self.temp_provider = None;
        self.attempt = None;
        self.pending_advance = None;
        if self.wallet_address.is_some() && self.selected_provider.is_none() {
            self.wallet_address = None;
        }
    }
}
