//! Wallet Providers
//!
//! The external agents that hand out account addresses. `metamask` talks
//! to an EIP-1193 style JSON-RPC endpoint; `magic-link` and `phantom` are
//! simulated with a fixed latency and success rate.

use super::wallet::WalletProvider;
use crate::config::WalletConfig;
use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// JSON-RPC code for "user rejected the request"
const USER_REJECTED: i64 = 4001;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet provider '{0}' is not available")]
    Unavailable(String),

    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Wallet did not respond within {0}s")]
    Timeout(u64),

    #[error("Wallet transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Account list change reported by a provider outside of any user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountsEvent {
    pub provider: WalletProvider,
    pub accounts: Vec<String>,
}

#[async_trait]
pub trait WalletProviderApi: Send + Sync {
    fn kind(&self) -> WalletProvider;

    async fn is_available(&self) -> bool;

    /// Ask the wallet for access. May prompt the user, may reject.
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    /// Currently authorised accounts without prompting.
    /// `None` when the provider cannot report account changes.
    async fn accounts(&self) -> Result<Option<Vec<String>>, WalletError> {
        Ok(None)
    }
}

/// Run one connection attempt. The first returned account is canonical.
pub async fn connect(provider: &dyn WalletProviderApi) -> Result<String, WalletError> {
    if !provider.is_available().await {
        return Err(WalletError::Unavailable(provider.kind().id().to_string()));
    }
    let accounts = provider.request_accounts().await?;
    accounts.into_iter().next().ok_or(WalletError::NoAccounts)
}

/// [`connect`] bounded by an application-level timeout
pub async fn connect_with_timeout(
    provider: &dyn WalletProviderApi,
    timeout: Duration,
) -> Result<String, WalletError> {
    match tokio::time::timeout(timeout, connect(provider)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                "{} did not answer within {}s",
                provider.kind(),
                timeout.as_secs()
            );
            Err(WalletError::Timeout(timeout.as_secs()))
        }
    }
}

/// Build the provider used for `kind`
pub fn provider_for(
    kind: WalletProvider,
    config: &WalletConfig,
) -> Result<Arc<dyn WalletProviderApi>, WalletError> {
    match kind {
        WalletProvider::Metamask => Ok(Arc::new(JsonRpcProvider::new(
            kind,
            &config.rpc_url,
            Duration::from_secs(config.connect_timeout_secs),
        )?)),
        WalletProvider::MagicLink | WalletProvider::Phantom => Ok(Arc::new(SimulatedProvider::new(
            kind,
            Duration::from_millis(config.simulated_latency_ms),
            config.simulated_success_rate,
        ))),
    }
}

/// Poll `provider` for account changes and forward them until the returned
/// token is cancelled. The first poll only records a baseline.
pub fn watch_accounts(
    provider: Arc<dyn WalletProviderApi>,
    interval: Duration,
    tx: mpsc::UnboundedSender<AccountsEvent>,
) -> CancellationToken {
    let token = CancellationToken::new();
    let cancel = token.clone();
    let kind = provider.kind();

    tokio::spawn(async move {
        let mut last: Option<Vec<String>> = None;
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match provider.accounts().await {
                        Ok(Some(accounts)) => {
                            if last.as_ref() == Some(&accounts) {
                                continue;
                            }
                            let baseline = last.is_none();
                            last = Some(accounts.clone());
                            if !baseline
                                && tx.send(AccountsEvent { provider: kind, accounts }).is_err()
                            {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => tracing::debug!("Account poll for {} failed: {}", kind, e),
                    }
                }
            }
        }
        tracing::debug!("Stopped watching {} accounts", kind);
    });

    token
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// EIP-1193 style provider reached over HTTP JSON-RPC
pub struct JsonRpcProvider {
    kind: WalletProvider,
    client: reqwest::Client,
    url: String,
}

impl JsonRpcProvider {
    pub fn new(kind: WalletProvider, url: &str, timeout: Duration) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            kind,
            client,
            url: url.trim().to_string(),
        })
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let payload = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::Transport(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WalletError::Transport(format!("failed to parse response: {}", e)))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(|c| c.as_i64()).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return Err(if code == USER_REJECTED {
                WalletError::Rejected(message)
            } else {
                WalletError::Transport(format!("rpc error {}: {}", code, message))
            });
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| WalletError::Transport("empty response".to_string()))
    }

    async fn account_list(&self, method: &str) -> Result<Vec<String>, WalletError> {
        let result = self.request(method, json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::Transport(format!("unexpected accounts payload: {}", e)))
    }
}

#[async_trait]
impl WalletProviderApi for JsonRpcProvider {
    fn kind(&self) -> WalletProvider {
        self.kind
    }

    async fn is_available(&self) -> bool {
        if self.url.is_empty() {
            return false;
        }
        match self.request("eth_chainId", json!([])).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("{} unavailable at {}: {}", self.kind, self.url, e);
                false
            }
        }
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.account_list("eth_requestAccounts").await
    }

    async fn accounts(&self) -> Result<Option<Vec<String>>, WalletError> {
        self.account_list("eth_accounts").await.map(Some)
    }
}

/// Stand-in for providers without a local endpoint
pub struct SimulatedProvider {
    kind: WalletProvider,
    latency: Duration,
    success_rate: f64,
}

impl SimulatedProvider {
    pub fn new(kind: WalletProvider, latency: Duration, success_rate: f64) -> Self {
        Self {
            kind,
            latency,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    fn address_prefix(&self) -> &'static str {
        match self.kind {
            WalletProvider::Phantom => "Ph",
            _ => "0x",
        }
    }

    fn roll(&self) -> Option<String> {
        let mut rng = rand::rng();
        if !rng.random_bool(self.success_rate) {
            return None;
        }
        let hex: String = (0..40)
            .map(|_| char::from_digit(rng.random_range(0..16u32), 16).unwrap_or('0'))
            .collect();
        Some(format!("{}{}", self.address_prefix(), hex))
    }
}

#[async_trait]
impl WalletProviderApi for SimulatedProvider {
    fn kind(&self) -> WalletProvider {
        self.kind
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        tokio::time::sleep(self.latency).await;
        match self.roll() {
            Some(address) => Ok(vec![address]),
            None => Err(WalletError::Rejected(format!(
                "{} connection failed",
                self.kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn rpc_provider(url: &str) -> JsonRpcProvider {
        JsonRpcProvider::new(WalletProvider::Metamask, url, Duration::from_secs(5)).unwrap()
    }

    async fn mock_method(
        server: &mut mockito::ServerGuard,
        method: &str,
        body: &str,
    ) -> mockito::Mock {
        server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": method })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_rpc_connect_returns_first_account() {
        let mut server = mockito::Server::new_async().await;
        let chain = mock_method(&mut server, "eth_chainId", r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).await;
        let accounts = mock_method(
            &mut server,
            "eth_requestAccounts",
            r#"{"jsonrpc":"2.0","id":1,"result":["0xABCD1234","0xFFFF0000"]}"#,
        )
        .await;

        let provider = rpc_provider(&server.url());
        let address = connect(&provider).await.unwrap();

        chain.assert_async().await;
        accounts.assert_async().await;
        assert_eq!(address, "0xABCD1234");
    }

    #[tokio::test]
    async fn test_rpc_empty_accounts_is_failure() {
        let mut server = mockito::Server::new_async().await;
        mock_method(&mut server, "eth_chainId", r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).await;
        mock_method(&mut server, "eth_requestAccounts", r#"{"jsonrpc":"2.0","id":1,"result":[]}"#).await;

        let provider = rpc_provider(&server.url());
        assert_eq!(connect(&provider).await, Err(WalletError::NoAccounts));
    }

    #[tokio::test]
    async fn test_rpc_user_rejection() {
        let mut server = mockito::Server::new_async().await;
        mock_method(&mut server, "eth_chainId", r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#).await;
        mock_method(
            &mut server,
            "eth_requestAccounts",
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected the request."}}"#,
        )
        .await;

        let provider = rpc_provider(&server.url());
        let err = connect(&provider).await.unwrap_err();
        assert_eq!(err, WalletError::Rejected("User rejected the request.".into()));
    }

    #[tokio::test]
    async fn test_rpc_unavailable_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let provider = rpc_provider(&server.url());
        assert!(!provider.is_available().await);
        mock.assert_async().await;

        let empty = rpc_provider("");
        assert!(matches!(
            connect(&empty).await,
            Err(WalletError::Unavailable(id)) if id == "metamask"
        ));
    }

    #[tokio::test]
    async fn test_rpc_accounts_poll() {
        let mut server = mockito::Server::new_async().await;
        mock_method(&mut server, "eth_accounts", r#"{"jsonrpc":"2.0","id":1,"result":["0xB"]}"#).await;

        let provider = rpc_provider(&server.url());
        assert_eq!(
            provider.accounts().await.unwrap(),
            Some(vec!["0xB".to_string()])
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_always_succeeds() {
        let provider = SimulatedProvider::new(WalletProvider::Phantom, Duration::from_secs(2), 1.0);
        let address = connect(&provider).await.unwrap();
        assert!(address.starts_with("Ph"));
        assert_eq!(address.len(), 42);
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));

        let magic = SimulatedProvider::new(WalletProvider::MagicLink, Duration::ZERO, 1.0);
        assert!(connect(&magic).await.unwrap().starts_with("0x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_always_fails() {
        let provider = SimulatedProvider::new(WalletProvider::MagicLink, Duration::from_secs(2), 0.0);
        assert!(matches!(
            connect(&provider).await,
            Err(WalletError::Rejected(_))
        ));
        // No change notifications from a simulated wallet
        assert_eq!(provider.accounts().await, Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout() {
        let slow = SimulatedProvider::new(WalletProvider::Phantom, Duration::from_secs(120), 1.0);
        let result = connect_with_timeout(&slow, Duration::from_secs(45)).await;
        assert_eq!(result, Err(WalletError::Timeout(45)));
    }

    struct ScriptedProvider {
        polls: std::sync::Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl WalletProviderApi for ScriptedProvider {
        fn kind(&self) -> WalletProvider {
            WalletProvider::Metamask
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
            Ok(vec![])
        }

        async fn accounts(&self) -> Result<Option<Vec<String>>, WalletError> {
            let mut polls = self.polls.lock().unwrap();
            if polls.is_empty() {
                return Ok(Some(vec![]));
            }
            Ok(Some(polls.remove(0)))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_accounts_reports_changes_only() {
        let provider = Arc::new(ScriptedProvider {
            polls: std::sync::Mutex::new(vec![
                vec!["0xA".into()],
                vec!["0xA".into()],
                vec!["0xB".into()],
            ]),
        });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = watch_accounts(provider, Duration::from_secs(1), tx);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.accounts, vec!["0xB".to_string()]);
        assert_eq!(first.provider, WalletProvider::Metamask);

        // Then the scripted wallet goes empty
        let second = rx.recv().await.unwrap();
        assert!(second.accounts.is_empty());

        token.cancel();
    }

    #[test]
    fn test_provider_for_kinds() {
        let config = WalletConfig::default();
        let p = provider_for(WalletProvider::Phantom, &config).unwrap();
        assert_eq!(p.kind(), WalletProvider::Phantom);
        let p = provider_for(WalletProvider::Metamask, &config).unwrap();
        assert_eq!(p.kind(), WalletProvider::Metamask);
    }
}
