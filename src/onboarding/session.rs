//! Persisted Session
//!
//! The auth and onboarding slices saved as one versioned JSON document so
//! the wizard resumes where the user left it.

use super::controller::OnboardingState;
use crate::auth::AuthState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bump when a stored field changes meaning or shape
pub const SESSION_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session version {found} is not supported (expected {expected})")]
    Version { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub auth: AuthState,
    #[serde(default)]
    pub onboarding: OnboardingState,
}

impl Default for PersistedSession {
    fn default() -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at: Utc::now(),
            auth: AuthState::default(),
            onboarding: OnboardingState::default(),
        }
    }
}

impl PersistedSession {
    pub fn new(auth: AuthState, onboarding: OnboardingState) -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at: Utc::now(),
            auth,
            onboarding,
        }
    }

    fn normalize(&mut self) {
        self.auth.normalize();
        self.onboarding.normalize();
    }
}

/// Only the version is read first so an unknown layout is reported as a
/// version mismatch rather than a parse error.
#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: u32,
}

pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session. `Ok(None)` when nothing has been saved yet.
    pub fn try_load(&self) -> Result<Option<PersistedSession>, SessionError> {
        if !self.path.exists() {
            tracing::debug!("No session at {}", self.path.display());
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path)?;
        let probe: VersionProbe = serde_json::from_str(&json)?;
        if probe.version != SESSION_VERSION {
            return Err(SessionError::Version {
                found: probe.version,
                expected: SESSION_VERSION,
            });
        }

        let mut session: PersistedSession = serde_json::from_str(&json)?;
        session.normalize();
        tracing::info!(
            "Session loaded from {} (step {})",
            self.path.display(),
            session.onboarding.navigation.current_step
        );
        Ok(Some(session))
    }

    /// Read the stored session, falling back to a fresh one when the file
    /// is missing, unreadable, or from another version.
    pub fn load_or_default(&self) -> PersistedSession {
        match self.try_load() {
            Ok(Some(session)) => session,
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                tracing::warn!(
                    "Discarding session at {}: {}",
                    self.path.display(),
                    e
                );
                PersistedSession::default()
            }
        }
    }

    /// Write atomically: serialize to a sibling temp file, then rename.
    pub fn save(&self, session: &PersistedSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))?;
        }

        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Remove the stored session. Returns whether a file was deleted.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Session cleared at {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::draft::AssetType;
    use crate::onboarding::wallet::{ConnectingStatus, WalletProvider};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(store(&dir).try_load().unwrap().is_none());
        assert_eq!(
            store(&dir).load_or_default().onboarding,
            OnboardingState::default()
        );
    }

    #[test]
    fn test_save_and_resume() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut onboarding = OnboardingState::default();
        onboarding.draft.asset_type = Some(AssetType::Debt);
        onboarding.navigation.advance();
        onboarding.wallet.selected_provider = Some(WalletProvider::Metamask);
        onboarding.wallet.wallet_address = Some("0xA".into());
        let mut auth = AuthState::new();
        auth.set_email_for_reset("a@b.co");

        store
            .save(&PersistedSession::new(auth, onboarding.clone()))
            .unwrap();
        let loaded = store.try_load().unwrap().unwrap();

        assert_eq!(loaded.version, SESSION_VERSION);
        assert_eq!(loaded.onboarding, onboarding);
        assert_eq!(loaded.auth.email_for_reset.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_in_flight_connection_normalized() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let mut onboarding = OnboardingState::default();
        onboarding.wallet.show_modal = true;
        onboarding.wallet.connecting_status = ConnectingStatus::Connecting;
        onboarding.wallet.temp_provider = Some(WalletProvider::Phantom);
        store
            .save(&PersistedSession::new(AuthState::new(), onboarding))
            .unwrap();

        let loaded = store.try_load().unwrap().unwrap();
        assert_eq!(loaded.onboarding.wallet.connecting_status, ConnectingStatus::Idle);
        assert!(!loaded.onboarding.wallet.show_modal);
        assert!(loaded.onboarding.wallet.temp_provider.is_none());
    }

    #[test]
    fn test_version_mismatch_discarded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"version":99,"whatever":true}"#).unwrap();

        assert!(matches!(
            store.try_load(),
            Err(SessionError::Version { found: 99, expected: 1 })
        ));
        assert_eq!(store.load_or_default().version, SESSION_VERSION);
    }

    #[test]
    fn test_garbage_discarded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.try_load(), Err(SessionError::Json(_))));
        assert_eq!(
            store.load_or_default().onboarding.navigation.current_step,
            1
        );
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.clear().unwrap());
        store.save(&PersistedSession::default()).unwrap();
        assert!(store.clear().unwrap());
        assert!(!store.path().exists());
    }
}
