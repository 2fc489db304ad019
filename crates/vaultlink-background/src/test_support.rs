//! Fakes shared by the background unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use vaultlink_protocols::{
    CredentialEntry, GeneratePasswordOptions, StatusInfo, TotpCode, UnlockSummary, VaultError,
};

use crate::host::{ChannelBroadcaster, MemoryBrowser, MemoryStore, TimerAlarms};
use crate::session::{BackgroundHost, SessionCoordinator, SessionSettings};
use crate::vault::{UnlockGrant, VaultApi};

pub const MASTER: &str = "correct horse";

#[derive(Default)]
struct FakeState {
    items: Vec<CredentialEntry>,
    issued: u32,
    valid: Vec<String>,
    offline: bool,
    calls: Vec<String>,
}

/// Vault kept in memory, accepting [`MASTER`] as the password.
#[derive(Default)]
pub struct FakeVault {
    state: Mutex<FakeState>,
}

impl FakeVault {
    pub fn with_items(items: Vec<CredentialEntry>) -> Arc<Self> {
        let vault = Self::default();
        vault.state.lock().items = items;
        Arc::new(vault)
    }

    /// Invalidate every issued token, as a vault restart would.
    pub fn expire_tokens(&self) {
        self.state.lock().valid.clear();
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    pub fn calls(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == name).count()
    }

    fn authorize(&self, call: &str, token: &str) -> Result<(), VaultError> {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        if state.offline {
            return Err(VaultError::Network("connection refused".to_string()));
        }
        if !state.valid.iter().any(|t| t == token) {
            return Err(VaultError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl VaultApi for FakeVault {
    async fn unlock(&self, password: &str) -> Result<UnlockGrant, VaultError> {
        let mut state = self.state.lock();
        state.calls.push("unlock".to_string());
        if password != MASTER {
            return Err(VaultError::InvalidPassword);
        }
        state.issued += 1;
        let token = format!("token-{}", state.issued);
        state.valid.push(token.clone());
        Ok(UnlockGrant {
            token,
            summary: UnlockSummary {
                item_count: state.items.len(),
            },
        })
    }

    async fn lock(&self, token: &str) -> Result<(), VaultError> {
        self.authorize("lock", token)?;
        self.state.lock().valid.retain(|t| t != token);
        Ok(())
    }

    async fn status(&self, token: &str) -> Result<StatusInfo, VaultError> {
        self.authorize("status", token)?;
        Ok(StatusInfo { locked: false })
    }

    async fn list_items(&self, token: &str) -> Result<Vec<CredentialEntry>, VaultError> {
        self.authorize("list_items", token)?;
        Ok(self.state.lock().items.clone())
    }

    async fn totp(&self, token: &str, id: &str) -> Result<TotpCode, VaultError> {
        self.authorize("totp", token)?;
        let state = self.state.lock();
        match state.items.iter().find(|e| e.id == id && e.has_totp()) {
            Some(_) => Ok(TotpCode {
                code: "123456".to_string(),
                remaining: 30,
            }),
            None => Err(VaultError::Api {
                status: 404,
                message: format!("no totp for {}", id),
            }),
        }
    }

    async fn generate_password(
        &self,
        token: &str,
        options: &GeneratePasswordOptions,
    ) -> Result<String, VaultError> {
        self.authorize("generate_password", token)?;
        Ok("x".repeat(options.length))
    }

    async fn create_item(
        &self,
        token: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError> {
        self.authorize("create_item", token)?;
        let mut state = self.state.lock();
        let mut created = item.clone();
        created.id = format!("new-{}", state.items.len() + 1);
        state.items.push(created.clone());
        Ok(created)
    }

    async fn update_item(
        &self,
        token: &str,
        id: &str,
        item: &CredentialEntry,
    ) -> Result<CredentialEntry, VaultError> {
        self.authorize("update_item", token)?;
        let mut state = self.state.lock();
        let slot = state
            .items
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| VaultError::Api {
                status: 404,
                message: format!("no item {}", id),
            })?;
        *slot = item.clone();
        Ok(slot.clone())
    }

    async fn delete_item(&self, token: &str, id: &str) -> Result<(), VaultError> {
        self.authorize("delete_item", token)?;
        self.state.lock().items.retain(|e| e.id != id);
        Ok(())
    }
}

/// A coordinator wired to in-memory hosts, with handles to inspect them.
pub struct Fixture {
    pub coordinator: Arc<SessionCoordinator>,
    pub vault: Arc<FakeVault>,
    pub session_store: Arc<MemoryStore>,
    pub local_store: Arc<MemoryStore>,
    pub alarms: Arc<TimerAlarms>,
    pub browser: Arc<MemoryBrowser>,
    pub broadcaster: Arc<ChannelBroadcaster>,
}

impl Fixture {
    pub fn new(items: Vec<CredentialEntry>) -> Self {
        Self::with_settings(items, SessionSettings::default())
    }

    pub fn with_settings(items: Vec<CredentialEntry>, settings: SessionSettings) -> Self {
        let vault = FakeVault::with_items(items);
        let session_store = Arc::new(MemoryStore::new());
        let local_store = Arc::new(MemoryStore::new());
        let (alarms, _fired) = TimerAlarms::new();
        let alarms = Arc::new(alarms);
        let browser = Arc::new(MemoryBrowser::new());
        let broadcaster = Arc::new(ChannelBroadcaster::default());
        let host = BackgroundHost {
            session_store: session_store.clone(),
            local_store: local_store.clone(),
            alarms: alarms.clone(),
            browser: browser.clone(),
            broadcaster: broadcaster.clone(),
        };
        let coordinator = Arc::new(SessionCoordinator::new(vault.clone(), host, settings));
        Self {
            coordinator,
            vault,
            session_store,
            local_store,
            alarms,
            browser,
            broadcaster,
        }
    }
}
