//! Session lifecycle: lock state, auto-lock, keep-alive and badges.
//!
//! The coordinator is the only writer of the session record. At most one
//! auto-lock mechanism is armed at a time: the one-shot alarm for a minutes
//! policy, or the keep-alive heartbeat plus window-close watch for the
//! lock-on-close policy.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vaultlink_config::Config;
use vaultlink_matching::count_matches;
use vaultlink_protocols::{
    AlarmScheduler, AutoLockPolicy, BrowserHost, Broadcaster, Event, HostError, KeyValueStore,
    RouterError, Session, UnlockSummary, VaultError, load_json, storage_keys, store_json,
};

use crate::vault::VaultApi;

/// Name of the auto-lock alarm.
pub const AUTO_LOCK_ALARM: &str = "vaultlink-auto-lock";

/// Shortest heartbeat period; `tokio::time::interval` rejects zero.
const MIN_KEEP_ALIVE: Duration = Duration::from_secs(1);

/// Coordinator settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Policy used until the user picks one.
    pub default_policy: AutoLockPolicy,
    pub keep_alive: Duration,
    pub window_close_settle: Duration,
    pub badge_color: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_policy: AutoLockPolicy::try_from(config.session.auto_lock_minutes)
                .unwrap_or_default(),
            keep_alive: Duration::from_secs(config.session.keep_alive_seconds)
                .max(MIN_KEEP_ALIVE),
            window_close_settle: Duration::from_millis(config.session.window_close_settle_ms),
            badge_color: config.badge.color.clone(),
        }
    }
}

/// Browser services the background runs against.
#[derive(Clone)]
pub struct BackgroundHost {
    /// Ephemeral store holding the session record.
    pub session_store: Arc<dyn KeyValueStore>,
    /// Durable store holding the auto-lock policy.
    pub local_store: Arc<dyn KeyValueStore>,
    pub alarms: Arc<dyn AlarmScheduler>,
    pub browser: Arc<dyn BrowserHost>,
    pub broadcaster: Arc<dyn Broadcaster>,
}

pub struct SessionCoordinator {
    vault: Arc<dyn VaultApi>,
    host: BackgroundHost,
    settings: SessionSettings,
    keep_alive: Mutex<Option<JoinHandle<()>>>,
    window_check: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    pub fn new(vault: Arc<dyn VaultApi>, host: BackgroundHost, settings: SessionSettings) -> Self {
        Self {
            vault,
            host,
            settings,
            keep_alive: Mutex::new(None),
            window_check: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Current session record; absent or unreadable means locked.
    pub async fn session(&self) -> Session {
        match load_json::<Session>(self.host.session_store.as_ref(), storage_keys::SESSION).await
        {
            Ok(session) => session.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Could not read session");
                Session::locked()
            }
        }
    }

    /// Token for authenticated vault calls, if unlocked.
    pub async fn token(&self) -> Option<String> {
        self.session().await.active_token().map(str::to_string)
    }

    pub async fn is_unlocked(&self) -> bool {
        self.token().await.is_some()
    }

    /// Stored auto-lock policy, or the configured default.
    pub async fn auto_lock_policy(&self) -> AutoLockPolicy {
        match load_json(self.host.local_store.as_ref(), storage_keys::AUTO_LOCK).await {
            Ok(Some(policy)) => policy,
            Ok(None) => self.settings.default_policy,
            Err(e) => {
                warn!(error = %e, "Could not read auto-lock policy");
                self.settings.default_policy
            }
        }
    }

    pub async fn unlock(&self, password: &str) -> Result<UnlockSummary, RouterError> {
        let grant = self.vault.unlock(password).await?;
        store_json(
            self.host.session_store.as_ref(),
            storage_keys::SESSION,
            &Session::unlocked(grant.token),
        )
        .await?;
        info!(items = grant.summary.item_count, "Vault unlocked");

        self.set_icon(false).await;
        let policy = self.auto_lock_policy().await;
        self.disarm().await;
        self.arm(policy).await;
        self.notify(Event::VaultUnlocked).await;
        self.refresh_badge().await;
        Ok(grant.summary)
    }

    /// Lock on user request or alarm. The vault is told on a best-effort basis.
    pub async fn lock(&self) {
        if let Some(token) = self.token().await {
            if let Err(e) = self.vault.lock(&token).await {
                debug!(error = %e, "Vault lock call failed");
            }
        }
        info!("Vault locked");
        self.lock_local().await;
    }

    /// The vault rejected the token: the session is gone.
    pub async fn handle_unauthorized(&self) {
        warn!("Vault rejected the session token, locking");
        self.lock_local().await;
    }

    /// Slide the auto-lock deadline. No-op while locked or under the
    /// lock-on-close policy.
    pub async fn reset_auto_lock(&self) {
        if !self.is_unlocked().await {
            return;
        }
        if let AutoLockPolicy::Minutes(minutes) = self.auto_lock_policy().await {
            if let Err(e) = self.host.alarms.create(AUTO_LOCK_ALARM, minutes).await {
                warn!(error = %e, "Could not reset auto-lock alarm");
            }
        }
    }

    /// Persist a new policy and switch mechanisms, cancelling the old one
    /// first.
    pub async fn set_auto_lock_policy(&self, policy: AutoLockPolicy) -> Result<(), HostError> {
        store_json(self.host.local_store.as_ref(), storage_keys::AUTO_LOCK, &policy).await?;
        info!(%policy, "Auto-lock policy changed");
        self.disarm().await;
        if self.is_unlocked().await {
            self.arm(policy).await;
        }
        Ok(())
    }

    pub async fn on_alarm(&self, name: &str) {
        if name == AUTO_LOCK_ALARM {
            info!("Auto-lock alarm fired");
            self.lock().await;
        }
    }

    /// A browser window closed. Under the lock-on-close policy, wait for the
    /// close to settle and lock when no window and no tab remain. A newer
    /// event replaces a pending check.
    pub async fn on_window_removed(self: &Arc<Self>) {
        if !self.is_unlocked().await || !self.auto_lock_policy().await.is_browser_close() {
            return;
        }
        let coordinator = Arc::clone(self);
        let settle = self.settings.window_close_settle;
        let task = tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            coordinator.window_check.lock().take();
            coordinator.check_browser_closed().await;
        });
        if let Some(previous) = self.window_check.lock().replace(task) {
            previous.abort();
        }
    }

    async fn check_browser_closed(&self) {
        let windows = self.host.browser.normal_window_count().await;
        let tabs = self.host.browser.tab_count().await;
        match (windows, tabs) {
            (Ok(0), Ok(0)) => {
                if self.is_unlocked().await {
                    info!("Browser closed, locking");
                    self.lock().await;
                }
            }
            (Ok(windows), Ok(tabs)) => debug!(windows, tabs, "Browser still open"),
            (Err(e), _) | (_, Err(e)) => warn!(error = %e, "Could not count windows"),
        }
    }

    pub async fn on_tab_activated(&self, tab_id: u32) {
        debug!(tab_id, "Tab activated");
        self.refresh_badge().await;
    }

    /// A tab changed; only a completed load of the active tab matters.
    pub async fn on_tab_updated(&self, tab_id: u32, complete: bool) {
        if !complete {
            return;
        }
        let active = self.host.browser.active_tab().await.ok().flatten();
        if active.is_some_and(|t| t.id == tab_id) {
            self.refresh_badge().await;
        }
    }

    /// Show the match count for the active tab. Locked clears the badge
    /// without asking the vault.
    pub async fn refresh_badge(&self) {
        let tab = match self.host.browser.active_tab().await {
            Ok(Some(tab)) => tab,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "Could not read active tab");
                return;
            }
        };

        let text = match (self.token().await, tab.url.as_deref()) {
            (None, _) | (_, None) => String::new(),
            (Some(token), Some(url)) => match self.vault.list_items(&token).await {
                Ok(items) => badge_text(count_matches(&items, url)),
                Err(VaultError::Unauthorized) => {
                    self.handle_unauthorized().await;
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Could not count matches for badge");
                    return;
                }
            },
        };
        if let Err(e) = self
            .host
            .browser
            .set_badge(tab.id, &text, &self.settings.badge_color)
            .await
        {
            warn!(error = %e, "Could not set badge");
        }
    }

    /// Coordinator (re)started: restore the mechanism for a session that
    /// survived suspension, after checking the vault still honours it.
    pub async fn on_startup(&self) {
        let Some(token) = self.token().await else {
            self.set_icon(true).await;
            return;
        };
        match self.vault.status(&token).await {
            Ok(status) if !status.locked => {}
            Ok(_) | Err(VaultError::Unauthorized) => {
                self.handle_unauthorized().await;
                return;
            }
            Err(e) => warn!(error = %e, "Vault unreachable on startup, keeping session"),
        }
        info!("Restoring unlocked session");
        self.set_icon(false).await;
        let policy = self.auto_lock_policy().await;
        self.disarm().await;
        self.arm(policy).await;
    }

    async fn lock_local(&self) {
        if let Err(e) = self
            .host
            .session_store
            .remove(storage_keys::SESSION)
            .await
        {
            warn!(error = %e, "Could not clear session");
        }
        self.disarm().await;
        if let Some(check) = self.window_check.lock().take() {
            check.abort();
        }
        self.set_icon(true).await;
        if let Err(e) = self.host.browser.clear_badges().await {
            warn!(error = %e, "Could not clear badges");
        }
        self.notify(Event::VaultLocked).await;
    }

    async fn arm(&self, policy: AutoLockPolicy) {
        match policy {
            AutoLockPolicy::Minutes(minutes) => {
                debug!(minutes, "Arming auto-lock alarm");
                if let Err(e) = self.host.alarms.create(AUTO_LOCK_ALARM, minutes).await {
                    warn!(error = %e, "Could not create auto-lock alarm");
                }
            }
            AutoLockPolicy::OnBrowserClose => self.start_keep_alive(),
        }
    }

    async fn disarm(&self) {
        if let Err(e) = self.host.alarms.clear(AUTO_LOCK_ALARM).await {
            warn!(error = %e, "Could not clear auto-lock alarm");
        }
        if let Some(heartbeat) = self.keep_alive.lock().take() {
            debug!("Stopping keep-alive");
            heartbeat.abort();
        }
    }

    fn start_keep_alive(&self) {
        let browser = self.host.browser.clone();
        let period = self.settings.keep_alive.max(MIN_KEEP_ALIVE);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = browser.keep_alive().await {
                    warn!(error = %e, "Keep-alive ping failed");
                }
            }
        });
        debug!(period_secs = period.as_secs(), "Keep-alive started");
        if let Some(previous) = self.keep_alive.lock().replace(task) {
            previous.abort();
        }
    }

    pub fn keep_alive_running(&self) -> bool {
        self.keep_alive.lock().is_some()
    }

    async fn set_icon(&self, locked: bool) {
        if let Err(e) = self.host.browser.set_locked_icon(locked).await {
            warn!(error = %e, "Could not update toolbar icon");
        }
    }

    async fn notify(&self, event: Event) {
        match self.host.broadcaster.broadcast(event).await {
            Ok(()) | Err(HostError::NoListeners) => {}
            Err(e) => warn!(error = %e, ?event, "Broadcast failed"),
        }
    }
}

impl Drop for SessionCoordinator {
    fn drop(&mut self) {
        if let Some(task) = self.keep_alive.get_mut().take() {
            task.abort();
        }
        if let Some(task) = self.window_check.get_mut().take() {
            task.abort();
        }
    }
}

/// Badge text for a match count; zero shows nothing.
pub fn badge_text(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
