//! Browser host held in memory.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use vaultlink_protocols::{BrowserHost, HostError, TabInfo};

#[derive(Default)]
struct BrowserState {
    windows: BTreeSet<u32>,
    tabs: BTreeMap<u32, TabInfo>,
    active_tab: Option<u32>,
    badges: BTreeMap<u32, String>,
    locked_icon: bool,
    popup_available: bool,
    popups_opened: usize,
}

/// Windows, tabs, badges and the toolbar icon, kept in memory.
pub struct MemoryBrowser {
    state: RwLock<BrowserState>,
    keep_alive_pings: AtomicUsize,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(BrowserState {
                locked_icon: true,
                popup_available: true,
                ..Default::default()
            }),
            keep_alive_pings: AtomicUsize::new(0),
        }
    }

    pub fn open_window(&self, window_id: u32) {
        self.state.write().windows.insert(window_id);
    }

    /// Close a window and every tab in it.
    pub fn close_window(&self, window_id: u32) {
        let mut state = self.state.write();
        state.windows.remove(&window_id);
        state.tabs.retain(|_, tab| tab.window_id != window_id);
        if let Some(active) = state.active_tab {
            if !state.tabs.contains_key(&active) {
                state.active_tab = None;
            }
        }
    }

    /// Add or replace a tab and make it active.
    pub fn open_tab(&self, tab: TabInfo) {
        let mut state = self.state.write();
        state.active_tab = Some(tab.id);
        state.tabs.insert(tab.id, tab);
    }

    /// Add or replace a tab without changing which tab is active.
    pub fn update_tab(&self, tab: TabInfo) {
        self.state.write().tabs.insert(tab.id, tab);
    }

    pub fn close_tab(&self, tab_id: u32) {
        let mut state = self.state.write();
        state.tabs.remove(&tab_id);
        state.badges.remove(&tab_id);
        if state.active_tab == Some(tab_id) {
            state.active_tab = None;
        }
    }

    pub fn activate_tab(&self, tab_id: u32) -> Result<(), HostError> {
        let mut state = self.state.write();
        if !state.tabs.contains_key(&tab_id) {
            return Err(HostError::TabNotFound(tab_id));
        }
        state.active_tab = Some(tab_id);
        Ok(())
    }

    pub fn set_popup_available(&self, available: bool) {
        self.state.write().popup_available = available;
    }

    pub fn badge(&self, tab_id: u32) -> Option<String> {
        self.state.read().badges.get(&tab_id).cloned()
    }

    pub fn is_locked_icon(&self) -> bool {
        self.state.read().locked_icon
    }

    pub fn popups_opened(&self) -> usize {
        self.state.read().popups_opened
    }

    pub fn keep_alive_pings(&self) -> usize {
        self.keep_alive_pings.load(Ordering::Relaxed)
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserHost for MemoryBrowser {
    async fn normal_window_count(&self) -> Result<usize, HostError> {
        Ok(self.state.read().windows.len())
    }

    async fn tab_count(&self) -> Result<usize, HostError> {
        Ok(self.state.read().tabs.len())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, HostError> {
        let state = self.state.read();
        Ok(state.active_tab.and_then(|id| state.tabs.get(&id).cloned()))
    }

    async fn set_badge(&self, tab_id: u32, text: &str, _color: &str) -> Result<(), HostError> {
        let mut state = self.state.write();
        if !state.tabs.contains_key(&tab_id) {
            return Err(HostError::TabNotFound(tab_id));
        }
        if text.is_empty() {
            state.badges.remove(&tab_id);
        } else {
            state.badges.insert(tab_id, text.to_string());
        }
        Ok(())
    }

    async fn clear_badges(&self) -> Result<(), HostError> {
        self.state.write().badges.clear();
        Ok(())
    }

    async fn set_locked_icon(&self, locked: bool) -> Result<(), HostError> {
        self.state.write().locked_icon = locked;
        Ok(())
    }

    async fn open_popup(&self) -> Result<(), HostError> {
        let mut state = self.state.write();
        if !state.popup_available {
            return Err(HostError::PopupUnavailable(
                "no focused browser window".to_string(),
            ));
        }
        state.popups_opened += 1;
        Ok(())
    }

    async fn keep_alive(&self) -> Result<(), HostError> {
        self.keep_alive_pings.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
