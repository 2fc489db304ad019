//! Per-page runtime state and event handlers.
//!
//! One [`ContentContext`] is built when the content script is injected and
//! lives until the page goes away. The host feeds it DOM events; every
//! handler takes `&mut self`, so handlers never interleave. Handlers report
//! problems through the [`Notifier`] and never return errors to the page.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use vaultlink_config::{AutofillConfig, Config, SavePromptConfig};
use vaultlink_matching::{FillCycle, MatchOutcome, entries_of_type};
use vaultlink_protocols::{
    CredentialEntry, EntryType, KeyValueStore, MessageBus, PendingCredential, Request,
};

use crate::detector::{FieldKind, FieldRecord, detect};
use crate::dom::{Document, DomEvent, NodeId};
use crate::error::FillError;
use crate::fill::FillOrchestrator;
use crate::host::{Clipboard, Confirmer, Notice, Notifier};
use crate::menu::{Affordance, Menu, MenuAction, MenuGeometry, MenuItem, MenuKey, MenuKind};
use crate::save::{self, PromptResponse, SaveDecision};

/// Settings the content runtime reads from the configuration.
#[derive(Debug, Clone, Default)]
pub struct ContentSettings {
    pub autofill: AutofillConfig,
    pub save_prompt: SavePromptConfig,
    pub geometry: MenuGeometry,
}

impl From<&Config> for ContentSettings {
    fn from(config: &Config) -> Self {
        Self {
            autofill: config.autofill.clone(),
            save_prompt: config.save_prompt.clone(),
            geometry: MenuGeometry::from(&config.menu),
        }
    }
}

/// Host services a content context talks to.
#[derive(Clone)]
pub struct ContentServices {
    pub bus: Arc<dyn MessageBus>,
    /// Durable extension storage.
    pub store: Arc<dyn KeyValueStore>,
    pub confirmer: Arc<dyn Confirmer>,
    pub notifier: Arc<dyn Notifier>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// A save or update offer waiting for the user.
#[derive(Debug, Clone)]
pub struct SavePrompt {
    pub decision: SaveDecision,
    pub credential: PendingCredential,
    deadline: Instant,
}

impl SavePrompt {
    /// When the prompt dismisses itself.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_update(&self) -> bool {
        matches!(self.decision, SaveDecision::Update { .. })
    }
}

pub struct ContentContext {
    doc: Document,
    settings: ContentSettings,
    bus: Arc<dyn MessageBus>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    orchestrator: FillOrchestrator,
    records: Vec<FieldRecord>,
    affordances: BTreeMap<NodeId, Affordance>,
    menu: Option<Menu>,
    menu_entries: Vec<CredentialEntry>,
    focused: Option<NodeId>,
    cycle: FillCycle,
    same_page_check: Option<Instant>,
    save_prompt: Option<SavePrompt>,
}

impl ContentContext {
    pub fn new(doc: Document, settings: ContentSettings, services: ContentServices) -> Self {
        let orchestrator = FillOrchestrator::new(
            services.bus.clone(),
            services.confirmer,
            services.notifier.clone(),
            services.clipboard,
        )
        .with_totp_autofill(settings.autofill.totp_autofill);
        Self {
            doc,
            settings,
            bus: services.bus,
            store: services.store,
            notifier: services.notifier,
            orchestrator,
            records: Vec::new(),
            affordances: BTreeMap::new(),
            menu: None,
            menu_entries: Vec::new(),
            focused: None,
            cycle: FillCycle::new(),
            same_page_check: None,
            save_prompt: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Host access for mirroring page changes. Follow structural changes with
    /// [`ContentContext::on_mutation`].
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Events dispatched by fills since the last call, for the host to replay
    /// on the live page.
    pub fn take_dom_events(&mut self) -> Vec<DomEvent> {
        self.doc.take_events()
    }

    pub fn records(&self) -> &[FieldRecord] {
        &self.records
    }

    pub fn affordance(&self, field: NodeId) -> Option<&Affordance> {
        self.affordances.get(&field)
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.menu.as_ref()
    }

    pub fn save_prompt(&self) -> Option<&SavePrompt> {
        self.save_prompt.as_ref()
    }

    /// Page load: detect fields and pick up a credential submitted on the
    /// previous page.
    pub async fn initialize(&mut self) {
        let body = self.doc.body();
        self.scan(body);
        self.check_pending_after_navigation().await;
    }

    /// Subtree added or changed.
    pub async fn on_mutation(&mut self, root: NodeId) {
        self.prune_detached();
        self.scan(root);
    }

    /// Client-side route change.
    pub async fn on_navigation(&mut self, url: &str) {
        info!("Route changed");
        self.doc.set_url(url);
        self.close_menu();
        self.cycle.reset();
        self.prune_detached();
        let body = self.doc.body();
        self.scan(body);
        self.check_pending_after_navigation().await;
    }

    pub fn on_focus(&mut self, field: NodeId) {
        if let Some(previous) = self.focused.replace(field) {
            if previous != field {
                if let Some(icon) = self.affordances.get_mut(&previous) {
                    icon.hide();
                }
            }
        }
        if let Some(icon) = self.affordances.get_mut(&field) {
            icon.show();
        }
    }

    /// Pointer click at viewport coordinates.
    pub async fn on_pointer(&mut self, x: f64, y: f64) {
        if let Some(position) = self.menu.as_ref().and_then(|m| m.position()) {
            let inside = x >= position.x
                && x <= position.x + position.width
                && y >= position.y
                && y <= position.y + position.height;
            if inside {
                return;
            }
        }
        let hit = self.affordances.keys().copied().find(|field| {
            self.doc
                .get(*field)
                .is_some_and(|e| Affordance::icon_box(&e.bounding_box).contains(x, y))
        });
        match hit {
            Some(field) => self.on_icon_click(field).await,
            None => self.on_outside_click(),
        }
    }

    /// Open the menu for a field's icon, replacing any open menu.
    pub async fn on_icon_click(&mut self, field: NodeId) {
        let Some(kind) = self.affordances.get(&field).map(|a| a.kind()) else {
            return;
        };
        let Some((menu_kind, entries)) = self.load_menu_entries(MenuKind::for_field(kind)).await
        else {
            return;
        };
        self.open_menu(field, menu_kind, entries);
    }

    pub fn on_outside_click(&mut self) {
        if self.menu.as_ref().is_some_and(Menu::is_visible) {
            self.close_menu();
        }
    }

    pub async fn on_key(&mut self, key: MenuKey) {
        let action = self.menu.as_mut().and_then(|m| m.handle_key(key));
        if let Some(action) = action {
            self.dispatch(action).await;
        }
    }

    pub async fn on_menu_click(&mut self, index: usize) {
        let action = self.menu.as_mut().and_then(|m| m.click(index));
        if let Some(action) = action {
            self.dispatch(action).await;
        }
    }

    /// Background reported the vault locked.
    pub fn on_vault_locked(&mut self) {
        self.close_menu();
    }

    /// Keyboard-shortcut fill. One match fills directly, several are walked
    /// through on repeated invocations, none opens the create-new menu.
    pub async fn cycle_fill(&mut self, reverse: bool) {
        if !self.settings.autofill.cycle_enabled {
            return;
        }
        let url = self.doc.url().to_string();
        let matches = match self
            .bus
            .send(Request::GetMatches { url: url.clone() })
            .await
            .into_items()
        {
            Ok(matches) => matches,
            Err(e) => {
                self.report(FillError::from(e)).await;
                return;
            }
        };

        let (username, password) = self.login_pair(self.focused);
        let anchor = username.or(password);
        let entry = match MatchOutcome::from_matches(matches.iter().collect()) {
            MatchOutcome::None => {
                if let Some(anchor) = anchor {
                    self.open_menu(anchor, MenuKind::CreateNew, Vec::new());
                }
                return;
            }
            MatchOutcome::Single(entry) => entry.clone(),
            MatchOutcome::Multiple(candidates) => {
                let Some(index) = self.cycle.next(&url, candidates.len(), reverse) else {
                    return;
                };
                debug!(index, total = candidates.len(), "Cycling fill");
                candidates[index].clone()
            }
        };
        if let Err(e) = self
            .orchestrator
            .fill_login(&mut self.doc, username, password, &entry)
            .await
        {
            self.report(e).await;
        }
    }

    /// Click on any element; submit controls capture credentials.
    pub async fn on_click_element(&mut self, element: NodeId) {
        let is_submit = self.doc.get(element).is_some_and(|e| e.is_submit_control());
        if is_submit {
            let form = self.doc.enclosing_form(element);
            self.on_submit(form).await;
        }
    }

    /// Form submission: capture and persist at once, then look again shortly
    /// in case the page does not navigate.
    pub async fn on_submit(&mut self, form: Option<NodeId>) {
        if !self.settings.save_prompt.enabled {
            return;
        }
        let Some(pending) = save::capture(&self.doc, &self.records, form) else {
            return;
        };
        if let Err(e) = save::persist(self.store.as_ref(), &pending).await {
            warn!(error = %e, "Could not persist submitted credential");
            return;
        }
        debug!("Captured submitted credential");
        let delay = Duration::from_millis(self.settings.save_prompt.same_page_delay_ms);
        self.same_page_check = Some(Instant::now() + delay);
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        let prompt = self.save_prompt.as_ref().map(|p| p.deadline);
        match (self.same_page_check, prompt) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run every timer that is due.
    pub async fn on_timer(&mut self) {
        let now = Instant::now();
        if self.same_page_check.is_some_and(|at| at <= now) {
            self.same_page_check = None;
            match save::load(self.store.as_ref()).await {
                Ok(Some(pending)) if pending.url == self.doc.url() => {
                    self.evaluate_pending(pending).await;
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Could not read pending credential"),
            }
        }
        if self.save_prompt.as_ref().is_some_and(|p| p.deadline <= now) {
            debug!("Save prompt timed out");
            self.save_prompt = None;
            self.clear_pending().await;
        }
    }

    /// Sleep until the next timer and run it.
    pub async fn wait_for_timers(&mut self) {
        if let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.on_timer().await;
        }
    }

    /// Answer the open save/update prompt. The stored record is cleared
    /// whatever the answer.
    pub async fn resolve_save_prompt(&mut self, response: PromptResponse) {
        let Some(prompt) = self.save_prompt.take() else {
            return;
        };
        self.clear_pending().await;
        if response == PromptResponse::Dismiss {
            return;
        }

        let (request, notice) = match prompt.decision {
            SaveDecision::None => return,
            SaveDecision::Save => (
                Request::CreateItem {
                    item: save::new_login_entry(&prompt.credential),
                },
                Notice::Saved,
            ),
            SaveDecision::Update { entry } => {
                let mut item = *entry;
                if let Some(login) = item.login.as_mut() {
                    login.password = Some(prompt.credential.password.clone());
                }
                (
                    Request::UpdateItem {
                        id: item.id.clone(),
                        item,
                    },
                    Notice::Updated,
                )
            }
        };
        match self.bus.send(request).await.into_result() {
            Ok(_) => self.notifier.notify(notice).await,
            Err(e) => self.report(FillError::from(e)).await,
        }
    }

    fn scan(&mut self, root: NodeId) {
        let found = detect(&mut self.doc, root);
        for record in &found {
            if self.settings.autofill.show_icons && record.kind.has_affordance() {
                self.affordances
                    .insert(record.element, Affordance::new(record.element, record.kind));
            }
        }
        self.records.extend(found);
    }

    /// Drop state for fields that left the page.
    fn prune_detached(&mut self) {
        let gone: Vec<NodeId> = self
            .affordances
            .keys()
            .copied()
            .filter(|id| !self.doc.is_connected(*id))
            .collect();
        for id in gone {
            if self.menu.as_ref().is_some_and(|m| m.anchor() == id) {
                self.close_menu();
            }
            if let Some(mut icon) = self.affordances.remove(&id) {
                icon.destroy();
                debug!(field = id.index(), "Field removed, icon destroyed");
            }
        }
        let doc = &self.doc;
        self.records.retain(|r| doc.is_connected(r.element));
        if self.focused.is_some_and(|f| !doc.is_connected(f)) {
            self.focused = None;
        }
    }

    async fn load_menu_entries(&self, kind: MenuKind) -> Option<(MenuKind, Vec<CredentialEntry>)> {
        let request = match kind {
            MenuKind::Credentials => Request::GetMatches {
                url: self.doc.url().to_string(),
            },
            _ => Request::GetItems,
        };
        match self.bus.send(request).await.into_items() {
            Ok(items) => {
                let entries: Vec<CredentialEntry> = match kind {
                    MenuKind::Cards => entries_of_type(&items, EntryType::Card)
                        .into_iter()
                        .cloned()
                        .collect(),
                    MenuKind::Identities => entries_of_type(&items, EntryType::Identity)
                        .into_iter()
                        .cloned()
                        .collect(),
                    _ => items,
                };
                if entries.is_empty() {
                    Some((MenuKind::CreateNew, Vec::new()))
                } else {
                    Some((kind, entries))
                }
            }
            Err(e) if e.is_locked() => Some((MenuKind::Locked, Vec::new())),
            Err(e) => {
                warn!(error = %e, "Could not load menu entries");
                self.notifier
                    .notify(Notice::RequestFailed {
                        message: e.to_string(),
                    })
                    .await;
                None
            }
        }
    }

    fn open_menu(&mut self, anchor: NodeId, kind: MenuKind, entries: Vec<CredentialEntry>) {
        self.close_menu();
        let Some(anchor_box) = self.doc.get(anchor).map(|e| e.bounding_box) else {
            return;
        };
        let items = entries.iter().map(MenuItem::from).collect();
        let mut menu = Menu::new(kind, anchor, items);
        menu.show(&anchor_box, self.doc.viewport(), &self.settings.geometry);
        if let Some(icon) = self.affordances.get_mut(&anchor) {
            if icon.needs_replacement(kind) {
                let successor = icon.replace();
                debug!(field = anchor.index(), ?kind, "Menu kind changed, icon replaced");
                *icon = successor;
            }
            icon.open_menu(kind);
        }
        debug!(?kind, rows = menu.row_count(), "Menu opened");
        self.menu = Some(menu);
        self.menu_entries = entries;
    }

    fn close_menu(&mut self) {
        if let Some(mut menu) = self.menu.take() {
            menu.destroy();
            if let Some(icon) = self.affordances.get_mut(&menu.anchor()) {
                icon.close_menu();
            }
        }
        self.menu_entries.clear();
    }

    async fn dispatch(&mut self, action: MenuAction) {
        let Some(anchor) = self.menu.as_ref().map(Menu::anchor) else {
            return;
        };
        match action {
            MenuAction::Close => self.close_menu(),
            MenuAction::OpenPopup => {
                self.close_menu();
                let response = self.bus.send(Request::OpenPopup).await;
                if let Err(e) = response.into_result() {
                    warn!(error = %e, "Popup could not be opened");
                    self.notifier.notify(Notice::PopupUnavailable).await;
                }
            }
            MenuAction::Select { entry_id } => {
                let entry = self.menu_entries.iter().find(|e| e.id == entry_id).cloned();
                self.close_menu();
                match entry {
                    Some(entry) => self.fill_entry(anchor, &entry).await,
                    None => self.report(FillError::EntryNotFound(entry_id)).await,
                }
            }
        }
    }

    async fn fill_entry(&mut self, anchor: NodeId, entry: &CredentialEntry) {
        let result = match entry.entry_type {
            EntryType::Login => {
                let (username, password) = self.login_pair(Some(anchor));
                self.orchestrator
                    .fill_login(&mut self.doc, username, password, entry)
                    .await
            }
            EntryType::Card => {
                self.orchestrator
                    .fill_card(&mut self.doc, anchor, &self.records, entry)
                    .await
            }
            EntryType::Identity => {
                self.orchestrator
                    .fill_identity(&mut self.doc, anchor, &self.records, entry)
                    .await
            }
            EntryType::SecureNote => Err(FillError::NothingToFill),
        };
        if let Err(e) = result {
            self.report(e).await;
        }
    }

    /// Username and password fields to fill, starting from `anchor` and
    /// falling back to the first login pair on the page.
    fn login_pair(&self, anchor: Option<NodeId>) -> (Option<NodeId>, Option<NodeId>) {
        let from_record = |record: &FieldRecord| match record.kind {
            FieldKind::LoginUsername => Some((Some(record.element), record.partner)),
            FieldKind::LoginPassword => Some((record.partner, Some(record.element))),
            _ => None,
        };
        anchor
            .and_then(|a| self.records.iter().find(|r| r.element == a))
            .and_then(from_record)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|r| r.kind == FieldKind::LoginUsername)
                    .and_then(from_record)
            })
            .or_else(|| {
                self.records
                    .iter()
                    .find(|r| r.kind == FieldKind::LoginPassword)
                    .and_then(from_record)
            })
            .unwrap_or((None, None))
    }

    async fn check_pending_after_navigation(&mut self) {
        if !self.settings.save_prompt.enabled {
            return;
        }
        let max_age =
            chrono::Duration::seconds(self.settings.save_prompt.max_pending_age_seconds as i64);
        match save::take_for_navigation(self.store.as_ref(), self.doc.url(), Utc::now(), max_age)
            .await
        {
            Ok(Some(pending)) => self.evaluate_pending(pending).await,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not read pending credential"),
        }
    }

    /// Decide what to offer for a captured credential. Nothing to offer
    /// clears the record; a failed lookup leaves it for a later page.
    async fn evaluate_pending(&mut self, pending: PendingCredential) {
        let existing = match self
            .bus
            .send(Request::GetMatches {
                url: pending.url.clone(),
            })
            .await
            .into_items()
        {
            Ok(existing) => existing,
            Err(e) => {
                debug!(error = %e, "Cannot compare submitted credential");
                return;
            }
        };
        match save::decide(&pending, &existing) {
            SaveDecision::None => {
                debug!("Submitted credential already stored");
                self.clear_pending().await;
            }
            decision => {
                let dismiss = Duration::from_secs(self.settings.save_prompt.dismiss_after_seconds);
                self.save_prompt = Some(SavePrompt {
                    decision,
                    credential: pending,
                    deadline: Instant::now() + dismiss,
                });
            }
        }
    }

    async fn clear_pending(&self) {
        if let Err(e) = save::clear(self.store.as_ref()).await {
            warn!(error = %e, "Could not clear pending credential");
        }
    }

    async fn report(&self, error: FillError) {
        match error {
            FillError::Cancelled => {}
            FillError::NothingToFill => debug!("Nothing to fill"),
            FillError::Locked => self.notifier.notify(Notice::VaultLocked).await,
            other => {
                warn!(error = %other, "Fill failed");
                self.notifier
                    .notify(Notice::RequestFailed {
                        message: other.to_string(),
                    })
                    .await;
            }
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
