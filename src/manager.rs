//! Consent manager: restore, reveal, commit, broadcast.
//!
//! One manager per page load. On initialization it either silently restores
//! a persisted choice or reveals the banner and arms the action bindings;
//! every committed choice updates both storage tiers, the document root's
//! status class, and the published state within the same synchronous call,
//! then fires the saved notification exactly once.

use crate::choice::ConsentChoice;
use crate::config::ConsentConfig;
use crate::page::{MemoryPage, Page, HIDDEN_CLASS, VISIBLE_CLASS};
use crate::state::{self, ConsentSaved, ConsentState};
use crate::storage::{PersistReceipt, PreferenceStore, WriteAttributes};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

type SavedListener = Box<dyn Fn(&ConsentSaved) + Send + Sync>;

/// The consent-state manager.
pub struct ConsentManager {
    config: ConsentConfig,
    store: PreferenceStore,
    page: Arc<dyn Page>,
    listeners: RwLock<Vec<SavedListener>>,
    published: RwLock<Option<ConsentState>>,
    init: Once,
    armed: AtomicBool,
}

impl ConsentManager {
    /// Manager with in-memory tiers; hosts wanting durability or custom
    /// tiers go through the builder.
    pub fn new(config: ConsentConfig, page: Arc<dyn Page>) -> Self {
        ConsentManagerBuilder::new(config).page(page).build()
    }

    pub fn builder(config: ConsentConfig) -> ConsentManagerBuilder {
        ConsentManagerBuilder::new(config)
    }

    /// Schedule initialization: immediately when the document is already
    /// interactive, otherwise on the ready signal. The once-guard inside
    /// [`initialize`] keeps the two paths from both running the branch
    /// logic.
    pub fn install(self: Arc<Self>) {
        if !self.config.enabled {
            tracing::trace!("consent banner disabled; not installing");
            return;
        }
        if self.page.is_ready() {
            self.initialize();
        } else {
            let page = Arc::clone(&self.page);
            page.defer_until_ready(Box::new(move || self.initialize()));
        }
    }

    /// Run the initialization branch logic exactly once per manager.
    pub fn initialize(&self) {
        self.init.call_once(|| self.run_initialize());
    }

    fn run_initialize(&self) {
        if !self.page.banner_present() {
            tracing::trace!("banner mount point absent; consent manager idle");
            return;
        }
        match self.read_persisted_choice() {
            Some(choice) => {
                // Silent restore: status class and published state, but no
                // saved notification and no banner.
                self.apply_status_class(choice);
                self.publish(choice);
                tracing::trace!(status = %choice, "restored persisted consent");
            }
            None => {
                self.page.remove_banner_class(HIDDEN_CLASS);
                self.page.add_banner_class(VISIBLE_CLASS);
                self.armed.store(true, Ordering::SeqCst);
            }
        }
    }

    /// The persisted choice, primary tier preferred, or `None`.
    pub fn read_persisted_choice(&self) -> Option<ConsentChoice> {
        self.store.read(&self.config.storage_key)
    }

    /// Persist `choice` to both tiers, apply its status class, publish the
    /// new state, and fire the saved notification once.
    pub fn commit_choice(&self, choice: ConsentChoice) -> PersistReceipt {
        let expires_at =
            Utc::now() + Duration::days(i64::from(self.config.effective_expiration_days()));
        let attrs = WriteAttributes::site_wide(Some(expires_at), self.page.is_secure());
        let receipt = self.store.write(&self.config.storage_key, choice, &attrs);

        self.apply_status_class(choice);
        self.publish(choice);

        let event = ConsentSaved { status: choice };
        for listener in self.listeners.read().iter() {
            listener(&event);
        }
        receipt
    }

    /// A control click carrying a choice tag: commit, then hide the banner.
    /// Unknown tags and clicks before the banner was armed do nothing.
    pub fn handle_action(&self, tag: &str) -> Option<PersistReceipt> {
        if !self.armed() {
            return None;
        }
        let Some(choice) = ConsentChoice::parse_tag(tag) else {
            tracing::debug!(tag, "ignoring unknown consent action tag");
            return None;
        };
        let receipt = self.commit_choice(choice);
        self.hide_banner();
        Some(receipt)
    }

    /// The dismiss control: hide the banner, commit nothing.
    pub fn dismiss(&self) {
        if self.armed() {
            self.hide_banner();
        }
    }

    /// Latest state this manager published, if any.
    pub fn state(&self) -> Option<ConsentState> {
        self.published.read().clone()
    }

    /// Register a saved-notification listener.
    pub fn on_saved(&self, listener: impl Fn(&ConsentSaved) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    fn armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    fn hide_banner(&self) {
        self.page.remove_banner_class(VISIBLE_CLASS);
        self.page.add_banner_class(HIDDEN_CLASS);
    }

    // Exactly one status class remains on the root after this returns.
    fn apply_status_class(&self, choice: ConsentChoice) {
        for other in ConsentChoice::ALL {
            self.page.remove_root_class(other.status_class());
        }
        self.page.add_root_class(choice.status_class());
    }

    fn publish(&self, choice: ConsentChoice) {
        let new = ConsentState {
            status: choice,
            policy_url: self.config.policy_url.clone(),
        };
        *self.published.write() = Some(new.clone());
        state::publish(new);
    }
}

/// Builder for [`ConsentManager`].
pub struct ConsentManagerBuilder {
    config: ConsentConfig,
    store: Option<PreferenceStore>,
    page: Option<Arc<dyn Page>>,
}

impl ConsentManagerBuilder {
    pub fn new(config: ConsentConfig) -> Self {
        Self {
            config,
            store: None,
            page: None,
        }
    }

    /// Use a custom tier stack instead of the in-memory default.
    pub fn store(mut self, store: PreferenceStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn page(mut self, page: Arc<dyn Page>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn build(self) -> ConsentManager {
        ConsentManager {
            config: self.config,
            store: self.store.unwrap_or_else(PreferenceStore::in_memory),
            page: self.page.unwrap_or_else(|| Arc::new(MemoryPage::new())),
            listeners: RwLock::new(Vec::new()),
            published: RwLock::new(None),
            init: Once::new(),
            armed: AtomicBool::new(false),
        }
    }
}
