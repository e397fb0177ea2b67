//! Two-tier preference storage.
//!
//! The widget persists the choice twice: a primary, expiring tier (the
//! cookie in the browser original) and a best-effort, non-expiring fallback
//! (local storage). The primary tier is authoritative; the fallback exists
//! so the choice survives cookie clearing and vice versa. Tier failures are
//! swallowed, but each tier's outcome is reported separately so tests can
//! observe them.

use crate::{ConsentChoice, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Cookie-style attributes applied on write. The fallback tier ignores the
/// expiration; the rest describe how the primary tier scopes the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAttributes {
    /// When the value stops being readable. `None` means no expiration.
    pub expires_at: Option<DateTime<Utc>>,
    /// Path scope; always the site root for consent.
    pub path: String,
    pub same_site: SameSite,
    /// Set when the page was loaded over a secure transport.
    pub secure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl WriteAttributes {
    /// Site-wide, SameSite=Lax attributes, as the banner always writes them.
    pub fn site_wide(expires_at: Option<DateTime<Utc>>, secure: bool) -> Self {
        Self {
            expires_at,
            path: "/".to_string(),
            same_site: SameSite::Lax,
            secure,
        }
    }
}

/// A value at rest in a tier, with its expiration if the tier recorded one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredValue {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// A single persistence tier.
pub trait ConsentStore: Send + Sync {
    /// Read the value under `key`, or `None` if absent or expired.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replace the value under `key`.
    fn save(&self, key: &str, value: &str, attrs: &WriteAttributes) -> StoreResult<()>;
}

/// In-process tier backed by a map. Honors per-entry expiration on read, so
/// it serves as either tier and as the test double for both.
#[derive(Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, StoredValue>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the raw entry, expired or not.
    pub fn raw_get(&self, key: &str) -> Option<StoredValue> {
        self.entries.read().get(key).cloned()
    }
}

impl ConsentStore for MemoryTier {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read();
        Ok(entries
            .get(key)
            .filter(|stored| !stored.is_expired(Utc::now()))
            .map(|stored| stored.value.clone()))
    }

    fn save(&self, key: &str, value: &str, attrs: &WriteAttributes) -> StoreResult<()> {
        self.entries.write().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: attrs.expires_at,
            },
        );
        Ok(())
    }
}

/// Outcome of one tier's write during a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierOutcome {
    Saved,
    Failed,
}

/// Per-tier write outcomes for one commit. The primary tier is what keeps
/// the choice across sessions; a failed fallback is cosmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistReceipt {
    pub primary: TierOutcome,
    pub fallback: TierOutcome,
}

impl PersistReceipt {
    pub fn fully_persisted(&self) -> bool {
        self.primary == TierOutcome::Saved && self.fallback == TierOutcome::Saved
    }
}

/// The primary-plus-fallback tier stack.
pub struct PreferenceStore {
    primary: Arc<dyn ConsentStore>,
    fallback: Arc<dyn ConsentStore>,
}

impl PreferenceStore {
    pub fn new(primary: Arc<dyn ConsentStore>, fallback: Arc<dyn ConsentStore>) -> Self {
        Self { primary, fallback }
    }

    /// Both tiers in memory; the default for hosts that bring their own
    /// durability and for tests.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTier::new()), Arc::new(MemoryTier::new()))
    }

    /// Both tiers on disk under the crate state directory. The fallback
    /// lands in its own subdirectory and never records an expiration.
    pub fn durable() -> Self {
        let root = crate::persistence::state_dir();
        Self::new(
            Arc::new(crate::persistence::FileTier::new(root.join("primary"))),
            Arc::new(crate::persistence::FileTier::new(root.join("fallback"))),
        )
    }

    /// First readable, parseable value wins, primary tier preferred. Never
    /// propagates a tier failure: an unavailable tier reads as absent.
    pub fn read(&self, key: &str) -> Option<ConsentChoice> {
        for (label, tier) in [
            ("primary", self.primary.as_ref()),
            ("fallback", self.fallback.as_ref()),
        ] {
            match tier.load(key) {
                Ok(Some(raw)) => match ConsentChoice::parse_tag(&raw) {
                    Some(choice) => return Some(choice),
                    None => tracing::debug!(
                        tier = label,
                        value = %raw,
                        "ignoring unrecognized stored consent value"
                    ),
                },
                Ok(None) => {}
                Err(err) => tracing::debug!(
                    tier = label,
                    error = %err,
                    "consent tier read failed; treating as absent"
                ),
            }
        }
        None
    }

    /// Write the choice to both tiers. The fallback write drops the
    /// expiration (it is the non-expiring tier) and its failure is swallowed
    /// like the primary's; the receipt records what happened to each.
    pub fn write(
        &self,
        key: &str,
        choice: ConsentChoice,
        attrs: &WriteAttributes,
    ) -> PersistReceipt {
        let value = choice.as_str();
        let primary = Self::persist("primary", self.primary.as_ref(), key, value, attrs);
        let fallback_attrs = WriteAttributes {
            expires_at: None,
            ..attrs.clone()
        };
        let fallback = Self::persist(
            "fallback",
            self.fallback.as_ref(),
            key,
            value,
            &fallback_attrs,
        );
        PersistReceipt { primary, fallback }
    }

    fn persist(
        label: &str,
        tier: &dyn ConsentStore,
        key: &str,
        value: &str,
        attrs: &WriteAttributes,
    ) -> TierOutcome {
        match tier.save(key, value, attrs) {
            Ok(()) => TierOutcome::Saved,
            Err(err) => {
                tracing::debug!(
                    tier = label,
                    error = %err,
                    "consent tier write failed; continuing"
                );
                TierOutcome::Failed
            }
        }
    }
}

/// Tier that refuses every operation, like storage disabled by the browser.
pub struct UnavailableTier;

impl ConsentStore for UnavailableTier {
    fn load(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn save(&self, _key: &str, _value: &str, _attrs: &WriteAttributes) -> StoreResult<()> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }
}
