//! ccc-consent
//!
//! Consent-state persistence and propagation for a cookie banner. The crate
//! owns the one part of a consent widget with a real contract: read the
//! persisted preference, decide whether the banner must be shown, record the
//! visitor's choice, and tell the rest of the process about it.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ ConsentConfig│ →  │  ConsentManager   │ →  │ Page (root     │
//! │ (host input) │    │ restore / reveal  │    │ classes, banner│
//! └─────────────┘     │ commit / notify   │    │ visibility)    │
//!                     └──────────────────┘     └────────────────┘
//!                        │            │
//!                        ▼            ▼
//!               ┌───────────────┐  ┌──────────────────────┐
//!               │ PreferenceStore│  │ published ConsentState│
//!               │ primary+fallback│ │ + saved notification  │
//!               └───────────────┘  └──────────────────────┘
//! ```
//!
//! Banner rendering, admin settings, CSS, and templating are a host concern.
//! The host supplies a [`ConsentConfig`] and a [`Page`] implementation; the
//! crate supplies in-process tiers ([`MemoryTier`], [`FileTier`]) and an
//! in-process page ([`MemoryPage`]) so everything runs without a browser.

pub mod choice;
pub mod config;
pub mod manager;
pub mod page;
pub mod persistence;
pub mod state;
pub mod storage;

pub use choice::*;
pub use config::*;
pub use manager::*;
pub use page::*;
pub use persistence::*;
pub use state::*;
pub use storage::*;

use thiserror::Error;

/// Errors surfaced by a persistence tier.
///
/// These never escape the manager: an erroring tier reads as absent and a
/// failing write is skipped, exactly like a blocked browser storage area.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage tier unavailable: {0}")]
    Unavailable(String),
    #[error("stored value is corrupt: {0}")]
    Corrupt(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for tier operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
