//! Published consent state and the saved notification.
//!
//! Unrelated code in the process must be able to read the current consent
//! status synchronously without a handle to the manager, so the latest state
//! lives in a single well-known slot that is overwritten whole on every
//! update. Reactive consumers subscribe to the saved notification instead of
//! polling.

use crate::ConsentChoice;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Stable name of the saved notification, for hosts bridging it onto a
/// DOM-style event bus.
pub const SAVED_EVENT_NAME: &str = "clinicalCookieConsentSaved";

/// The process-wide consent state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentState {
    /// The active choice.
    pub status: ConsentChoice,
    /// Policy link copied from the config, so consumers need not re-read it.
    pub policy_url: String,
}

/// Payload of the saved notification. Emitted once per commit, never on a
/// silent restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentSaved {
    pub status: ConsentChoice,
}

static CURRENT: RwLock<Option<ConsentState>> = RwLock::new(None);

/// The most recently published state, if any decision exists yet.
///
/// This is the sole public read surface for code without a manager handle.
pub fn current() -> Option<ConsentState> {
    CURRENT.read().clone()
}

/// Overwrite the published state. Called from the manager only, inside the
/// same synchronous operation that updates the page, so observers never see
/// one without the other.
pub(crate) fn publish(state: ConsentState) {
    *CURRENT.write() = Some(state);
}
