//! End-to-end banner flows against the public API, including the
//! process-wide published state.

use ccc_consent::{
    current, ConsentChoice, ConsentConfig, ConsentManager, ConsentState, MemoryPage, MemoryTier,
    PreferenceStore, BANNER_ELEMENT_ID, SAVED_EVENT_NAME,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// Every test here reads or writes the process-wide state slot, so they run
// one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn scenario_config() -> ConsentConfig {
    ConsentConfig::new("ccc_choice")
        .with_expiration_days(30)
        .with_policy_url("https://x.test/p")
}

#[test]
fn reject_click_end_to_end() {
    let _guard = serial();

    let page = Arc::new(MemoryPage::new());
    let manager = Arc::new(ConsentManager::new(scenario_config(), page.clone()));

    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    manager.on_saved(move |saved| {
        assert_eq!(saved.status, ConsentChoice::Reject);
        f.fetch_add(1, Ordering::SeqCst);
    });

    Arc::clone(&manager).install();
    assert!(page.banner_visible());

    // Visitor clicks the reject control.
    manager.handle_action("reject").unwrap();

    assert_eq!(page.root_classes(), vec!["ccc-status-reject".to_string()]);
    assert!(!page.banner_visible());
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    // Any script in the process can read the published state.
    assert_eq!(
        current(),
        Some(ConsentState {
            status: ConsentChoice::Reject,
            policy_url: "https://x.test/p".to_string(),
        })
    );
}

#[test]
fn reload_restores_published_state_without_notifying() {
    let _guard = serial();

    let primary = Arc::new(MemoryTier::new());
    let fallback = Arc::new(MemoryTier::new());

    let first = Arc::new(
        ConsentManager::builder(scenario_config())
            .store(PreferenceStore::new(primary.clone(), fallback.clone()))
            .page(Arc::new(MemoryPage::new()))
            .build(),
    );
    Arc::clone(&first).install();
    first.handle_action("accept").unwrap();

    // Reload: fresh manager and page over the same tiers.
    let page = Arc::new(MemoryPage::new());
    let second = Arc::new(
        ConsentManager::builder(scenario_config())
            .store(PreferenceStore::new(primary, fallback))
            .page(page.clone())
            .build(),
    );
    let fired = Arc::new(AtomicUsize::new(0));
    let f = fired.clone();
    second.on_saved(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    Arc::clone(&second).install();

    assert!(!page.banner_visible());
    assert_eq!(page.root_classes(), vec!["ccc-status-accept".to_string()]);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(current().map(|s| s.status), Some(ConsentChoice::Accept));
}

#[test]
fn published_state_is_overwritten_not_merged() {
    let _guard = serial();

    let page = Arc::new(MemoryPage::new());
    let manager = Arc::new(ConsentManager::new(scenario_config(), page));
    Arc::clone(&manager).install();

    manager.handle_action("accept").unwrap();
    manager.handle_action("required").unwrap();

    let state = current().unwrap();
    assert_eq!(state.status, ConsentChoice::Required);
    assert_eq!(state.policy_url, "https://x.test/p");
}

#[test]
fn wire_names_are_stable() {
    // Hosts key their markup and event bridges off these; they are part of
    // the wire contract.
    assert_eq!(SAVED_EVENT_NAME, "clinicalCookieConsentSaved");
    assert_eq!(BANNER_ELEMENT_ID, "ccc-banner");
}
