//! Host page surface.
//!
//! Everything the manager touches on the hosting page goes through this
//! trait: the banner mount point, the document root's class list, the
//! secure-transport flag, and the readiness signal. A browser host bridges
//! these to the DOM; [`MemoryPage`] is the in-process implementation used in
//! tests and headless hosts.

use parking_lot::Mutex;
use std::collections::BTreeSet;

/// Well-known id of the banner mount point in the original markup.
pub const BANNER_ELEMENT_ID: &str = "ccc-banner";

/// Marker class on a revealed banner.
pub const VISIBLE_CLASS: &str = "ccc-visible";

/// Marker class on a hidden banner. The markup ships hidden.
pub const HIDDEN_CLASS: &str = "ccc-hidden";

/// What the consent manager needs from the hosting page.
pub trait Page: Send + Sync {
    /// Whether the banner mount point exists in the document.
    fn banner_present(&self) -> bool;

    fn add_banner_class(&self, class: &str);
    fn remove_banner_class(&self, class: &str);

    fn add_root_class(&self, class: &str);
    fn remove_root_class(&self, class: &str);

    /// Whether the page was loaded over a secure transport.
    fn is_secure(&self) -> bool;

    /// Whether the document is already interactive.
    fn is_ready(&self) -> bool;

    /// Run `f` once the document becomes interactive. Implementations must
    /// run it immediately if the document already is.
    fn defer_until_ready(&self, f: Box<dyn FnOnce() + Send>);
}

struct PageInner {
    banner_present: bool,
    secure: bool,
    ready: bool,
    root_classes: BTreeSet<String>,
    banner_classes: BTreeSet<String>,
    deferred: Vec<Box<dyn FnOnce() + Send>>,
}

/// In-process [`Page`]: class lists are plain sets, readiness is a flag, and
/// deferred callbacks fire on [`MemoryPage::become_ready`].
pub struct MemoryPage {
    inner: Mutex<PageInner>,
}

impl MemoryPage {
    /// An interactive, insecure page with a hidden banner present.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PageInner {
                banner_present: true,
                secure: false,
                ready: true,
                root_classes: BTreeSet::new(),
                banner_classes: [HIDDEN_CLASS.to_string()].into_iter().collect(),
                deferred: Vec::new(),
            }),
        }
    }

    /// A page whose document contains no banner mount point.
    pub fn without_banner() -> Self {
        let page = Self::new();
        page.inner.lock().banner_present = false;
        page
    }

    /// Mark the page as served over a secure transport.
    pub fn with_secure(self) -> Self {
        self.inner.lock().secure = true;
        self
    }

    /// Start in the loading phase; callbacks queue until `become_ready`.
    pub fn still_loading(self) -> Self {
        self.inner.lock().ready = false;
        self
    }

    /// Flip to interactive and run every deferred callback, in order.
    pub fn become_ready(&self) {
        let callbacks = {
            let mut inner = self.inner.lock();
            inner.ready = true;
            std::mem::take(&mut inner.deferred)
        };
        // Callbacks touch the page, so the lock must be released first.
        for f in callbacks {
            f();
        }
    }

    pub fn root_classes(&self) -> Vec<String> {
        self.inner.lock().root_classes.iter().cloned().collect()
    }

    pub fn banner_classes(&self) -> Vec<String> {
        self.inner.lock().banner_classes.iter().cloned().collect()
    }

    /// Visible marker set and hidden marker cleared.
    pub fn banner_visible(&self) -> bool {
        let inner = self.inner.lock();
        inner.banner_classes.contains(VISIBLE_CLASS)
            && !inner.banner_classes.contains(HIDDEN_CLASS)
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for MemoryPage {
    fn banner_present(&self) -> bool {
        self.inner.lock().banner_present
    }

    fn add_banner_class(&self, class: &str) {
        self.inner.lock().banner_classes.insert(class.to_string());
    }

    fn remove_banner_class(&self, class: &str) {
        self.inner.lock().banner_classes.remove(class);
    }

    fn add_root_class(&self, class: &str) {
        self.inner.lock().root_classes.insert(class.to_string());
    }

    fn remove_root_class(&self, class: &str) {
        self.inner.lock().root_classes.remove(class);
    }

    fn is_secure(&self) -> bool {
        self.inner.lock().secure
    }

    fn is_ready(&self) -> bool {
        self.inner.lock().ready
    }

    fn defer_until_ready(&self, f: Box<dyn FnOnce() + Send>) {
        {
            let mut inner = self.inner.lock();
            if !inner.ready {
                inner.deferred.push(f);
                return;
            }
        }
        f();
    }
}
