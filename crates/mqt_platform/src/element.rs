//! Media elements and the in-process page that hosts them

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::traits::{ElementCallback, MediaElementSource};

/// Handle to an audio-producing element on the page
///
/// Clones refer to the same element. Equality is identity, not content.
#[derive(Clone)]
pub struct MediaElement {
    id: u64,
    source_attached: Arc<AtomicBool>,
}

impl MediaElement {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            source_attached: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether some context already consumed this element's output
    pub fn has_source(&self) -> bool {
        self.source_attached.load(Ordering::SeqCst)
    }

    /// Claim the element's output for a processing source.
    ///
    /// Returns `false` if it was already claimed; the claim is never released.
    pub fn claim_source(&self) -> bool {
        self.source_attached
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

impl PartialEq for MediaElement {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.source_attached, &other.source_attached)
    }
}

impl Eq for MediaElement {}

impl fmt::Debug for MediaElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaElement")
            .field("id", &self.id)
            .field("has_source", &self.has_source())
            .finish()
    }
}

#[derive(Default)]
struct PageState {
    current: Option<MediaElement>,
    next_id: u64,
    callbacks: Vec<ElementCallback>,
}

/// A page whose media element can be swapped out, e.g. by in-page navigation
///
/// Cheap to clone; clones share the page.
#[derive(Clone, Default)]
pub struct PageElements {
    state: Arc<Mutex<PageState>>,
}

impl PageElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a brand-new element on the page and notify watchers
    pub fn mount_new(&self) -> MediaElement {
        let (element, mut callbacks) = {
            let mut state = self.state.lock();
            state.next_id += 1;
            let element = MediaElement::new(state.next_id);
            state.current = Some(element.clone());
            (element, std::mem::take(&mut state.callbacks))
        };

        debug!("Media element {} mounted, notifying {} watcher(s)", element.id(), callbacks.len());
        callbacks.retain_mut(|callback| callback(element.clone()));

        // Callbacks registered while we were notifying stay after the old ones
        let mut state = self.state.lock();
        callbacks.append(&mut state.callbacks);
        state.callbacks = callbacks;

        element
    }

    /// Number of registered watchers
    pub fn watcher_count(&self) -> usize {
        self.state.lock().callbacks.len()
    }

    /// Take the element off the page; watchers are not notified
    pub fn remove(&self) -> Option<MediaElement> {
        self.state.lock().current.take()
    }
}

impl MediaElementSource for PageElements {
    fn current(&self) -> Option<MediaElement> {
        self.state.lock().current.clone()
    }

    fn on_media_element_changed(&self, callback: ElementCallback) {
        self.state.lock().callbacks.push(callback);
    }
}
