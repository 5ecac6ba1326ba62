//! Handle returned by [`SearchController::subscribe`](super::SearchController::subscribe).

use super::Shared;
use std::sync::Weak;

/// Registration of a state callback.
///
/// Dropping the handle unsubscribes; use [`Subscription::detach`] to keep the
/// callback registered for the controller's lifetime.
#[must_use = "dropping a Subscription unsubscribes the callback immediately"]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
    active: bool,
}

impl Subscription {
    pub(super) fn new(id: u64, shared: Weak<Shared>) -> Self {
        Self {
            id,
            shared,
            active: true,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Stop receiving states. Returns false if the callback was already gone
    /// (controller disposed or dropped).
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    /// Keep the callback registered without holding the handle.
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) -> bool {
        if !std::mem::replace(&mut self.active, false) {
            return false;
        }
        match self.shared.upgrade() {
            Some(shared) => shared.remove_subscriber(self.id),
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
