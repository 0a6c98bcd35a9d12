//! Tracks whether the consumer surface is showing.

use tokio::sync::watch;

/// Process-wide visible/hidden flag for one session.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityGate {
    visible: bool,
}

impl Default for VisibilityGate {
    fn default() -> Self {
        VisibilityGate { visible: true }
    }
}

impl VisibilityGate {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns true if the surface was showing.
    pub fn hide(&mut self) -> bool {
        std::mem::replace(&mut self.visible, false)
    }

    /// Returns true if the surface was hidden, i.e. a resync is due.
    pub fn show(&mut self) -> bool {
        !std::mem::replace(&mut self.visible, true)
    }
}

/// Host-side handle reporting show/hide transitions to a running session.
///
/// Dropping it is equivalent to unsubscribing: the session keeps its last
/// known state.
#[derive(Clone)]
pub struct VisibilityNotifier(watch::Sender<bool>);

impl VisibilityNotifier {
    /// Creates a notifier and the receiver a session watches. Starts visible.
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(true);
        (VisibilityNotifier(tx), rx)
    }

    pub fn show(&self) {
        self.set(true);
    }

    pub fn hide(&self) {
        self.set(false);
    }

    pub fn set(&self, visible: bool) {
        self.0.send_replace(visible);
    }

    pub fn is_visible(&self) -> bool {
        *self.0.borrow()
    }
}
