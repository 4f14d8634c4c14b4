//! Application foreground/background notifications.

use super::subscription::Subscription;

/// Presence of the application on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPresence {
    /// In the foreground and interactive
    Active,
    /// Transitioning or obscured (app switcher, incoming call)
    Inactive,
    /// Not visible
    Background,
}

impl AppPresence {
    /// Whether the app is in the foreground.
    pub fn is_foreground(&self) -> bool {
        matches!(self, AppPresence::Active)
    }
}

/// Callback invoked on every presence change.
pub type PresenceCallback = Box<dyn Fn(AppPresence) + Send + Sync>;

/// Delivers foreground/background transitions.
pub trait AppLifecycle: Send + Sync {
    /// Register for presence changes; dropping the returned subscription
    /// unregisters the callback.
    fn on_foreground_background_change(&self, callback: PresenceCallback) -> Subscription;
}
