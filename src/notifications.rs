//! One-shot user alerts.
//!
//! Alerts are transient: a renderer shows each one once, as a modal or a
//! banner. Persistent explanations live in the state's `Notice` instead.

use tokio::sync::broadcast;

/// Buffered alerts per receiver before the oldest are dropped.
pub const ALERT_CAPACITY: usize = 16;

/// Something the user must be told about right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// A screen capture invalidated the displayed ticket
    CaptureDetected,
}

impl Alert {
    pub fn title(&self) -> &'static str {
        match self {
            Alert::CaptureDetected => "⚠ Security warning",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Alert::CaptureDetected => "Screenshot detected! The code has been invalidated.",
        }
    }
}

/// Fan-out of alerts to any number of renderers.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: broadcast::Sender<Alert>,
}

impl AlertSender {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Send an alert. Returns the number of receivers reached; an alert
    /// with nobody listening is dropped.
    pub fn send(&self, alert: Alert) -> usize {
        match self.tx.send(alert) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("No alert receivers for {:?}", alert);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.tx.subscribe()
    }
}

impl Default for AlertSender {
    fn default() -> Self {
        Self::new(ALERT_CAPACITY)
    }
}
