//! Observable controller state.
//!
//! `ControllerState` is the only thing a renderer reads. A ticket exists
//! only in `Active`, which keeps the "ticket iff active" rule in the type.

use std::fmt;

use crate::error::ErrorCategory;
use crate::models::Ticket;

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for a ticket
    Loading,
    /// A ticket is displayed and counting down
    Active,
    /// The last fetch failed; waiting for a retry command
    Error,
    /// Invalidated by a screen capture; waiting for a retry command
    Revoked,
}

impl Phase {
    /// Get the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Loading => "loading",
            Phase::Active => "active",
            Phase::Error => "error",
            Phase::Revoked => "revoked",
        }
    }

    /// Whether only an explicit retry leaves this phase.
    pub fn needs_retry(&self) -> bool {
        matches!(self, Phase::Error | Phase::Revoked)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-facing explanation for a phase that needs an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
    /// Label for the button that sends `retry()`
    pub action_label: String,
}

impl Notice {
    /// Generic connectivity notice shown in `Error`.
    pub fn connection_error() -> Self {
        Self {
            title: "Connection error".to_string(),
            detail: "Unable to fetch a ticket.".to_string(),
            action_label: "Retry".to_string(),
        }
    }

    /// Security notice shown in `Revoked`.
    pub fn capture_revoked() -> Self {
        Self {
            title: "Screenshot detected".to_string(),
            detail: "The code has been invalidated. Please re-acquire it.".to_string(),
            action_label: "Re-acquire".to_string(),
        }
    }

    /// Notice for a failure that ends up on screen. Categories the user
    /// never sees have none.
    pub fn for_category(category: ErrorCategory) -> Option<Self> {
        match category {
            ErrorCategory::TransientFetch => Some(Self::connection_error()),
            ErrorCategory::Revocation => Some(Self::capture_revoked()),
            _ => None,
        }
    }
}

/// Snapshot published to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Loading,
    Active {
        ticket: Ticket,
        seconds_remaining: u32,
        revealed: bool,
    },
    Error {
        notice: Notice,
    },
    Revoked {
        notice: Notice,
    },
}

impl ControllerState {
    /// Build an `Active` state for a freshly installed ticket.
    pub fn active(ticket: Ticket, seconds_remaining: u32) -> Self {
        ControllerState::Active {
            ticket,
            seconds_remaining,
            revealed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            ControllerState::Loading => Phase::Loading,
            ControllerState::Active { .. } => Phase::Active,
            ControllerState::Error { .. } => Phase::Error,
            ControllerState::Revoked { .. } => Phase::Revoked,
        }
    }

    /// The displayed ticket, present only while `Active`.
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            ControllerState::Active { ticket, .. } => Some(ticket),
            _ => None,
        }
    }

    /// Whole seconds left on the displayed ticket; 0 outside `Active`.
    pub fn seconds_remaining(&self) -> u32 {
        match self {
            ControllerState::Active {
                seconds_remaining, ..
            } => *seconds_remaining,
            _ => 0,
        }
    }

    /// Whether the credential is revealed. Never true outside `Active`.
    pub fn revealed(&self) -> bool {
        matches!(self, ControllerState::Active { revealed: true, .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            ControllerState::Error { notice } | ControllerState::Revoked { notice } => Some(notice),
            _ => None,
        }
    }

    /// Progress bar fraction for the displayed ticket.
    pub fn progress(&self, now_ms: i64) -> Option<f64> {
        self.ticket().map(|ticket| ticket.progress(now_ms))
    }

    /// Set the countdown value. Returns true if it changed.
    pub(crate) fn set_seconds_remaining(&mut self, value: u32) -> bool {
        match self {
            ControllerState::Active {
                seconds_remaining, ..
            } if *seconds_remaining != value => {
                *seconds_remaining = value;
                true
            }
            _ => false,
        }
    }

    /// Set the reveal flag. Ignored outside `Active`.
    pub(crate) fn set_revealed(&mut self, value: bool) -> bool {
        match self {
            ControllerState::Active { revealed, .. } if *revealed != value => {
                *revealed = value;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_only_for_visible_categories() {
        assert_eq!(
            Notice::for_category(ErrorCategory::TransientFetch),
            Some(Notice::connection_error())
        );
        assert_eq!(
            Notice::for_category(ErrorCategory::Revocation),
            Some(Notice::capture_revoked())
        );
        for hidden in [
            ErrorCategory::ClockDrift,
            ErrorCategory::Cancelled,
            ErrorCategory::Device,
            ErrorCategory::PermissionDenied,
        ] {
            assert!(!hidden.is_user_visible());
            assert!(Notice::for_category(hidden).is_none());
        }
    }

    fn ticket() -> Ticket {
        Ticket::new("TICKET_A", "sig", 60, 60_000)
    }

    #[test]
    fn test_default_is_loading() {
        let state = ControllerState::default();
        assert_eq!(state.phase(), Phase::Loading);
        assert!(state.ticket().is_none());
        assert_eq!(state.seconds_remaining(), 0);
        assert!(!state.revealed());
    }

    #[test]
    fn test_ticket_only_in_active() {
        let active = ControllerState::active(ticket(), 60);
        assert_eq!(active.ticket(), Some(&ticket()));
        assert_eq!(active.seconds_remaining(), 60);

        let error = ControllerState::Error {
            notice: Notice::connection_error(),
        };
        assert!(error.ticket().is_none());
        assert_eq!(error.notice().unwrap().action_label, "Retry");
    }

    #[test]
    fn test_revealed_ignored_outside_active() {
        let mut state = ControllerState::Loading;
        assert!(!state.set_revealed(true));
        assert!(!state.revealed());

        let mut state = ControllerState::active(ticket(), 10);
        assert!(state.set_revealed(true));
        assert!(state.revealed());
        assert!(!state.set_revealed(true));
    }

    #[test]
    fn test_set_seconds_reports_change() {
        let mut state = ControllerState::active(ticket(), 10);
        assert!(!state.set_seconds_remaining(10));
        assert!(state.set_seconds_remaining(9));
        assert_eq!(state.seconds_remaining(), 9);
    }

    #[test]
    fn test_progress() {
        let state = ControllerState::active(ticket(), 30);
        assert!((state.progress(30_000).unwrap() - 0.5).abs() < 1e-9);
        assert!(ControllerState::Loading.progress(0).is_none());
    }

    #[test]
    fn test_revoked_notice() {
        let state = ControllerState::Revoked {
            notice: Notice::capture_revoked(),
        };
        assert_eq!(state.phase(), Phase::Revoked);
        assert!(state.phase().needs_retry());
        assert_eq!(state.notice().unwrap().action_label, "Re-acquire");
        assert_eq!(Phase::Revoked.to_string(), "revoked");
    }
}
