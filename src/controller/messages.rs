//! Messages delivered into the controller task.
//!
//! Everything that can change controller state arrives as one of these,
//! so all mutation happens on a single sequence.

use crate::error::FetchError;
use crate::models::Ticket;
use crate::traits::AppPresence;

/// Commands from the renderer and from platform callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerCommand {
    /// Start the first fetch
    RequestInitialLoad,
    /// Leave `Error` or `Revoked`
    Retry,
    /// User pressed the credential
    BeginReveal,
    /// User released the credential
    EndReveal,
    /// A screen capture was reported
    CaptureDetected,
    /// The app moved to or from the foreground
    PresenceChanged(AppPresence),
    /// Tear down and stop
    Shutdown,
}

impl ControllerCommand {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ControllerCommand::RequestInitialLoad => "request_initial_load",
            ControllerCommand::Retry => "retry",
            ControllerCommand::BeginReveal => "begin_reveal",
            ControllerCommand::EndReveal => "end_reveal",
            ControllerCommand::CaptureDetected => "capture_detected",
            ControllerCommand::PresenceChanged(_) => "presence_changed",
            ControllerCommand::Shutdown => "shutdown",
        }
    }
}

/// Completions from tasks the controller spawned. Each carries the id of
/// the handle that produced it so stale deliveries can be recognised.
#[derive(Debug)]
pub(crate) enum InternalEvent {
    FetchCompleted {
        renewal: u64,
        result: Result<Ticket, FetchError>,
    },
    CountdownTick {
        countdown: u64,
    },
    DriftRetryElapsed {
        retry: u64,
    },
    HideElapsed {
        session: u64,
    },
}
