//! Interactive commands read from stdin while the controller runs.

use std::str::FromStr;

use crate::traits::AppPresence;

/// One line of demo input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoCommand {
    Press,
    Release,
    Screenshot,
    Retry,
    Background,
    Foreground,
    Status,
    Quit,
}

impl DemoCommand {
    /// Presence change carried by this command, if any.
    pub fn presence(&self) -> Option<AppPresence> {
        match self {
            DemoCommand::Background => Some(AppPresence::Background),
            DemoCommand::Foreground => Some(AppPresence::Active),
            _ => None,
        }
    }
}

impl FromStr for DemoCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "press" | "p" => Ok(DemoCommand::Press),
            "release" | "rel" => Ok(DemoCommand::Release),
            "shot" | "screenshot" => Ok(DemoCommand::Screenshot),
            "retry" => Ok(DemoCommand::Retry),
            "bg" | "background" => Ok(DemoCommand::Background),
            "fg" | "foreground" => Ok(DemoCommand::Foreground),
            "status" | "s" => Ok(DemoCommand::Status),
            "quit" | "q" | "exit" => Ok(DemoCommand::Quit),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}
