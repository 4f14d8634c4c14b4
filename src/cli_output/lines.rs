//! Simple line-based rendering of controller state.

use crate::controller::ControllerState;
use crate::notifications::Alert;

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Cells in the countdown bar.
const BAR_WIDTH: usize = 20;

/// Print the main header.
///
/// ```text
/// TICKETPASS 0.2.4
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "═".repeat(LINE_WIDTH));
    println!();
}

/// Render a progress fraction as a fixed-width bar.
///
/// ```text
/// [██████████··········]
/// ```
pub fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "█".repeat(filled),
        "·".repeat(BAR_WIDTH - filled)
    )
}

/// One line describing `state` at `now_ms`.
///
/// ```text
///   ✓ TICKET_8F2K1ZQ0A  42s [██████████████········]
///   ✗ Connection error: Unable to fetch a ticket. [Retry]
/// ```
pub fn format_state(state: &ControllerState, now_ms: i64) -> String {
    match state {
        ControllerState::Loading => format!("  {} Loading ticket...", SPINNER_CHARS[0]),
        ControllerState::Active {
            ticket,
            seconds_remaining,
            revealed,
        } => {
            let mut line = format!(
                "  {} {}  {:>2}s {}",
                icons::SUCCESS,
                ticket.id,
                seconds_remaining,
                progress_bar(ticket.progress(now_ms))
            );
            if *revealed {
                line.push_str("  REVEALED ");
                line.push_str(&ticket.scan_payload());
            }
            line
        }
        ControllerState::Error { notice } => format!(
            "  {} {}: {} [{}]",
            icons::FAILURE,
            notice.title,
            notice.detail,
            notice.action_label
        ),
        ControllerState::Revoked { notice } => format!(
            "  {} {}: {} [{}]",
            icons::WARNING,
            notice.title,
            notice.detail,
            notice.action_label
        ),
    }
}

/// Print a state line.
pub fn print_state(state: &ControllerState, now_ms: i64) {
    println!("{}", format_state(state, now_ms));
}

/// Print a one-shot alert as a boxed block.
///
/// ```text
/// ────────────────────────────────────────────────────────────
/// ⚠ Security warning
///   Screenshot detected! The code has been invalidated.
/// ────────────────────────────────────────────────────────────
/// ```
pub fn print_alert(alert: &Alert) {
    println!("{}", "─".repeat(LINE_WIDTH));
    println!("{}", alert.title());
    println!("  {}", alert.body());
    println!("{}", "─".repeat(LINE_WIDTH));
}

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
}

/// Spinner characters for loading animation.
pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
