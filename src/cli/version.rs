//! Version and usage output.

/// The current version of ticketpass, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage: ticketpass [--endpoint URL] [--skew-ms N]

Runs the ticket lifecycle controller headless and prints each state change.

Options:
  --endpoint URL   Fetch tickets from URL instead of the simulated issuer
  --skew-ms N      Offset the simulated issuer clock by N milliseconds
  -V, --version    Print version
  -h, --help       Print this help

Commands (stdin):
  press, release   Reveal / hide the code
  shot             Simulate a screenshot
  retry            Retry after an error or revocation
  bg, fg           Move the app to the background / foreground
  status           Print the current state
  quit             Tear down and exit
";

/// Handle the --version command.
///
/// Prints the version string and exits successfully.
pub fn handle_version_command() -> ! {
    println!("ticketpass {}", VERSION);
    std::process::exit(0)
}

/// Handle the --help command.
pub fn handle_help_command() -> ! {
    print!("{}", USAGE);
    std::process::exit(0)
}
