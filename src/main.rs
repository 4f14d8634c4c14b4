use std::sync::Arc;

use color_eyre::eyre::{eyre, Result, WrapErr};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticketpass::adapters::{
    HttpTicketFetcher, InMemoryBrightness, InMemoryCaptureGuard, ManualLifecycle,
    SimulatedTicketFetcher, SystemClock,
};
use ticketpass::cli::{parse_args, run_cli_command, DemoCommand, USAGE, VERSION};
use ticketpass::cli_output::{print_alert, print_header, print_state};
use ticketpass::config::ControllerConfig;
use ticketpass::controller::{ControllerHandle, LifecycleController};
use ticketpass::traits::{ClockSource, CredentialFetcher};

/// Devices standing in for the platform while running headless.
struct Devices {
    capture: InMemoryCaptureGuard,
    brightness: InMemoryBrightness,
    lifecycle: ManualLifecycle,
}

/// Print every state change and alert until the controller stops.
async fn render_states(handle: ControllerHandle, clock: Arc<dyn ClockSource>) {
    let mut states = handle.subscribe();
    let mut alerts = handle.alerts();
    drop(handle);

    print_state(&states.borrow(), clock.now_millis());
    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                print_state(&state, clock.now_millis());
            }
            alert = alerts.recv() => match alert {
                Ok(alert) => print_alert(&alert),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

fn dispatch(
    handle: &ControllerHandle,
    devices: &Devices,
    clock: &dyn ClockSource,
    command: DemoCommand,
) -> Result<()> {
    match command {
        DemoCommand::Press => handle.begin_reveal()?,
        DemoCommand::Release => handle.end_reveal()?,
        DemoCommand::Retry => handle.retry()?,
        DemoCommand::Screenshot => {
            // Goes through the capture guard subscription like a real event
            devices.capture.trigger_capture();
        }
        DemoCommand::Background | DemoCommand::Foreground => {
            if let Some(presence) = command.presence() {
                devices.lifecycle.emit(presence);
            }
        }
        DemoCommand::Status => {
            print_state(&handle.state(), clock.now_millis());
            println!(
                "  brightness {:.2}, capture protected: {}",
                devices.brightness.level(),
                devices.capture.is_protected()
            );
        }
        // Handled by the input loop
        DemoCommand::Quit => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = parse_args(std::env::args()).map_err(|e| eyre!("{}\n\n{}", e, USAGE))?;
    let options = run_cli_command(command);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ticketpass=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = ControllerConfig::from_env().wrap_err("Invalid TICKETPASS_* environment")?;
    if let Some(endpoint) = options.endpoint {
        config.endpoint = Some(endpoint);
    }

    let clock: Arc<dyn ClockSource> = Arc::new(SystemClock::new());
    let fetcher: Arc<dyn CredentialFetcher> = match HttpTicketFetcher::from_config(&config) {
        Some(fetcher) => {
            let fetcher = fetcher.wrap_err("Failed to build HTTP ticket fetcher")?;
            info!("Fetching tickets from {}", fetcher.endpoint());
            Arc::new(fetcher)
        }
        None => {
            info!(
                "Using simulated ticket issuer (skew {}ms)",
                options.skew_ms
            );
            Arc::new(SimulatedTicketFetcher::new(clock.clone()).with_issuer_skew_ms(options.skew_ms))
        }
    };

    let devices = Devices {
        capture: InMemoryCaptureGuard::new(),
        brightness: InMemoryBrightness::default(),
        lifecycle: ManualLifecycle::new(),
    };

    let controller = LifecycleController::builder(
        fetcher,
        Arc::new(devices.capture.clone()),
        Arc::new(devices.brightness.clone()),
    )
    .with_clock(clock.clone())
    .with_lifecycle(Arc::new(devices.lifecycle.clone()))
    .with_config(config)
    .spawn()?;
    let handle = controller.handle();

    print_header(&format!("TICKETPASS {}", VERSION));
    let renderer = tokio::spawn(render_states(handle.clone(), clock.clone()));
    handle.request_initial_load()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<DemoCommand>() {
                    Ok(DemoCommand::Quit) => break,
                    Ok(command) => dispatch(&handle, &devices, clock.as_ref(), command)?,
                    Err(e) => eprintln!("{} (see --help)", e),
                }
            }
        }
    }

    drop(handle);
    controller.shutdown().await;
    let _ = renderer.await;

    println!(
        "Stopped. brightness {:.2}, capture protected: {}",
        devices.brightness.level(),
        devices.capture.is_protected()
    );
    Ok(())
}
