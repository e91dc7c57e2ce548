//! Affirm application binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Build the orchestrator and install it as the process-wide context
//! 3. Render the dialog in the terminal and forward y/n answers to it
//! 4. Exit with 0 when the user confirmed and the action succeeded, 1 otherwise
//!
//! `--init-config` writes the effective configuration to the config path and
//! exits without asking anything.

mod cli;
mod simulate;
mod terminal;

use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use affirm_core::config::AffirmConfig;
use affirm_engine::presenter::{dispatch, drive};
use affirm_engine::{context, ConfirmRequest, Orchestrator};

use cli::CliArgs;
use terminal::{parse_answer, TerminalPresenter};

/// Read stdin lines on a dedicated thread so a pending read never blocks
/// runtime shutdown.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Print every lifecycle event as a JSON line on stderr.
fn spawn_event_log(orchestrator: &Orchestrator) -> JoinHandle<()> {
    let mut events = orchestrator.events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => eprintln!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Write `config` to `path` unless a file is already there.
fn init_config(path: &Path, config: &AffirmConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if path.exists() {
        eprintln!("Config file already exists: {}", path.display());
        return Ok(ExitCode::from(2));
    }
    config.save(path)?;
    println!("Wrote {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing so the configured level can seed the
    // filter; load problems are logged once the subscriber is up.
    let config_file = args.resolve_config_path();
    let loaded = AffirmConfig::load_optional(&config_file);
    let config_level = match &loaded {
        Ok(Some(config)) => config.general.log_level.as_str(),
        _ => "info",
    };
    let log_level = args.resolve_log_level(config_level);

    // Tracing. Stdout belongs to the dialog.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Affirm v{}", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(Some(config)) => {
            tracing::info!(path = %config_file.display(), "Configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %config_file.display(),
                error = %e,
                "Invalid configuration, using defaults"
            );
            AffirmConfig::default()
        }
        Ok(None) => {
            tracing::debug!(path = %config_file.display(), "No configuration file, using defaults");
            AffirmConfig::default()
        }
    };

    if args.init_config {
        return init_config(&config_file, &config);
    }

    // Orchestrator and context.
    let orchestrator = Orchestrator::from_config(&config);
    let context_guard = context::install(orchestrator.handle())?;

    let renderer = {
        let rx = orchestrator.subscribe();
        tokio::spawn(async move {
            let mut presenter = TerminalPresenter::new(std::io::stdout());
            drive(&mut presenter, rx).await;
        })
    };
    let event_log = args.events.then(|| spawn_event_log(&orchestrator));

    // The request goes through the context like any other call site.
    let request = simulate::with_simulated_action(
        ConfirmRequest::with_patch(args.dialog_patch())
            .on_cancel(|| tracing::info!("User declined")),
        args.fail_times,
        Duration::from_millis(args.action_ms),
    );
    let mut confirmation = context::current()?.confirm(request);

    let mut input = spawn_input_reader();
    let mut input_open = true;
    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut confirmation => break outcome,
            line = input.recv(), if input_open => match line {
                Some(line) => match parse_answer(&line) {
                    Some(gesture) => {
                        if !dispatch(&orchestrator, gesture).await {
                            tracing::debug!(?gesture, "Answer ignored");
                        }
                    }
                    None => eprintln!("Please answer y or n"),
                },
                None => {
                    tracing::info!("Input closed, cancelling");
                    input_open = false;
                    orchestrator.handle_cancel();
                }
            },
        }
    };

    let confirmed = outcome?;
    if confirmed {
        // Leave the success message up until the dialog closes itself.
        tokio::time::sleep(config.engine.success_close_delay() + Duration::from_millis(50)).await;
    }

    drop(context_guard);
    drop(orchestrator);
    renderer.await?;
    if let Some(event_log) = event_log {
        event_log.await?;
    }

    if confirmed {
        println!("confirmed");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("cancelled");
        Ok(ExitCode::from(1))
    }
}
