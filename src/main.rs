//! Headless floorball scoreboard host: reads JSON commands from stdin, prints display
//! snapshots as JSON lines and logs audio cues.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use floorball_scoreboard::{
    config::HostConfig,
    dao::settings_store::FileSettingsStore,
    dto::command::Command,
    services::{audio::TracingAudioSink, runtime::MatchRuntime},
    state::MatchController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = HostConfig::from_env();
    info!(
        settings_dir = %config.settings_dir.display(),
        scores_on_apply = ?config.scores_on_apply,
        "starting scoreboard host"
    );

    let store = Arc::new(FileSettingsStore::new(&config.settings_dir));
    let controller = MatchController::new(store, config.scores_on_apply);
    let runtime = MatchRuntime::spawn(controller, Arc::new(TracingAudioSink));

    let mut display = runtime.display();
    tokio::spawn(async move {
        loop {
            let line = serde_json::to_string(&*display.borrow_and_update());
            match line {
                Ok(line) => println!("{line}"),
                Err(err) => warn!(error = %err, "failed to serialize display snapshot"),
            }
            if display.changed().await.is_err() {
                break;
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Command>(line) {
                    Ok(command) => runtime.send(command).context("sending command")?,
                    Err(err) => warn!(error = %err, input = line, "ignoring malformed command"),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    runtime.shutdown().await.context("stopping match runtime")?;
    Ok(())
}

/// Configure tracing subscribers; logs go to stderr so stdout only carries snapshots.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,floorball_scoreboard=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
