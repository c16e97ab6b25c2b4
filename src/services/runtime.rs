//! Event loop owning the match controller: applies UI commands, ticks the clock once per
//! second while it runs, publishes display snapshots and forwards audio signals.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info};

use crate::{
    dto::{command::Command, display::ClockDisplay},
    error::ScoreboardError,
    services::audio::{AudioDispatcher, AudioSink},
    state::controller::{MatchController, Signal},
};

/// Period of the clock scheduler.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

enum RuntimeMessage {
    Command(Command),
    Shutdown,
}

/// Spawns the loop driving a [`MatchController`].
pub struct MatchRuntime;

impl MatchRuntime {
    /// Move `controller` into a background task playing audio through `sink`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn(controller: MatchController, sink: Arc<dyn AudioSink>) -> RuntimeHandle {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (display_tx, display_rx) = watch::channel(controller.display());
        let dispatcher = AudioDispatcher::new(sink);

        let task = tokio::spawn(run(controller, dispatcher, commands_rx, display_tx));

        RuntimeHandle {
            commands: commands_tx,
            display: display_rx,
            task,
        }
    }
}

/// Handle used by the UI side to talk to a running [`MatchRuntime`].
pub struct RuntimeHandle {
    commands: mpsc::UnboundedSender<RuntimeMessage>,
    display: watch::Receiver<ClockDisplay>,
    task: JoinHandle<()>,
}

impl RuntimeHandle {
    /// Queue a UI command.
    pub fn send(&self, command: Command) -> Result<(), ScoreboardError> {
        self.commands.send(RuntimeMessage::Command(command))?;
        Ok(())
    }

    /// Subscribe to display snapshots; a new value is published whenever the display changes.
    pub fn display(&self) -> watch::Receiver<ClockDisplay> {
        self.display.clone()
    }

    /// Latest display snapshot.
    pub fn current(&self) -> ClockDisplay {
        self.display.borrow().clone()
    }

    /// Stop the loop, cancel pending sound timers and wait for the task to finish.
    pub async fn shutdown(self) -> Result<(), ScoreboardError> {
        // A closed channel means the loop already stopped; the join below reports how.
        let _ = self.commands.send(RuntimeMessage::Shutdown);
        self.task.await?;
        Ok(())
    }
}

async fn run(
    mut controller: MatchController,
    dispatcher: AudioDispatcher,
    mut commands: mpsc::UnboundedReceiver<RuntimeMessage>,
    display: watch::Sender<ClockDisplay>,
) {
    let mut ticker = interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut was_running = controller.clock().is_running();

    info!(match_id = %controller.match_id(), "match runtime started");

    loop {
        let running = controller.clock().is_running();
        let signals: Vec<Signal> = tokio::select! {
            message = commands.recv() => match message {
                Some(RuntimeMessage::Command(command)) => {
                    debug!(?command, "command received");
                    if matches!(command, Command::Reset | Command::ApplySettings { .. }) {
                        dispatcher.cancel_goal_sound();
                    }
                    controller.handle(command)
                }
                Some(RuntimeMessage::Shutdown) | None => break,
            },
            _ = ticker.tick(), if running => controller.tick(),
        };

        // A freshly started clock gets a full second before its first tick.
        let now_running = controller.clock().is_running();
        if now_running && !was_running {
            ticker.reset();
        }
        was_running = now_running;

        // Publish the new state before any sound is started.
        let next = controller.display();
        display.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        dispatcher.dispatch_all(&signals);
    }

    dispatcher.cancel_goal_sound();
    info!(match_id = %controller.match_id(), "match runtime stopped");
}
