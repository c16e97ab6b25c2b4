use std::sync::Arc;

use thiserror::Error;
use tracing::{info, trace, warn};

use crate::{
    dto::audio::AudioCue,
    services::goal_sound::{FadePlan, GoalSoundPlayer},
    state::controller::Signal,
};

/// Failure reported by an audio backend.
#[derive(Debug, Error)]
pub enum AudioError {
    /// The platform refused playback (for instance an autoplay policy).
    #[error("playback blocked: {0}")]
    Blocked(String),
    /// The sound could not be loaded or the device is gone.
    #[error("audio backend unavailable: {0}")]
    Unavailable(String),
}

/// Low-level playback backend. Calls must return quickly; they are made from the runtime loop.
pub trait AudioSink: Send + Sync {
    /// Start the goal sound from the beginning at `volume`.
    fn play_goal(&self, volume: f64) -> Result<(), AudioError>;
    /// Change the volume of the goal sound currently playing.
    fn set_goal_volume(&self, volume: f64) -> Result<(), AudioError>;
    /// Stop the goal sound.
    fn stop_goal(&self) -> Result<(), AudioError>;
    /// Sound the end-of-match horn at `volume`.
    fn play_end_horn(&self, volume: f64) -> Result<(), AudioError>;
}

/// Sink that only logs what would be played; used by the headless host.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAudioSink;

impl AudioSink for TracingAudioSink {
    fn play_goal(&self, volume: f64) -> Result<(), AudioError> {
        info!(volume, "goal sound started");
        Ok(())
    }

    fn set_goal_volume(&self, volume: f64) -> Result<(), AudioError> {
        trace!(volume, "goal sound volume");
        Ok(())
    }

    fn stop_goal(&self) -> Result<(), AudioError> {
        info!("goal sound stopped");
        Ok(())
    }

    fn play_end_horn(&self, volume: f64) -> Result<(), AudioError> {
        info!(volume, "end horn");
        Ok(())
    }
}

/// Log a playback failure without letting it reach the match state.
pub(crate) fn report(result: Result<(), AudioError>, action: &'static str) {
    if let Err(err) = result {
        warn!(action, error = %err, "audio playback failed; ignoring");
    }
}

/// Routes controller signals to the audio backend.
pub struct AudioDispatcher {
    sink: Arc<dyn AudioSink>,
    goal_sound: GoalSoundPlayer,
}

impl AudioDispatcher {
    /// Build a dispatcher playing through `sink`.
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            goal_sound: GoalSoundPlayer::new(sink.clone()),
            sink,
        }
    }

    /// Execute every signal in order. Must run inside a Tokio runtime.
    pub fn dispatch_all(&self, signals: &[Signal]) {
        for signal in signals {
            self.dispatch(signal);
        }
    }

    /// Execute a single signal. Must run inside a Tokio runtime.
    pub fn dispatch(&self, signal: &Signal) {
        match signal {
            Signal::GoalScored { cue, delay, .. } => match FadePlan::from_cue(cue) {
                Some(plan) => self.goal_sound.trigger(plan, *delay),
                None => warn!(?cue, "goal signal carried a non-goal cue"),
            },
            Signal::MatchEnded { cue, .. } => match cue {
                AudioCue::PlayEndHorn { volume } => {
                    report(self.sink.play_end_horn(*volume), "play end horn")
                }
                other => warn!(cue = ?other, "end signal carried a non-horn cue"),
            },
        }
    }

    /// Cancel the goal sound timeline, if one is active.
    pub fn cancel_goal_sound(&self) -> bool {
        self.goal_sound.cancel()
    }
}
