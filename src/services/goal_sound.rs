//! Goal sound timeline: optional start delay, playback, linear fade-out and auto-stop.
//!
//! At most one timeline exists at a time. Triggering a new goal sound cancels the previous
//! timeline and stops its sound before the new one starts.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{Instant, sleep, sleep_until},
};
use tracing::debug;

use crate::{
    dto::audio::{AudioCue, seconds},
    services::audio::{AudioSink, report},
};

/// Number of discrete volume steps in a fade-out.
pub const FADE_STEPS: u32 = 20;

/// Precomputed volume schedule for one goal sound.
#[derive(Debug, Clone, PartialEq)]
pub struct FadePlan {
    /// Volume playback starts at.
    pub volume: f64,
    /// Offset from playback start to the beginning of the fade.
    pub fade_start: Duration,
    /// Time between two volume steps.
    pub step_interval: Duration,
    /// Volume applied at each step, ending at 0.
    pub step_volumes: Vec<f64>,
    /// Offset from playback start at which the sound is stopped.
    pub stop_after: Duration,
}

impl FadePlan {
    /// Plan playback at `volume` for `max_duration_seconds`, fading over the final
    /// `fade_out_seconds` (capped at the max duration).
    pub fn new(volume: f64, max_duration_seconds: f64, fade_out_seconds: f64) -> Self {
        let stop_after = seconds(max_duration_seconds);
        let fade = seconds(fade_out_seconds).min(stop_after);

        if fade.is_zero() {
            return Self {
                volume,
                fade_start: stop_after,
                step_interval: Duration::ZERO,
                step_volumes: Vec::new(),
                stop_after,
            };
        }

        let step_volumes = (1..=FADE_STEPS)
            .map(|step| volume * (1.0 - f64::from(step) / f64::from(FADE_STEPS)))
            .collect();

        Self {
            volume,
            fade_start: stop_after - fade,
            step_interval: fade / FADE_STEPS,
            step_volumes,
            stop_after,
        }
    }

    /// Plan for a [`AudioCue::PlayGoal`] cue; `None` for any other cue.
    pub fn from_cue(cue: &AudioCue) -> Option<Self> {
        match *cue {
            AudioCue::PlayGoal {
                volume,
                max_duration_seconds,
                fade_out_seconds,
            } => Some(Self::new(volume, max_duration_seconds, fade_out_seconds)),
            AudioCue::PlayEndHorn { .. } => None,
        }
    }
}

/// Owner of the single goal sound timeline.
pub struct GoalSoundPlayer {
    sink: Arc<dyn AudioSink>,
    generation: Arc<AtomicU64>,
    active: Mutex<Option<JoinHandle<()>>>,
}

impl GoalSoundPlayer {
    /// Create a player driving `sink`.
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            generation: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
        }
    }

    /// Replace any in-flight goal sound with a new timeline following `plan` after `delay`.
    ///
    /// Must run inside a Tokio runtime.
    pub fn trigger(&self, plan: FadePlan, delay: Duration) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = active.take() {
            self.stop_timeline(previous);
        }

        debug!(generation, ?delay, "goal sound timeline scheduled");
        let sink = self.sink.clone();
        let current = self.generation.clone();
        *active = Some(tokio::spawn(run_timeline(
            sink, current, generation, plan, delay,
        )));
    }

    /// Cancel the in-flight timeline. Returns `true` when one was still running.
    pub fn cancel(&self) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        match active.take() {
            Some(previous) => self.stop_timeline(previous),
            None => false,
        }
    }

    fn stop_timeline(&self, handle: JoinHandle<()>) -> bool {
        if handle.is_finished() {
            return false;
        }
        handle.abort();
        report(self.sink.stop_goal(), "stop superseded goal sound");
        true
    }
}

impl Drop for GoalSoundPlayer {
    fn drop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let active = self.active.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = active.take() {
            handle.abort();
        }
    }
}

async fn run_timeline(
    sink: Arc<dyn AudioSink>,
    current: Arc<AtomicU64>,
    generation: u64,
    plan: FadePlan,
    delay: Duration,
) {
    let is_current = || current.load(Ordering::SeqCst) == generation;

    if !delay.is_zero() {
        sleep(delay).await;
    }
    if !is_current() {
        return;
    }

    let started = Instant::now();
    report(sink.play_goal(plan.volume), "play goal sound");

    let fade_from = started + plan.fade_start;
    for (step, volume) in (1..).zip(plan.step_volumes.iter().copied()) {
        sleep_until(fade_from + plan.step_interval * step).await;
        if !is_current() {
            return;
        }
        report(sink.set_goal_volume(volume), "fade goal sound");
    }

    sleep_until(started + plan.stop_after).await;
    if !is_current() {
        return;
    }
    report(sink.stop_goal(), "stop goal sound");
    debug!(generation, "goal sound timeline finished");
}
