use std::time::Duration;

use serde::Serialize;

use crate::config::SoundSettings;

/// Instruction for the audio backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioCue {
    /// Play the goal sound, stop it after `max_duration_seconds` and fade it out over the
    /// final `fade_out_seconds`.
    PlayGoal {
        /// Starting volume in `[0, 1]`.
        volume: f64,
        /// Auto-stop timeout.
        max_duration_seconds: f64,
        /// Linear fade length at the end of playback.
        fade_out_seconds: f64,
    },
    /// Sound the end-of-match horn.
    PlayEndHorn {
        /// Volume in `[0, 1]`.
        volume: f64,
    },
}

impl AudioCue {
    /// Goal cue for the given sound settings.
    pub fn goal(sound: &SoundSettings) -> Self {
        AudioCue::PlayGoal {
            volume: sound.volume,
            max_duration_seconds: sound.goal_sound_max_duration_seconds,
            fade_out_seconds: sound.goal_sound_fade_out_seconds,
        }
    }

    /// End horn cue for the given sound settings.
    pub fn end_horn(sound: &SoundSettings) -> Self {
        AudioCue::PlayEndHorn {
            volume: sound.volume,
        }
    }
}

/// Convert a settings duration in seconds into a [`Duration`], treating invalid values as zero.
pub(crate) fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
