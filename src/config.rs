//! Match settings loading and sanitation, plus the host configuration read from the environment.

use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Volume used when the persisted value is missing or not a finite number.
pub const DEFAULT_VOLUME: f64 = 0.7;
/// Goal sound auto-stop timeout used when the persisted value is unusable.
pub const DEFAULT_GOAL_SOUND_MAX_DURATION_SECONDS: f64 = 15.0;
/// Goal sound fade-out used when the persisted value is unusable.
pub const DEFAULT_GOAL_SOUND_FADE_OUT_SECONDS: f64 = 2.0;
/// Match length for time-based games when the persisted value is unusable.
pub const DEFAULT_MATCH_DURATION_MINUTES: u32 = 20;
/// Winning goal count for goal-based games when the persisted value is unusable.
pub const DEFAULT_GOAL_LIMIT: u32 = 10;
/// Largest match length the two-digit clock can show.
pub const MAX_MATCH_DURATION_MINUTES: u32 = 99;
/// Largest accepted goal limit.
pub const MAX_GOAL_LIMIT: u32 = 99;
/// A goal sound always plays for at least this long.
pub const MIN_GOAL_SOUND_MAX_DURATION_SECONDS: f64 = 1.0;

/// Directory of the file-backed settings store when [`SETTINGS_DIR_ENV`] is unset.
const DEFAULT_SETTINGS_DIR: &str = "config";
/// Environment variable that overrides [`DEFAULT_SETTINGS_DIR`].
const SETTINGS_DIR_ENV: &str = "SCOREBOARD_SETTINGS_DIR";
/// Environment variable selecting [`ScoresOnApply::Reset`] when truthy.
const RESET_SCORES_ENV: &str = "SCOREBOARD_RESET_SCORES_ON_APPLY";

/// How a match is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Clock counts down from the match duration; the match ends at 00:00.
    #[default]
    TimeBased,
    /// Clock counts up; the first team to reach the goal limit wins.
    GoalBased,
}

/// Whether applying new settings also clears the current scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoresOnApply {
    /// Scores survive a settings change.
    #[default]
    Keep,
    /// Scores go back to 0-0 whenever settings are applied.
    Reset,
}

/// Audio parameters for goal and end-of-match cues.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSettings {
    /// Playback volume in `[0, 1]`.
    pub volume: f64,
    /// Goal sound is stopped after this many seconds.
    pub goal_sound_max_duration_seconds: f64,
    /// Length of the linear fade at the end of the goal sound, never above the max duration.
    pub goal_sound_fade_out_seconds: f64,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            goal_sound_max_duration_seconds: DEFAULT_GOAL_SOUND_MAX_DURATION_SECONDS,
            goal_sound_fade_out_seconds: DEFAULT_GOAL_SOUND_FADE_OUT_SECONDS,
        }
    }
}

/// Settings for a single match. Every instance handed out by this module is sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSettings {
    /// Time-based or goal-based match.
    pub game_mode: GameMode,
    /// Countdown start for time-based matches.
    pub match_duration_minutes: u32,
    /// Winning score for goal-based matches.
    pub goal_limit: u32,
    /// Audio parameters.
    pub sound: SoundSettings,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            game_mode: GameMode::TimeBased,
            match_duration_minutes: DEFAULT_MATCH_DURATION_MINUTES,
            goal_limit: DEFAULT_GOAL_LIMIT,
            sound: SoundSettings::default(),
        }
    }
}

impl MatchSettings {
    /// Build settings from a persisted record, falling back to defaults for anything unusable.
    ///
    /// `None` means nothing was stored yet. Corrupt JSON falls back to the defaults as a whole;
    /// a readable record is sanitized field by field so one bad value does not discard the rest.
    pub fn from_record(record: Option<&str>) -> Self {
        let Some(record) = record else {
            info!("no persisted settings found; using built-in defaults");
            return Self::default();
        };

        match serde_json::from_str::<Value>(record) {
            Ok(value @ Value::Object(_)) => RawSettings::from_value(&value).into(),
            Ok(other) => {
                warn!(
                    kind = json_kind(&other),
                    "persisted settings are not an object; falling back to defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(error = %err, "failed to parse persisted settings; falling back to defaults");
                Self::default()
            }
        }
    }

    /// Serialize the settings into the record format read by [`MatchSettings::from_record`].
    pub fn to_record(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Clamp every field into its valid range.
    pub fn sanitized(self) -> Self {
        RawSettings::from(self).into()
    }
}

/// Unchecked settings as they arrive from storage or from the settings form.
///
/// Numbers are kept as `f64` so non-finite and fractional inputs can be detected and repaired.
/// Deserializing never fails on bad values; unusable fields are simply left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct RawSettings {
    /// Requested game mode, if recognisable.
    pub game_mode: Option<GameMode>,
    /// Requested match length in minutes.
    pub match_duration_minutes: Option<f64>,
    /// Requested goal limit.
    pub goal_limit: Option<f64>,
    /// Requested volume.
    pub volume: Option<f64>,
    /// Requested goal sound duration in seconds.
    pub goal_sound_max_duration_seconds: Option<f64>,
    /// Requested goal sound fade-out in seconds.
    pub goal_sound_fade_out_seconds: Option<f64>,
}

impl RawSettings {
    /// Extract every known field from a JSON object, ignoring values of the wrong type.
    pub fn from_value(value: &Value) -> Self {
        let sound = value.get("sound");
        Self {
            game_mode: value.get("gameMode").and_then(|mode| {
                let parsed = serde_json::from_value::<GameMode>(mode.clone()).ok();
                if parsed.is_none() {
                    warn!(value = %mode, "unknown game mode in persisted settings");
                }
                parsed
            }),
            match_duration_minutes: number_field(Some(value), "matchDurationMinutes"),
            goal_limit: number_field(Some(value), "goalLimit"),
            volume: number_field(sound, "volume"),
            goal_sound_max_duration_seconds: number_field(sound, "goalSoundMaxDurationSeconds"),
            goal_sound_fade_out_seconds: number_field(sound, "goalSoundFadeOutSeconds"),
        }
    }
}

impl From<Value> for RawSettings {
    fn from(value: Value) -> Self {
        RawSettings::from_value(&value)
    }
}

impl From<MatchSettings> for RawSettings {
    fn from(value: MatchSettings) -> Self {
        Self {
            game_mode: Some(value.game_mode),
            match_duration_minutes: Some(f64::from(value.match_duration_minutes)),
            goal_limit: Some(f64::from(value.goal_limit)),
            volume: Some(value.sound.volume),
            goal_sound_max_duration_seconds: Some(value.sound.goal_sound_max_duration_seconds),
            goal_sound_fade_out_seconds: Some(value.sound.goal_sound_fade_out_seconds),
        }
    }
}

impl From<RawSettings> for MatchSettings {
    fn from(value: RawSettings) -> Self {
        let volume = match value.volume {
            Some(volume) if volume.is_finite() => volume.clamp(0.0, 1.0),
            other => defaulted("volume", other, DEFAULT_VOLUME),
        };

        let max_duration = match value.goal_sound_max_duration_seconds {
            Some(seconds) if seconds.is_finite() => {
                seconds.max(MIN_GOAL_SOUND_MAX_DURATION_SECONDS)
            }
            other => defaulted(
                "goalSoundMaxDurationSeconds",
                other,
                DEFAULT_GOAL_SOUND_MAX_DURATION_SECONDS,
            ),
        };

        let fade_out = match value.goal_sound_fade_out_seconds {
            Some(seconds) if seconds.is_finite() => seconds.clamp(0.0, max_duration),
            other => defaulted(
                "goalSoundFadeOutSeconds",
                other,
                DEFAULT_GOAL_SOUND_FADE_OUT_SECONDS,
            )
            .min(max_duration),
        };

        Self {
            game_mode: value.game_mode.unwrap_or_default(),
            match_duration_minutes: positive_count(
                "matchDurationMinutes",
                value.match_duration_minutes,
                DEFAULT_MATCH_DURATION_MINUTES,
                MAX_MATCH_DURATION_MINUTES,
            ),
            goal_limit: positive_count(
                "goalLimit",
                value.goal_limit,
                DEFAULT_GOAL_LIMIT,
                MAX_GOAL_LIMIT,
            ),
            sound: SoundSettings {
                volume,
                goal_sound_max_duration_seconds: max_duration,
                goal_sound_fade_out_seconds: fade_out,
            },
        }
    }
}

/// Runtime configuration of the headless host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Directory holding the settings record.
    pub settings_dir: PathBuf,
    /// Score policy when settings change mid-match.
    pub scores_on_apply: ScoresOnApply,
}

impl HostConfig {
    /// Read the host configuration from the environment, using built-in defaults for unset values.
    pub fn from_env() -> Self {
        let settings_dir = env::var_os(SETTINGS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_DIR));

        let scores_on_apply = match env::var(RESET_SCORES_ENV) {
            Ok(value) if is_truthy(&value) => ScoresOnApply::Reset,
            _ => ScoresOnApply::Keep,
        };

        Self {
            settings_dir,
            scores_on_apply,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn number_field(object: Option<&Value>, key: &str) -> Option<f64> {
    let value = object?.get(key)?;
    let number = value.as_f64();
    if number.is_none() {
        warn!(field = key, value = %value, "ignoring non-numeric settings value");
    }
    number
}

fn defaulted(field: &str, raw: Option<f64>, default: f64) -> f64 {
    if let Some(raw) = raw {
        warn!(field, raw, default, "settings value is not finite; using default");
    }
    default
}

/// Round a positive count into `1..=max`; zero, negative and non-finite values use the default.
fn positive_count(field: &str, raw: Option<f64>, default: u32, max: u32) -> u32 {
    match raw {
        Some(value) if value.is_finite() && value.round() >= 1.0 => {
            value.round().min(f64::from(max)) as u32
        }
        Some(value) => {
            warn!(field, raw = value, default, "settings value out of range; using default");
            default
        }
        None => default,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_sound_values_fall_back_to_defaults() {
        let raw = RawSettings {
            volume: Some(f64::NAN),
            goal_sound_max_duration_seconds: Some(f64::INFINITY),
            ..RawSettings::default()
        };

        let settings = MatchSettings::from(raw);
        assert_eq!(settings.sound.volume, 0.7);
        assert_eq!(settings.sound.goal_sound_max_duration_seconds, 15.0);
        assert_eq!(settings.sound.goal_sound_fade_out_seconds, 2.0);
    }

    #[test]
    fn missing_record_yields_defaults() {
        assert_eq!(MatchSettings::from_record(None), MatchSettings::default());
    }

    #[test]
    fn corrupt_record_yields_defaults() {
        assert_eq!(
            MatchSettings::from_record(Some("{not json")),
            MatchSettings::default()
        );
        assert_eq!(
            MatchSettings::from_record(Some("[1, 2, 3]")),
            MatchSettings::default()
        );
    }

    #[test]
    fn record_is_sanitized_field_by_field() {
        let record = r#"{
            "gameMode": "goalBased",
            "matchDurationMinutes": "long",
            "goalLimit": 5,
            "sound": { "volume": 3.5, "goalSoundMaxDurationSeconds": 0.2, "goalSoundFadeOutSeconds": 9 }
        }"#;

        let settings = MatchSettings::from_record(Some(record));
        assert_eq!(settings.game_mode, GameMode::GoalBased);
        assert_eq!(settings.match_duration_minutes, DEFAULT_MATCH_DURATION_MINUTES);
        assert_eq!(settings.goal_limit, 5);
        assert_eq!(settings.sound.volume, 1.0);
        assert_eq!(settings.sound.goal_sound_max_duration_seconds, 1.0);
        assert_eq!(settings.sound.goal_sound_fade_out_seconds, 1.0);
    }

    #[test]
    fn unknown_game_mode_defaults_to_time_based() {
        let settings = MatchSettings::from_record(Some(r#"{"gameMode": "penalties"}"#));
        assert_eq!(settings.game_mode, GameMode::TimeBased);
    }

    #[test]
    fn counts_are_rounded_and_clamped() {
        let raw = RawSettings {
            match_duration_minutes: Some(250.0),
            goal_limit: Some(0.0),
            ..RawSettings::default()
        };
        let settings = MatchSettings::from(raw);
        assert_eq!(settings.match_duration_minutes, MAX_MATCH_DURATION_MINUTES);
        assert_eq!(settings.goal_limit, DEFAULT_GOAL_LIMIT);

        let raw = RawSettings {
            match_duration_minutes: Some(12.4),
            goal_limit: Some(-3.0),
            ..RawSettings::default()
        };
        let settings = MatchSettings::from(raw);
        assert_eq!(settings.match_duration_minutes, 12);
        assert_eq!(settings.goal_limit, DEFAULT_GOAL_LIMIT);
    }

    #[test]
    fn fade_never_exceeds_max_duration() {
        let settings = MatchSettings {
            sound: SoundSettings {
                volume: 0.5,
                goal_sound_max_duration_seconds: 4.0,
                goal_sound_fade_out_seconds: 10.0,
            },
            ..MatchSettings::default()
        }
        .sanitized();
        assert_eq!(settings.sound.goal_sound_fade_out_seconds, 4.0);
    }

    #[test]
    fn sanitized_settings_survive_a_record_round_trip() {
        let settings = MatchSettings {
            game_mode: GameMode::GoalBased,
            match_duration_minutes: 15,
            goal_limit: 7,
            sound: SoundSettings {
                volume: 0.25,
                goal_sound_max_duration_seconds: 8.0,
                goal_sound_fade_out_seconds: 1.5,
            },
        };
        let record = settings.to_record().unwrap();
        assert_eq!(MatchSettings::from_record(Some(&record)), settings);
    }
}
