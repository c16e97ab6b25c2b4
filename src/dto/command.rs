use serde::Deserialize;

use crate::{
    config::RawSettings,
    state::game::{Side, TeamColor},
};

/// UI events submitted to the match controller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start or resume the clock.
    Start,
    /// Pause the clock.
    Pause,
    /// Start when stopped, pause when running.
    ToggleRunning,
    /// Reset clock, scores and outcome.
    Reset,
    /// Open the clock editor, or commit it when open.
    ToggleEdit,
    /// Update the clock editor fields.
    SetEditFields {
        /// Minutes as typed.
        minutes: String,
        /// Seconds as typed.
        seconds: String,
    },
    /// Add a goal.
    IncrementScore {
        /// Scoring team.
        side: Side,
    },
    /// Remove a goal.
    DecrementScore {
        /// Team losing the goal.
        side: Side,
    },
    /// Rename a team.
    RenameTeam {
        /// Team to rename.
        side: Side,
        /// New display name.
        name: String,
    },
    /// Change a team color.
    RecolorTeam {
        /// Team to recolor.
        side: Side,
        /// New display color.
        color: TeamColor,
    },
    /// Replace the match settings.
    ApplySettings {
        /// Settings form as submitted; every field is sanitized before use.
        settings: RawSettings,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GOAL_LIMIT, GameMode, MatchSettings, SoundSettings};

    #[test]
    fn commands_parse_from_tagged_json() {
        let command: Command =
            serde_json::from_str(r#"{"type":"increment_score","side":"away"}"#).unwrap();
        assert_eq!(command, Command::IncrementScore { side: Side::Away });

        let command: Command = serde_json::from_str(
            r#"{"type":"set_edit_fields","minutes":"07","seconds":"30"}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::SetEditFields {
                minutes: "07".into(),
                seconds: "30".into(),
            }
        );

        let command: Command = serde_json::from_str(r#"{"type":"start"}"#).unwrap();
        assert_eq!(command, Command::Start);
    }

    #[test]
    fn settings_form_with_bad_values_still_parses() {
        let command: Command = serde_json::from_str(
            r#"{"type":"apply_settings","settings":{"gameMode":"goalBased","goalLimit":-3,"matchDurationMinutes":12.5}}"#,
        )
        .unwrap();
        let Command::ApplySettings { settings } = command else {
            panic!("expected an apply_settings command");
        };

        let settings = MatchSettings::from(settings);
        assert_eq!(settings.game_mode, GameMode::GoalBased);
        assert_eq!(settings.goal_limit, DEFAULT_GOAL_LIMIT);
        assert_eq!(settings.match_duration_minutes, 13);
        assert_eq!(settings.sound, SoundSettings::default());
    }

    #[test]
    fn partial_settings_form_keeps_given_fields() {
        let command: Command = serde_json::from_str(
            r#"{"type":"apply_settings","settings":{"goalLimit":4,"sound":{"volume":"loud"}}}"#,
        )
        .unwrap();
        let Command::ApplySettings { settings } = command else {
            panic!("expected an apply_settings command");
        };

        let settings = MatchSettings::from(settings);
        assert_eq!(settings.goal_limit, 4);
        assert_eq!(settings.game_mode, GameMode::TimeBased);
        assert_eq!(settings.match_duration_minutes, 20);
        assert_eq!(settings.sound.volume, 0.7);
    }
}
