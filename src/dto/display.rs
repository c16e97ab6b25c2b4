use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::GameMode,
    state::{
        clock::EditDraft,
        game::{Team, TeamColor},
    },
};

/// Scoreboard entry for one team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: TeamColor,
    /// Current score.
    pub score: u32,
}

impl From<&Team> for TeamSummary {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            color: team.color.clone(),
            score: team.score,
        }
    }
}

/// Editor fields as shown by the clock editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFields {
    /// Minutes field.
    pub minutes: String,
    /// Seconds field.
    pub seconds: String,
}

impl From<&EditDraft> for EditFields {
    fn from(draft: &EditDraft) -> Self {
        Self {
            minutes: draft.minutes.clone(),
            seconds: draft.seconds.clone(),
        }
    }
}

/// Everything the renderer needs to draw the scoreboard and the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockDisplay {
    /// Identifier of the current match, renewed on every reset.
    pub match_id: Uuid,
    /// Countdown or elapsed mode.
    pub mode: GameMode,
    /// Remaining minutes (time-based) or elapsed minutes (goal-based).
    pub minutes: u32,
    /// Remaining or elapsed seconds.
    pub seconds: u32,
    /// `MM:SS` rendering of the clock.
    pub clock: String,
    /// Whether the clock is ticking.
    pub running: bool,
    /// Whether the clock editor is open.
    pub editing: bool,
    /// Editor fields while editing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<EditFields>,
    /// Whether the match is over.
    pub ended: bool,
    /// Winner once the match is over; absent for a draw or a match in progress.
    pub winner_name: Option<String>,
    /// Target score in goal-based matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_limit: Option<u32>,
    /// Home team entry.
    pub home: TeamSummary,
    /// Away team entry.
    pub away: TeamSummary,
}
