use std::fmt;

use serde::{Deserialize, Serialize};

/// Which of the two teams an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Team listed on the left of the scoreboard.
    Home,
    /// Team listed on the right of the scoreboard.
    Away,
}

impl Side {
    /// Name a team on this side gets before it is renamed.
    pub fn default_name(self) -> &'static str {
        match self {
            Side::Home => "Home",
            Side::Away => "Away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// Display color of a team, passed through untouched to the renderer (e.g. `"#1e40af"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamColor(pub String);

impl TeamColor {
    fn default_for(side: Side) -> Self {
        match side {
            Side::Home => TeamColor("#1e40af".into()),
            Side::Away => TeamColor("#b91c1c".into()),
        }
    }
}

/// One of the two teams on the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Display name, also reported as the winner name.
    pub name: String,
    /// Display color.
    pub color: TeamColor,
    /// Goals scored in the current match.
    pub score: u32,
}

impl Team {
    /// Fresh team with the default name and color for `side`.
    pub fn new(side: Side) -> Self {
        Self {
            name: side.default_name().to_owned(),
            color: TeamColor::default_for(side),
            score: 0,
        }
    }

    /// Add a goal and return the new score.
    pub fn score_goal(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    /// Remove a goal. Returns `false` when the score was already 0.
    pub fn revoke_goal(&mut self) -> bool {
        match self.score.checked_sub(1) {
            Some(score) => {
                self.score = score;
                true
            }
            None => false,
        }
    }
}

/// How the current match ended, if it did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    /// Whether an end condition fired.
    pub ended: bool,
    /// Name of the winning team; `None` for a draw or while the match is still on.
    pub winner_name: Option<String>,
}

impl MatchOutcome {
    /// Outcome of a match that ended with `winner_name` (or a draw).
    pub fn ended(winner_name: Option<String>) -> Self {
        Self {
            ended: true,
            winner_name,
        }
    }
}
