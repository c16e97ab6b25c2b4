//! Match controller: scores, settings, outcome and the clock, plus the audio signals they produce.

use std::{sync::Arc, time::Duration};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    config::{GameMode, MatchSettings, ScoresOnApply},
    dao::{
        settings_store::{SETTINGS_KEY, SettingsStore},
        storage::StorageError,
    },
    dto::{
        audio::AudioCue,
        command::Command,
        display::{ClockDisplay, EditFields, TeamSummary},
    },
    state::{
        clock::{ClockEvent, MatchClock, TickOutcome},
        game::{MatchOutcome, Side, Team, TeamColor},
    },
};

/// Delay before the goal sound of a match-winning goal, so the final state renders first.
pub const WINNING_GOAL_SOUND_DELAY: Duration = Duration::from_millis(100);

/// Side effect requested by the controller, executed by the audio layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A goal was scored; play the goal sound after `delay`.
    GoalScored {
        /// Scoring team.
        side: Side,
        /// Goal sound parameters.
        cue: AudioCue,
        /// Wait before starting playback.
        delay: Duration,
    },
    /// The match ended; sound the horn.
    MatchEnded {
        /// Winner, or `None` for a draw.
        winner_name: Option<String>,
        /// Horn parameters.
        cue: AudioCue,
    },
}

/// Owner of both teams, the settings, the outcome and the clock of the active match.
///
/// Every operation is infallible from the caller's point of view: rejected events are logged
/// and leave the state untouched.
pub struct MatchController {
    store: Arc<dyn SettingsStore>,
    scores_on_apply: ScoresOnApply,
    settings: MatchSettings,
    home: Team,
    away: Team,
    clock: MatchClock,
    outcome: MatchOutcome,
    match_id: Uuid,
}

impl MatchController {
    /// Build a controller from the settings persisted in `store`, falling back to defaults.
    pub fn new(store: Arc<dyn SettingsStore>, scores_on_apply: ScoresOnApply) -> Self {
        let record = match store.load(SETTINGS_KEY) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "failed to read persisted settings; using defaults");
                None
            }
        };
        let settings = MatchSettings::from_record(record.as_deref());

        Self {
            store,
            scores_on_apply,
            settings,
            home: Team::new(Side::Home),
            away: Team::new(Side::Away),
            clock: MatchClock::new(settings.game_mode, settings.match_duration_minutes),
            outcome: MatchOutcome::default(),
            match_id: Uuid::new_v4(),
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Team on `side`.
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }

    /// The match clock.
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    /// Outcome of the current match.
    pub fn outcome(&self) -> &MatchOutcome {
        &self.outcome
    }

    /// Identifier of the current match, renewed on reset and on settings changes.
    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    /// Dispatch a UI command to the matching operation.
    pub fn handle(&mut self, command: Command) -> Vec<Signal> {
        match command {
            Command::Start => {
                self.start();
            }
            Command::Pause => {
                self.pause();
            }
            Command::ToggleRunning => {
                self.toggle_running();
            }
            Command::Reset => self.reset_match(),
            Command::ToggleEdit => {
                self.toggle_edit();
            }
            Command::SetEditFields { minutes, seconds } => {
                self.set_edit_fields(&minutes, &seconds);
            }
            Command::IncrementScore { side } => return self.increment_score(side),
            Command::DecrementScore { side } => {
                self.decrement_score(side);
            }
            Command::RenameTeam { side, name } => self.rename_team(side, name),
            Command::RecolorTeam { side, color } => self.recolor_team(side, color),
            Command::ApplySettings { settings } => self.apply_settings(settings.into()),
        }
        Vec::new()
    }

    /// Start or resume the clock. Returns `false` when the clock cannot start.
    pub fn start(&mut self) -> bool {
        if self.outcome.ended {
            debug!(match_id = %self.match_id, "ignoring start after the match ended");
            return false;
        }
        self.apply_clock(ClockEvent::Start)
    }

    /// Pause the clock. Returns `false` when it was not running.
    pub fn pause(&mut self) -> bool {
        self.apply_clock(ClockEvent::Pause)
    }

    /// Pause a running clock, otherwise start it.
    pub fn toggle_running(&mut self) -> bool {
        if self.clock.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Open the clock editor, or commit the edited value when it is open.
    pub fn toggle_edit(&mut self) -> bool {
        let applied = self.apply_clock(ClockEvent::EditToggle);
        if applied && !self.clock.is_editing() {
            info!(match_id = %self.match_id, clock = %self.clock.time(), "clock edited");
        }
        applied
    }

    /// Replace the editor fields. Returns `false` when the editor is closed.
    pub fn set_edit_fields(&mut self, minutes: &str, seconds: &str) -> bool {
        let updated = self.clock.set_edit_fields(minutes, seconds);
        if !updated {
            debug!(match_id = %self.match_id, "ignoring edit fields while the editor is closed");
        }
        updated
    }

    /// Add a goal for `side`.
    ///
    /// In goal-based matches the goal reaching the limit ends the match within this call; its
    /// goal sound is deferred by [`WINNING_GOAL_SOUND_DELAY`].
    pub fn increment_score(&mut self, side: Side) -> Vec<Signal> {
        if self.outcome.ended {
            debug!(match_id = %self.match_id, ?side, "ignoring goal after the match ended");
            return Vec::new();
        }

        let score = self.team_mut(side).score_goal();
        let winning = self.settings.game_mode == GameMode::GoalBased
            && score >= self.settings.goal_limit;
        debug!(match_id = %self.match_id, ?side, score, winning, "goal scored");

        let mut signals = vec![Signal::GoalScored {
            side,
            cue: AudioCue::goal(&self.settings.sound),
            delay: if winning {
                WINNING_GOAL_SOUND_DELAY
            } else {
                Duration::ZERO
            },
        }];
        if winning {
            signals.extend(self.on_goal_limit_reached(side));
        }
        signals
    }

    /// Remove a goal from `side`. Returns `false` when nothing changed.
    pub fn decrement_score(&mut self, side: Side) -> bool {
        if self.outcome.ended {
            debug!(match_id = %self.match_id, ?side, "ignoring score correction after the match ended");
            return false;
        }
        self.team_mut(side).revoke_goal()
    }

    /// Rename a team; a blank name restores the default one.
    pub fn rename_team(&mut self, side: Side, name: String) {
        let name = if name.trim().is_empty() {
            side.default_name().to_owned()
        } else {
            name
        };
        self.team_mut(side).name = name;
    }

    /// Change a team color.
    pub fn recolor_team(&mut self, side: Side, color: TeamColor) {
        self.team_mut(side).color = color;
    }

    /// Sanitize, persist and apply new settings.
    ///
    /// The clock is stopped and reset to the new start value and the outcome is cleared.
    /// Scores follow the configured [`ScoresOnApply`] policy. A kept score already at or above
    /// a new goal limit does not end the match; the next goal of that team does.
    pub fn apply_settings(&mut self, settings: MatchSettings) {
        let settings = settings.sanitized();
        if let Err(err) = self.persist(&settings) {
            warn!(error = %err, "failed to persist settings; keeping them for this session only");
        }

        self.settings = settings;
        self.clock
            .reconfigure(settings.game_mode, settings.match_duration_minutes);
        self.outcome = MatchOutcome::default();
        if self.scores_on_apply == ScoresOnApply::Reset {
            self.reset_scores();
        }
        self.match_id = Uuid::new_v4();

        info!(
            match_id = %self.match_id,
            mode = ?settings.game_mode,
            duration = settings.match_duration_minutes,
            goal_limit = settings.goal_limit,
            "settings applied"
        );
    }

    /// Stop the clock, restore its start value, zero both scores and clear the outcome.
    pub fn reset_match(&mut self) {
        self.apply_clock(ClockEvent::Reset);
        self.reset_scores();
        self.outcome = MatchOutcome::default();
        self.match_id = Uuid::new_v4();
        info!(match_id = %self.match_id, "match reset");
    }

    /// Advance the clock by one second; called by the scheduler while the clock runs.
    pub fn tick(&mut self) -> Vec<Signal> {
        match self.clock.tick() {
            TickOutcome::Expired => self.on_clock_time_expired(),
            TickOutcome::Advanced | TickOutcome::Ignored => Vec::new(),
        }
    }

    /// End a time-based match whose countdown ran out. The higher score wins; a tie is a draw.
    pub fn on_clock_time_expired(&mut self) -> Vec<Signal> {
        if self.settings.game_mode != GameMode::TimeBased {
            debug!(match_id = %self.match_id, "ignoring time expiry outside time-based mode");
            return Vec::new();
        }

        let winner_name = match self.home.score.cmp(&self.away.score) {
            std::cmp::Ordering::Greater => Some(self.home.name.clone()),
            std::cmp::Ordering::Less => Some(self.away.name.clone()),
            std::cmp::Ordering::Equal => None,
        };
        self.end_match(winner_name)
    }

    /// End a goal-based match won by `side`.
    pub fn on_goal_limit_reached(&mut self, side: Side) -> Vec<Signal> {
        if self.settings.game_mode != GameMode::GoalBased {
            debug!(match_id = %self.match_id, ?side, "ignoring goal limit outside goal-based mode");
            return Vec::new();
        }

        let winner_name = Some(self.team(side).name.clone());
        self.end_match(winner_name)
    }

    /// Snapshot for the renderer.
    pub fn display(&self) -> ClockDisplay {
        let time = self.clock.time();
        ClockDisplay {
            match_id: self.match_id,
            mode: self.clock.mode(),
            minutes: time.minutes,
            seconds: time.seconds,
            clock: time.to_string(),
            running: self.clock.is_running(),
            editing: self.clock.is_editing(),
            edit: self.clock.edit_draft().map(EditFields::from),
            ended: self.outcome.ended,
            winner_name: self.outcome.winner_name.clone(),
            goal_limit: (self.settings.game_mode == GameMode::GoalBased)
                .then_some(self.settings.goal_limit),
            home: TeamSummary::from(&self.home),
            away: TeamSummary::from(&self.away),
        }
    }

    fn end_match(&mut self, winner_name: Option<String>) -> Vec<Signal> {
        if self.outcome.ended {
            return Vec::new();
        }

        if !self.clock.is_ended() {
            self.apply_clock(ClockEvent::Finish);
        }
        self.outcome = MatchOutcome::ended(winner_name.clone());

        info!(
            match_id = %self.match_id,
            home = self.home.score,
            away = self.away.score,
            winner = winner_name.as_deref().unwrap_or("draw"),
            "match ended"
        );

        vec![Signal::MatchEnded {
            winner_name,
            cue: AudioCue::end_horn(&self.settings.sound),
        }]
    }

    fn reset_scores(&mut self) {
        self.home.score = 0;
        self.away.score = 0;
    }

    fn apply_clock(&mut self, event: ClockEvent) -> bool {
        match self.clock.apply(event) {
            Ok(phase) => {
                debug!(match_id = %self.match_id, ?event, ?phase, "clock transition");
                true
            }
            Err(err) => {
                debug!(match_id = %self.match_id, error = %err, "clock transition rejected");
                false
            }
        }
    }

    fn persist(&self, settings: &MatchSettings) -> Result<(), StorageError> {
        let record = settings.to_record()?;
        self.store.save(SETTINGS_KEY, &record)
    }
}
