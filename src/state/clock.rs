use std::{fmt, num::IntErrorKind};

use thiserror::Error;

use crate::config::GameMode;

/// Highest minute value the clock accepts from manual edits.
pub const MAX_EDIT_MINUTES: u32 = 99;
/// Highest second value the clock accepts from manual edits.
pub const MAX_EDIT_SECONDS: u32 = 59;

/// Minutes and seconds shown on the clock, either remaining or elapsed depending on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockTime {
    /// Whole minutes.
    pub minutes: u32,
    /// Seconds within the minute, always below 60.
    pub seconds: u32,
}

impl ClockTime {
    /// 00:00.
    pub const ZERO: ClockTime = ClockTime {
        minutes: 0,
        seconds: 0,
    };

    /// Build a time value, folding excess seconds into minutes.
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self {
            minutes: minutes.saturating_add(seconds / 60),
            seconds: seconds % 60,
        }
    }

    /// Whether the clock reads 00:00.
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}

/// Result of advancing a time value by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock moved to the contained value.
    Advanced(ClockTime),
    /// The countdown reached 00:00; time is up and the value stays at 00:00.
    Expired,
}

/// Advance `time` by one second according to `mode`.
///
/// A countdown expires on the tick that reaches 00:00, and a countdown already at 00:00 expires
/// without underflowing. Minutes are borrowed only when one is left. Elapsed counting has no
/// upper bound.
pub fn tick_time(mode: GameMode, time: ClockTime) -> Tick {
    match mode {
        GameMode::TimeBased => {
            let next = match (time.minutes, time.seconds) {
                (0, 0) => return Tick::Expired,
                (minutes, 0) => ClockTime {
                    minutes: minutes - 1,
                    seconds: 59,
                },
                (minutes, seconds) => ClockTime {
                    minutes,
                    seconds: seconds - 1,
                },
            };

            if next.is_zero() {
                Tick::Expired
            } else {
                Tick::Advanced(next)
            }
        }
        GameMode::GoalBased => {
            if time.seconds + 1 >= 60 {
                Tick::Advanced(ClockTime {
                    minutes: time.minutes.saturating_add(1),
                    seconds: 0,
                })
            } else {
                Tick::Advanced(ClockTime {
                    minutes: time.minutes,
                    seconds: time.seconds + 1,
                })
            }
        }
    }
}

/// Text fields of the clock editor, holding whatever the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    /// Minutes field.
    pub minutes: String,
    /// Seconds field.
    pub seconds: String,
}

impl EditDraft {
    /// Pre-fill the editor with the current clock value.
    pub fn from_time(time: ClockTime) -> Self {
        Self {
            minutes: format!("{:02}", time.minutes),
            seconds: format!("{:02}", time.seconds),
        }
    }

    /// Parse the fields into a clock value. Non-numeric input counts as 0; values are clamped.
    pub fn commit(&self) -> ClockTime {
        ClockTime {
            minutes: parse_field(&self.minutes, MAX_EDIT_MINUTES),
            seconds: parse_field(&self.seconds, MAX_EDIT_SECONDS),
        }
    }
}

fn parse_field(input: &str, max: u32) -> u32 {
    match input.trim().parse::<i64>() {
        Ok(value) => value.clamp(0, i64::from(max)) as u32,
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => max,
        Err(_) => 0,
    }
}

/// Phases of the match clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockPhase {
    /// Showing the configured start value, never started since the last reset.
    Idle,
    /// Ticking once per second.
    Running,
    /// Stopped mid-match.
    Paused,
    /// Stopped with the editor open (time-based matches only).
    Editing(EditDraft),
    /// The match is over; only a reset leaves this phase.
    Ended,
}

/// Events that can be applied to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Start or resume ticking.
    Start,
    /// Stop ticking.
    Pause,
    /// Open the editor, or commit it when already open.
    EditToggle,
    /// Back to the configured start value.
    Reset,
    /// A countdown ran out.
    Expire,
    /// The controller ended the match for another reason (goal limit).
    Finish,
}

/// Error returned when an event cannot be applied in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid clock transition: {event:?} cannot be applied while in {from:?} ({mode:?})")]
pub struct InvalidTransition {
    /// Phase the clock was in when the event was received.
    pub from: ClockPhase,
    /// The rejected event.
    pub event: ClockEvent,
    /// Game mode of the clock at that moment.
    pub mode: GameMode,
}

/// What a call to [`MatchClock::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The clock was not running; nothing changed.
    Ignored,
    /// The time value moved by one second.
    Advanced,
    /// The countdown expired and the clock is now [`ClockPhase::Ended`].
    Expired,
}

/// Ticking time value of a match plus its start/pause/edit state machine.
#[derive(Debug, Clone)]
pub struct MatchClock {
    mode: GameMode,
    duration_minutes: u32,
    time: ClockTime,
    phase: ClockPhase,
}

impl MatchClock {
    /// Create an idle clock showing the start value for `mode`.
    pub fn new(mode: GameMode, duration_minutes: u32) -> Self {
        Self {
            mode,
            duration_minutes,
            time: start_time(mode, duration_minutes),
            phase: ClockPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &ClockPhase {
        &self.phase
    }

    /// Current time value.
    pub fn time(&self) -> ClockTime {
        self.time
    }

    /// Mode the clock was configured with.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Whether the clock is ticking.
    pub fn is_running(&self) -> bool {
        self.phase == ClockPhase::Running
    }

    /// Whether the editor is open.
    pub fn is_editing(&self) -> bool {
        matches!(self.phase, ClockPhase::Editing(_))
    }

    /// Whether the clock has ended.
    pub fn is_ended(&self) -> bool {
        self.phase == ClockPhase::Ended
    }

    /// Editor fields, when the editor is open.
    pub fn edit_draft(&self) -> Option<&EditDraft> {
        match &self.phase {
            ClockPhase::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Replace the editor fields. Returns `false` when the editor is closed.
    pub fn set_edit_fields(&mut self, minutes: &str, seconds: &str) -> bool {
        match &mut self.phase {
            ClockPhase::Editing(draft) => {
                draft.minutes = minutes.to_owned();
                draft.seconds = seconds.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Apply `event`, returning the phase the clock moved to.
    pub fn apply(&mut self, event: ClockEvent) -> Result<&ClockPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;

        match (&self.phase, &next) {
            (ClockPhase::Editing(draft), ClockPhase::Paused) => self.time = draft.commit(),
            (_, ClockPhase::Idle) => self.time = start_time(self.mode, self.duration_minutes),
            (_, ClockPhase::Ended) if event == ClockEvent::Expire => self.time = ClockTime::ZERO,
            _ => {}
        }

        self.phase = next;
        Ok(&self.phase)
    }

    /// Advance by one second if running. Called once per elapsed second by the scheduler.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Ignored;
        }

        match tick_time(self.mode, self.time) {
            Tick::Advanced(time) => {
                self.time = time;
                TickOutcome::Advanced
            }
            Tick::Expired => match self.apply(ClockEvent::Expire) {
                Ok(_) => TickOutcome::Expired,
                Err(_) => TickOutcome::Ignored,
            },
        }
    }

    /// Switch to a new mode and duration; the clock is reset to the new start value.
    pub fn reconfigure(&mut self, mode: GameMode, duration_minutes: u32) {
        *self = Self::new(mode, duration_minutes);
    }

    fn compute_transition(&self, event: ClockEvent) -> Result<ClockPhase, InvalidTransition> {
        let next = match (&self.phase, event) {
            (ClockPhase::Idle | ClockPhase::Paused, ClockEvent::Start) => ClockPhase::Running,
            (ClockPhase::Running, ClockEvent::Pause) => ClockPhase::Paused,
            (ClockPhase::Idle | ClockPhase::Paused, ClockEvent::EditToggle)
                if self.mode == GameMode::TimeBased =>
            {
                ClockPhase::Editing(EditDraft::from_time(self.time))
            }
            (ClockPhase::Editing(_), ClockEvent::EditToggle) => ClockPhase::Paused,
            (_, ClockEvent::Reset) => ClockPhase::Idle,
            (ClockPhase::Running, ClockEvent::Expire) if self.mode == GameMode::TimeBased => {
                ClockPhase::Ended
            }
            (phase, ClockEvent::Finish) if *phase != ClockPhase::Ended => ClockPhase::Ended,
            (from, event) => {
                return Err(InvalidTransition {
                    from: from.clone(),
                    event,
                    mode: self.mode,
                });
            }
        };

        Ok(next)
    }
}

fn start_time(mode: GameMode, duration_minutes: u32) -> ClockTime {
    match mode {
        GameMode::TimeBased => ClockTime {
            minutes: duration_minutes,
            seconds: 0,
        },
        GameMode::GoalBased => ClockTime::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_countdown(minutes: u32, seconds: u32) -> MatchClock {
        let mut clock = MatchClock::new(GameMode::TimeBased, 20);
        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.set_edit_fields(&minutes.to_string(), &seconds.to_string());
        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.apply(ClockEvent::Start).unwrap();
        clock
    }

    #[test]
    fn initial_state_is_idle_at_start_value() {
        let clock = MatchClock::new(GameMode::TimeBased, 20);
        assert_eq!(clock.phase(), &ClockPhase::Idle);
        assert_eq!(clock.time(), ClockTime::new(20, 0));

        let clock = MatchClock::new(GameMode::GoalBased, 20);
        assert_eq!(clock.time(), ClockTime::ZERO);
    }

    #[test]
    fn countdown_expires_exactly_once_on_fifth_tick() {
        let mut clock = running_countdown(0, 5);
        let outcomes: Vec<_> = (0..5).map(|_| clock.tick()).collect();
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Advanced,
                TickOutcome::Expired,
            ]
        );
        assert!(clock.is_ended());
        assert_eq!(clock.time(), ClockTime::ZERO);

        assert_eq!(clock.tick(), TickOutcome::Ignored);
        assert_eq!(clock.time(), ClockTime::ZERO);
    }

    #[test]
    fn countdown_started_at_zero_expires_on_first_tick() {
        let mut clock = running_countdown(0, 0);
        assert_eq!(clock.tick(), TickOutcome::Expired);
        assert_eq!(clock.time(), ClockTime::ZERO);
    }

    #[test]
    fn countdown_borrows_only_when_minutes_remain() {
        assert_eq!(
            tick_time(GameMode::TimeBased, ClockTime::new(1, 0)),
            Tick::Advanced(ClockTime::new(0, 59))
        );
        assert_eq!(
            tick_time(GameMode::TimeBased, ClockTime::new(0, 2)),
            Tick::Advanced(ClockTime::new(0, 1))
        );
        assert_eq!(
            tick_time(GameMode::TimeBased, ClockTime::new(0, 1)),
            Tick::Expired
        );
        assert_eq!(
            tick_time(GameMode::TimeBased, ClockTime::ZERO),
            Tick::Expired
        );
    }

    #[test]
    fn elapsed_counter_rolls_over_minutes() {
        assert_eq!(
            tick_time(GameMode::GoalBased, ClockTime::new(0, 59)),
            Tick::Advanced(ClockTime::new(1, 0))
        );
        assert_eq!(
            tick_time(GameMode::GoalBased, ClockTime::new(120, 30)),
            Tick::Advanced(ClockTime::new(120, 31))
        );
    }

    #[test]
    fn tick_is_ignored_unless_running() {
        let mut clock = MatchClock::new(GameMode::TimeBased, 1);
        assert_eq!(clock.tick(), TickOutcome::Ignored);
        assert_eq!(clock.time(), ClockTime::new(1, 0));

        clock.apply(ClockEvent::Start).unwrap();
        clock.apply(ClockEvent::Pause).unwrap();
        assert_eq!(clock.tick(), TickOutcome::Ignored);
        assert_eq!(clock.time(), ClockTime::new(1, 0));
    }

    #[test]
    fn editing_copies_current_time_and_commits_clamped_values() {
        let mut clock = MatchClock::new(GameMode::TimeBased, 20);
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert_eq!(
            clock.edit_draft(),
            Some(&EditDraft {
                minutes: "20".into(),
                seconds: "00".into(),
            })
        );

        assert!(clock.set_edit_fields("07", "30"));
        assert_eq!(clock.apply(ClockEvent::EditToggle).unwrap(), &ClockPhase::Paused);
        assert_eq!(clock.time(), ClockTime::new(7, 30));

        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.set_edit_fields("abc", "75");
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert_eq!(clock.time(), ClockTime::new(0, 59));

        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.set_edit_fields("150", "-4");
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert_eq!(clock.time(), ClockTime::new(99, 0));

        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.set_edit_fields("100000000000000000000", "30");
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert_eq!(clock.time(), ClockTime::new(99, 30));

        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.set_edit_fields("12", "-100000000000000000000");
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert_eq!(clock.time(), ClockTime::new(12, 0));
    }

    #[test]
    fn editing_rejected_while_running_or_goal_based() {
        let mut clock = MatchClock::new(GameMode::TimeBased, 20);
        clock.apply(ClockEvent::Start).unwrap();
        let err = clock.apply(ClockEvent::EditToggle).unwrap_err();
        assert_eq!(err.from, ClockPhase::Running);
        assert_eq!(err.event, ClockEvent::EditToggle);
        assert!(clock.is_running());

        let mut clock = MatchClock::new(GameMode::GoalBased, 20);
        assert!(clock.apply(ClockEvent::EditToggle).is_err());
        assert!(!clock.set_edit_fields("01", "00"));
    }

    #[test]
    fn start_rejected_while_editing_or_ended() {
        let mut clock = MatchClock::new(GameMode::TimeBased, 20);
        clock.apply(ClockEvent::EditToggle).unwrap();
        assert!(clock.apply(ClockEvent::Start).is_err());

        clock.apply(ClockEvent::Finish).unwrap();
        assert!(clock.apply(ClockEvent::Start).is_err());
        assert!(clock.apply(ClockEvent::Finish).is_err());
    }

    #[test]
    fn reset_restores_start_value_from_any_phase() {
        let mut clock = running_countdown(0, 1);
        assert_eq!(clock.tick(), TickOutcome::Expired);
        assert!(clock.is_ended());

        assert_eq!(clock.apply(ClockEvent::Reset).unwrap(), &ClockPhase::Idle);
        assert_eq!(clock.time(), ClockTime::new(20, 0));

        clock.apply(ClockEvent::EditToggle).unwrap();
        clock.apply(ClockEvent::Reset).unwrap();
        assert!(!clock.is_editing());
        assert_eq!(clock.time(), ClockTime::new(20, 0));
    }

    #[test]
    fn goal_based_clock_never_expires() {
        let mut clock = MatchClock::new(GameMode::GoalBased, 1);
        clock.apply(ClockEvent::Start).unwrap();
        for _ in 0..125 {
            assert_eq!(clock.tick(), TickOutcome::Advanced);
        }
        assert_eq!(clock.time(), ClockTime::new(2, 5));
        assert!(clock.apply(ClockEvent::Expire).is_err());
    }

    #[test]
    fn clock_time_formats_with_padding() {
        assert_eq!(ClockTime::new(7, 5).to_string(), "07:05");
        assert_eq!(ClockTime::new(0, 125).to_string(), "02:05");
    }
}
