//! Match state: the clock state machine, the teams and the controller tying them together.

pub mod clock;
pub mod controller;
pub mod game;

pub use self::clock::{ClockEvent, ClockPhase, ClockTime, InvalidTransition, MatchClock};
pub use self::controller::{MatchController, Signal};
pub use self::game::{MatchOutcome, Side, Team, TeamColor};
