/// Audio backend abstraction and signal routing.
pub mod audio;
/// Goal sound playback timeline with fade-out.
pub mod goal_sound;
/// Scheduler and command loop around the match controller.
pub mod runtime;
