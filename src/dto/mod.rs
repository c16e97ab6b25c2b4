//! Values exchanged with the collaborators around the core: the UI, the renderer and the audio backend.

pub mod audio;
pub mod command;
pub mod display;
