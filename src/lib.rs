//! Library crate for floorball-scoreboard: the match clock, the match controller and the
//! runtime that drives them, exposed for the host binary and integration tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
