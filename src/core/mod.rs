//! Identifier validation, orchestration state and the run engine.

pub mod activity;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod recent;
pub mod state;
pub mod time;
pub mod types;
