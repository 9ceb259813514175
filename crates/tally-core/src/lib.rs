//! Core types and trait definitions for the Tally score-submission pipeline.
//!
//! This crate is deliberately free of HTTP, crypto and database dependencies.
//! All other crates depend on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod achievement;
pub mod error;
pub mod judgement;
pub mod map;
pub mod mods;
pub mod player;
pub mod rating;
pub mod ruleset;
pub mod score;
pub mod services;
pub mod session;
pub mod store;

pub use error::{Error, Result};

/// Identity of a persisted result, assigned by the store.
pub type ScoreId = i64;
/// Identity of a player account.
pub type PlayerId = u32;
/// Identity of a beatmap difficulty.
pub type MapId = u32;
/// Identity of an entry in the achievement registry.
pub type AchievementId = u32;
