//! Game logic for the match-cascade engine.
//!
//! This module orchestrates the core data structures into the two tile-matching
//! game variants:
//!
//! - [`MatchRules`] - Line-run and flood-fill match detection with scoring
//! - [`Cascade`] - Gravity compaction with the animated, bouncing fall
//! - [`FallingPair`] - The player-controlled pair of the flood-fill variant
//! - [`GameSession`] - The phase machine sequencing input, matches, and drops
//! - [`SessionStats`] - Score, chains, and floating score popups
//!
//! # Game flow
//!
//! A player action (a swap, or a locked pair) mutates the board, then:
//!
//! 1. The match scan runs; found groups score immediately and start popping
//! 2. Popped cells leave the board and the cascade compacts the columns
//! 3. Once every falling cell settles, the scan runs again; further groups
//!    continue the chain with a higher multiplier
//! 4. When a settle produces no match, the chain resets and control returns
//!    to the player (or the session ends on a termination condition)
//!
//! All of this advances inside [`GameSession::update`] from an injected
//! delta-time; the engine never reads a clock of its own.

pub use self::{cascade::*, generator::*, matcher::*, pair::*, session::*, session_stats::*};

mod cascade;
mod generator;
mod matcher;
mod pair;
mod session;
mod session_stats;
