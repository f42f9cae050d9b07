//! GridMatch State Library
//!
//! This crate provides the state core for a multiplayer, turn-based
//! N-in-a-row grid game.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Board** - An NxN grid (3 to 6) with incremental win detection that only
//!   inspects the lines through the last move.
//!
//! - **Match State Machine** - `NotStarted → Ongoing → Complete`, seat order,
//!   turn enforcement, win and draw detection.
//!
//! - **Match Registry** - Every running match keyed by id, with change
//!   notifications carrying the full listing.
//!
//! - **Player Registry** - Player ids and display names.
//!
//! # Design Principles
//!
//! 1. **State machines validate transitions** - A rejected call leaves state
//!    exactly as it was.
//!
//! 2. **Registries own their entities** - Matches and boards are only mutated
//!    through registry operations.
//!
//! 3. **No networking** - This crate is pure state; transports subscribe to
//!    notifications and forward the snapshots.
//!
//! 4. **Serialization-ready** - Snapshots convert to JSON for clients.
//!
//! # Example
//!
//! ```rust
//! use gridmatch_state::{AppState, GridSize, MatchStatus, Seat};
//!
//! let mut app = AppState::new();
//!
//! // Listen for match changes
//! app.matches.subscribe(|change| {
//!     let _json = change.to_json();
//! });
//!
//! let a = app.players.register_player().player.id;
//! let b = app.players.register_player().player.id;
//!
//! let id = app.matches.create_match(GridSize::Three, a.clone()).changed.unwrap().id;
//! app.matches.add_participant(&id, b.clone()).unwrap();
//! app.matches.start_match(&id).unwrap();
//!
//! app.matches.apply_move(&id, &a, 0, 0).unwrap();
//! app.matches.apply_move(&id, &b, 0, 1).unwrap();
//! app.matches.apply_move(&id, &a, 1, 1).unwrap();
//! app.matches.apply_move(&id, &b, 0, 2).unwrap();
//! let change = app.matches.apply_move(&id, &a, 2, 2).unwrap();
//!
//! let data = change.changed.unwrap().game_data;
//! assert_eq!(data.status, MatchStatus::Complete);
//! assert_eq!(data.winner, Some(Seat::One));
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
