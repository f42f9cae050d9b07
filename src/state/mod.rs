//! State management module.
//!
//! - `board` - grid cells and win detection
//! - `game` - single match state machine
//! - `timer` - optional per-turn countdown attached to a match
//! - `registry` - all matches, keyed by id
//! - `player` - player identities
//! - `notify` - observer lists used by the registries
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          AppState                            │
//! │                                                              │
//! │  ┌──────────────────────┐      ┌──────────────────────┐      │
//! │  │    MatchRegistry     │      │    PlayerRegistry    │      │
//! │  │                      │      │                      │      │
//! │  │ match_id → Match     │      │ player_id → Player   │      │
//! │  │   ├─ Board           │      │                      │      │
//! │  │   └─ TurnTimer?      │      │                      │      │
//! │  │                      │      │                      │      │
//! │  │ ─▶ MatchesChanged    │      │ ─▶ PlayersChanged    │      │
//! │  └──────────────────────┘      └──────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use gridmatch_state::state::{AppState, GridSize};
//!
//! let mut app = AppState::new();
//! let alice = app.players.register_player().player.id;
//! let bob = app.players.register_player().player.id;
//!
//! let game = app.matches.create_match(GridSize::Three, alice.clone()).changed.unwrap().id;
//! app.matches.add_participant(&game, bob).unwrap();
//! app.matches.start_match(&game).unwrap();
//! app.matches.apply_move(&game, &alice, 1, 1).unwrap();
//! ```

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod names;
pub mod notify;
pub mod player;
pub mod registry;
pub mod timer;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

// Re-export commonly used types
pub use board::{center_coordinates, diagonal_coordinates, Board, BoardError, Cell, Coord, Grid, GridSize};
pub use config::{ConfigError, EngineConfig};
pub use error::ErrorKind;
pub use game::{Match, MatchError, MatchEvent, MatchSnapshot, MatchStatus, Seat, MAX_PARTICIPANTS};
pub use notify::{Observers, SubscriptionId};
pub use player::{Player, PlayerError, PlayerRegistry, PlayersChanged};
pub use registry::{MatchRegistry, MatchView, MatchesChanged, RegistryError};
pub use timer::{TimerState, TurnTimer, DEFAULT_TURN_DURATION_MS};

/// Application context: one per process, handed to the transport layer.
#[derive(Debug, Default)]
pub struct AppState {
    pub matches: MatchRegistry,
    pub players: PlayerRegistry,
    config: EngineConfig,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build empty registries configured by `config`.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut matches = MatchRegistry::new();
        if let Some(ms) = config.turn_timer_ms() {
            matches = matches.with_turn_timer(ms);
        }
        info!(
            grid_size = config.default_grid_size.value(),
            timed = config.timed_matches,
            "App state initialised"
        );
        Self {
            matches,
            players: PlayerRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a match at the configured default size.
    pub fn create_default_match(&mut self, first_player_id: impl Into<String>) -> MatchesChanged {
        self.matches
            .create_match(self.config.default_grid_size, first_player_id)
    }

    /// Split into independently locked registries.
    ///
    /// Listeners already subscribed to either registry move across and keep
    /// receiving changes.
    pub fn into_shared(mut self) -> SharedAppState {
        let match_observers = self.matches.take_observers();
        let player_observers = self.players.take_observers();
        SharedAppState {
            matches: Arc::new(Mutex::new(self.matches)),
            players: Arc::new(Mutex::new(self.players)),
            match_observers: Arc::new(Mutex::new(match_observers)),
            player_observers: Arc::new(Mutex::new(player_observers)),
            config: self.config,
        }
    }
}

/// Thread-safe application context.
///
/// One coarse lock per registry: every match shares one lock, every player
/// shares the other. Change listeners live behind their own locks and are
/// called after the registry guard has been released, so a listener may read
/// either registry. Listeners must not subscribe or unsubscribe from inside
/// the callback.
///
/// Per-match event listeners (`subscribe_match_events`) still run while the
/// match registry is locked.
#[derive(Debug, Clone)]
pub struct SharedAppState {
    matches: Arc<Mutex<MatchRegistry>>,
    players: Arc<Mutex<PlayerRegistry>>,
    match_observers: Arc<Mutex<Observers<MatchesChanged>>>,
    player_observers: Arc<Mutex<Observers<PlayersChanged>>>,
    config: EngineConfig,
}

impl SharedAppState {
    pub fn new(config: EngineConfig) -> Self {
        AppState::with_config(config).into_shared()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn publish_matches(&self, change: MatchesChanged) -> MatchesChanged {
        self.match_observers.lock().emit(&change);
        change
    }

    fn publish_players(&self, change: PlayersChanged) -> PlayersChanged {
        self.player_observers.lock().emit(&change);
        change
    }

    pub fn register_player(&self) -> PlayersChanged {
        let change = self.players.lock().insert_player();
        self.publish_players(change)
    }

    pub fn rename_player(
        &self,
        player_id: &str,
        new_name: impl Into<String>,
    ) -> Result<PlayersChanged, PlayerError> {
        let change = self.players.lock().set_username(player_id, new_name.into())?;
        Ok(self.publish_players(change))
    }

    pub fn list_players(&self) -> Vec<Player> {
        self.players.lock().list_players()
    }

    pub fn create_match(
        &self,
        size: GridSize,
        first_player_id: impl Into<String>,
    ) -> MatchesChanged {
        let change = self.matches.lock().insert_match(size, first_player_id.into());
        self.publish_matches(change)
    }

    /// Create a match at the configured default size.
    pub fn create_default_match(&self, first_player_id: impl Into<String>) -> MatchesChanged {
        self.create_match(self.config.default_grid_size, first_player_id)
    }

    pub fn create_match_with_size(
        &self,
        size: usize,
        first_player_id: impl Into<String>,
    ) -> Result<MatchesChanged, RegistryError> {
        let size = GridSize::try_from(size)?;
        Ok(self.create_match(size, first_player_id))
    }

    pub fn add_participant(
        &self,
        match_id: &str,
        player_id: impl Into<String>,
    ) -> Result<MatchesChanged, RegistryError> {
        let change = self
            .matches
            .lock()
            .seat_participant(match_id, player_id.into())?;
        Ok(self.publish_matches(change))
    }

    pub fn start_match(&self, match_id: &str) -> Result<MatchesChanged, RegistryError> {
        let change = self.matches.lock().begin_match(match_id)?;
        Ok(self.publish_matches(change))
    }

    pub fn apply_move(
        &self,
        match_id: &str,
        player_id: &str,
        col: usize,
        row: usize,
    ) -> Result<MatchesChanged, RegistryError> {
        let change = self
            .matches
            .lock()
            .play_move(match_id, player_id, col, row)?;
        Ok(self.publish_matches(change))
    }

    pub fn delete_match(&self, match_id: &str) -> MatchesChanged {
        let change = self.matches.lock().remove_match(match_id);
        self.publish_matches(change)
    }

    pub fn list_matches(&self) -> Vec<MatchView> {
        self.matches.lock().list_matches()
    }

    /// Read the match registry under its lock.
    pub fn with_matches<R>(&self, f: impl FnOnce(&MatchRegistry) -> R) -> R {
        f(&self.matches.lock())
    }

    /// Read the player registry under its lock.
    pub fn with_players<R>(&self, f: impl FnOnce(&PlayerRegistry) -> R) -> R {
        f(&self.players.lock())
    }

    pub fn subscribe_matches<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MatchesChanged) + Send + 'static,
    {
        self.match_observers.lock().subscribe(listener)
    }

    pub fn unsubscribe_matches(&self, id: SubscriptionId) -> bool {
        self.match_observers.lock().unsubscribe(id)
    }

    pub fn subscribe_players<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayersChanged) + Send + 'static,
    {
        self.player_observers.lock().subscribe(listener)
    }

    pub fn unsubscribe_players(&self, id: SubscriptionId) -> bool {
        self.player_observers.lock().unsubscribe(id)
    }

    pub fn subscribe_match_events<F>(
        &self,
        match_id: &str,
        listener: F,
    ) -> Result<SubscriptionId, RegistryError>
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        self.matches.lock().subscribe_match_events(match_id, listener)
    }

    pub fn poll_timers(&self, now: chrono::DateTime<chrono::Utc>) -> Vec<(String, MatchEvent)> {
        self.matches.lock().poll_timers(now)
    }
}

impl Default for SharedAppState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_basic() {
        let mut state = AppState::new();

        let p1 = state.players.register_player().player.id;
        let p2 = state.players.register_player().player.id;

        let id = state.create_default_match(p1.clone()).changed.unwrap().id;
        state.matches.add_participant(&id, p2).unwrap();
        state.matches.start_match(&id).unwrap();

        let m = state.matches.get(&id).unwrap();
        assert_eq!(m.size(), GridSize::Three);
        assert_eq!(m.seat_of(&p1), Some(Seat::One));
        assert!(m.timer().is_none());
    }

    #[test]
    fn test_timed_config() {
        let config = EngineConfig {
            default_grid_size: GridSize::Six,
            timed_matches: true,
            turn_duration_ms: 500,
        };
        let mut state = AppState::with_config(config);
        let id = state.create_default_match("p1").changed.unwrap().id;

        let m = state.matches.get(&id).unwrap();
        assert_eq!(m.size(), GridSize::Six);
        assert_eq!(
            m.timer().unwrap().duration(),
            chrono::Duration::milliseconds(500)
        );
    }

    #[test]
    fn test_shared_state_across_threads() {
        let shared = SharedAppState::default();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    let player = shared.register_player().player.id;
                    shared.create_match(GridSize::Three, player);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.list_players().len(), 4);
        assert_eq!(shared.with_matches(|m| m.len()), 4);
    }

    #[test]
    fn test_into_shared_keeps_listeners() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut state = AppState::new();
        let sink = std::sync::Arc::clone(&seen);
        state
            .matches
            .subscribe(move |c: &MatchesChanged| sink.lock().unwrap().push(c.matches.len()));

        let shared = state.into_shared();
        shared.create_match(GridSize::Four, "p1");
        shared.create_match(GridSize::Five, "p2");

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
