//! Match registry.
//!
//! Owns every [`Match`] in the process. All match mutation goes through
//! here; each successful mutation is followed by one [`MatchesChanged`]
//! notification carrying the affected match and the full listing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, trace};

use super::board::{BoardError, GridSize};
use super::error::ErrorKind;
use super::game::{Match, MatchError, MatchEvent, MatchSnapshot};
use super::notify::{Observers, SubscriptionId};
use super::timer::TurnTimer;

/// A match as seen from outside the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchView {
    pub id: String,
    /// Player ids in seat order
    pub player_ids: Vec<String>,
    pub game_data: MatchSnapshot,
}

impl MatchView {
    fn of(m: &Match) -> Self {
        Self {
            id: m.id.clone(),
            player_ids: m.participants().to_vec(),
            game_data: m.snapshot(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "player_ids": self.player_ids,
            "game_data": self.game_data.to_json()
        })
    }
}

/// Emitted after every registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchesChanged {
    /// The match that changed; for deletes, the removed match if it existed
    pub changed: Option<MatchView>,
    /// Every live match, in creation order
    pub matches: Vec<MatchView>,
}

impl MatchesChanged {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "game": self.changed.as_ref().map(|m| m.to_json()),
            "games": self.matches.iter().map(|m| m.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Match {match_id} not found")]
    NotFound { match_id: String },
    #[error(transparent)]
    Match(#[from] MatchError),
}

impl From<BoardError> for RegistryError {
    fn from(err: BoardError) -> Self {
        Self::Match(MatchError::Board(err))
    }
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Match(err) => err.kind(),
        }
    }
}

/// Match registry - tracks all matches.
#[derive(Debug, Default)]
pub struct MatchRegistry {
    matches: HashMap<String, Match>,

    /// Match IDs in creation order
    order: Vec<String>,

    observers: Observers<MatchesChanged>,

    /// Turn length for new matches; `None` creates untimed matches
    turn_duration_ms: Option<u64>,
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a turn timer of `ms` to every match created from now on.
    pub fn with_turn_timer(mut self, ms: u64) -> Self {
        self.turn_duration_ms = Some(ms);
        self
    }

    /// Create a match with `first_player_id` in seat one.
    pub fn create_match(
        &mut self,
        size: GridSize,
        first_player_id: impl Into<String>,
    ) -> MatchesChanged {
        let change = self.insert_match(size, first_player_id.into());
        self.publish(change)
    }

    #[instrument(skip(self, first_player_id))]
    pub(crate) fn insert_match(&mut self, size: GridSize, first_player_id: String) -> MatchesChanged {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let mut created = Match::new(id.clone(), size, first_player_id);
        if let Some(ms) = self.turn_duration_ms {
            created.attach_timer(TurnTimer::from_millis(ms));
        }
        info!(match_id = %id, size = size.value(), "Match created");

        self.order.push(id.clone());
        self.matches.insert(id.clone(), created);
        self.change_for(&id)
    }

    /// Create a match from a raw side length, rejecting unsupported sizes.
    pub fn create_match_with_size(
        &mut self,
        size: usize,
        first_player_id: impl Into<String>,
    ) -> Result<MatchesChanged, RegistryError> {
        let size = GridSize::try_from(size)?;
        Ok(self.create_match(size, first_player_id))
    }

    fn get_match_mut(&mut self, match_id: &str) -> Result<&mut Match, RegistryError> {
        self.matches
            .get_mut(match_id)
            .ok_or_else(|| RegistryError::NotFound {
                match_id: match_id.to_string(),
            })
    }

    /// Seat a player in a match.
    pub fn add_participant(
        &mut self,
        match_id: &str,
        player_id: impl Into<String>,
    ) -> Result<MatchesChanged, RegistryError> {
        let change = self.seat_participant(match_id, player_id.into())?;
        Ok(self.publish(change))
    }

    #[instrument(skip(self, player_id))]
    pub(crate) fn seat_participant(
        &mut self,
        match_id: &str,
        player_id: String,
    ) -> Result<MatchesChanged, RegistryError> {
        let seat = self
            .get_match_mut(match_id)?
            .add_participant(player_id.clone())?;
        debug!(match_id, player_id = %player_id, seat = seat.index(), "Participant seated");
        Ok(self.change_for(match_id))
    }

    /// Start a match.
    pub fn start_match(&mut self, match_id: &str) -> Result<MatchesChanged, RegistryError> {
        let change = self.begin_match(match_id)?;
        Ok(self.publish(change))
    }

    #[instrument(skip(self))]
    pub(crate) fn begin_match(&mut self, match_id: &str) -> Result<MatchesChanged, RegistryError> {
        self.get_match_mut(match_id)?.start()?;
        Ok(self.change_for(match_id))
    }

    /// Play a move on behalf of `player_id`.
    pub fn apply_move(
        &mut self,
        match_id: &str,
        player_id: &str,
        col: usize,
        row: usize,
    ) -> Result<MatchesChanged, RegistryError> {
        let change = self.play_move(match_id, player_id, col, row)?;
        Ok(self.publish(change))
    }

    #[instrument(skip(self))]
    pub(crate) fn play_move(
        &mut self,
        match_id: &str,
        player_id: &str,
        col: usize,
        row: usize,
    ) -> Result<MatchesChanged, RegistryError> {
        let m = self.get_match_mut(match_id)?;
        m.apply_move(player_id, col, row)?;
        trace!(match_id, "\n{}", m.render());
        Ok(self.change_for(match_id))
    }

    /// Remove a match. Notifies whether or not the match existed.
    pub fn delete_match(&mut self, match_id: &str) -> MatchesChanged {
        let change = self.remove_match(match_id);
        self.publish(change)
    }

    #[instrument(skip(self))]
    pub(crate) fn remove_match(&mut self, match_id: &str) -> MatchesChanged {
        let removed = self.matches.remove(match_id);
        if removed.is_some() {
            self.order.retain(|id| id != match_id);
            info!(match_id, "Match deleted");
        } else {
            debug!(match_id, "Delete of unknown match");
        }

        MatchesChanged {
            changed: removed.as_ref().map(MatchView::of),
            matches: self.list_matches(),
        }
    }

    fn change_for(&self, match_id: &str) -> MatchesChanged {
        MatchesChanged {
            changed: self.matches.get(match_id).map(MatchView::of),
            matches: self.list_matches(),
        }
    }

    fn publish(&mut self, change: MatchesChanged) -> MatchesChanged {
        self.observers.emit(&change);
        change
    }

    /// All matches in creation order.
    pub fn list_matches(&self) -> Vec<MatchView> {
        self.order
            .iter()
            .filter_map(|id| self.matches.get(id))
            .map(MatchView::of)
            .collect()
    }

    /// Get a match.
    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Listen for collection changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MatchesChanged) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Detach the listener list so it can be driven outside this registry.
    pub(crate) fn take_observers(&mut self) -> Observers<MatchesChanged> {
        std::mem::take(&mut self.observers)
    }

    /// Listen to one match's own events.
    pub fn subscribe_match_events<F>(
        &mut self,
        match_id: &str,
        listener: F,
    ) -> Result<SubscriptionId, RegistryError>
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        Ok(self.get_match_mut(match_id)?.subscribe(listener))
    }

    /// Poll every match timer, returning the expiries raised.
    pub fn poll_timers(&mut self, now: DateTime<Utc>) -> Vec<(String, MatchEvent)> {
        let mut expired = Vec::new();
        for id in &self.order {
            if let Some(event) = self.matches.get_mut(id).and_then(|m| m.poll_timer(now)) {
                expired.push((id.clone(), event));
            }
        }
        expired
    }
}
