//! Player identity registry.
//!
//! Players are created on request with a generated id and display name, can
//! be renamed, and are never removed while the process runs.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, instrument};

use super::error::ErrorKind;
use super::names::generate_name;
use super::notify::{Observers, SubscriptionId};

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Generated unique ID
    pub id: String,

    /// Display name
    pub username: String,

    /// When player registered
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Player {
    pub fn new(id: String, username: String) -> Self {
        Self {
            id,
            username,
            created_at: chrono::Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "username": self.username
        })
    }
}

/// Emitted after every successful player mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayersChanged {
    /// The player that was created or renamed
    pub player: Player,
    /// Every registered player, in registration order
    pub players: Vec<Player>,
}

impl PlayersChanged {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "user": self.player.to_json(),
            "users": self.players.iter().map(|p| p.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Player errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("Player {player_id} not found")]
    NotFound { player_id: String },
}

impl PlayerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }
}

/// Player registry - tracks every registered player.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<String, Player>,

    /// Player IDs in registration order
    order: Vec<String>,

    observers: Observers<PlayersChanged>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player with a generated id and name.
    pub fn register_player(&mut self) -> PlayersChanged {
        let change = self.insert_player();
        self.publish(change)
    }

    #[instrument(skip(self))]
    pub(crate) fn insert_player(&mut self) -> PlayersChanged {
        let player = Player::new(uuid::Uuid::new_v4().simple().to_string(), generate_name());
        info!(player_id = %player.id, username = %player.username, "Player registered");

        self.order.push(player.id.clone());
        self.players.insert(player.id.clone(), player.clone());

        self.change_for(player)
    }

    /// Change a player's display name.
    pub fn rename_player(
        &mut self,
        player_id: &str,
        new_name: impl Into<String>,
    ) -> Result<PlayersChanged, PlayerError> {
        let change = self.set_username(player_id, new_name.into())?;
        Ok(self.publish(change))
    }

    #[instrument(skip(self, new_name))]
    pub(crate) fn set_username(
        &mut self,
        player_id: &str,
        new_name: String,
    ) -> Result<PlayersChanged, PlayerError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or_else(|| PlayerError::NotFound {
                player_id: player_id.to_string(),
            })?;

        player.username = new_name;
        debug!(player_id, username = %player.username, "Player renamed");

        let player = player.clone();
        Ok(self.change_for(player))
    }

    fn change_for(&self, player: Player) -> PlayersChanged {
        PlayersChanged {
            player,
            players: self.list_players(),
        }
    }

    fn publish(&mut self, change: PlayersChanged) -> PlayersChanged {
        self.observers.emit(&change);
        change
    }

    /// All players in registration order.
    pub fn list_players(&self) -> Vec<Player> {
        self.order
            .iter()
            .filter_map(|id| self.players.get(id))
            .cloned()
            .collect()
    }

    /// Get a player.
    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    /// Check if player is registered.
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Listen for player changes.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayersChanged) + Send + 'static,
    {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Detach the listener list so it can be driven outside this registry.
    pub(crate) fn take_observers(&mut self) -> Observers<PlayersChanged> {
        std::mem::take(&mut self.observers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_register() {
        let mut registry = PlayerRegistry::new();

        let first = registry.register_player();
        assert_eq!(first.players.len(), 1);
        assert!(!first.player.id.is_empty());
        assert!(!first.player.username.is_empty());

        let second = registry.register_player();
        assert_eq!(second.players.len(), 2);
        assert_ne!(first.player.id, second.player.id);
        assert!(registry.contains(&second.player.id));
    }

    #[test]
    fn test_listing_keeps_registration_order() {
        let mut registry = PlayerRegistry::new();
        let ids: Vec<String> = (0..5).map(|_| registry.register_player().player.id).collect();

        let listed: Vec<String> = registry.list_players().into_iter().map(|p| p.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_rename() {
        let mut registry = PlayerRegistry::new();
        let id = registry.register_player().player.id;

        let change = registry.rename_player(&id, "Alice").unwrap();
        assert_eq!(change.player.username, "Alice");
        assert_eq!(change.players[0].username, "Alice");
        assert_eq!(registry.get(&id).unwrap().username, "Alice");
    }

    #[test]
    fn test_rename_unknown() {
        let mut registry = PlayerRegistry::new();
        let err = registry.rename_player("missing", "Bob").unwrap_err();
        assert_eq!(
            err,
            PlayerError::NotFound {
                player_id: "missing".to_string()
            }
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_notifications() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = PlayerRegistry::new();
        let sink = Arc::clone(&seen);
        registry.subscribe(move |c: &PlayersChanged| sink.lock().unwrap().push(c.players.len()));

        let id = registry.register_player().player.id;
        registry.register_player();
        registry.rename_player(&id, "Carol").unwrap();
        let _ = registry.rename_player("missing", "Dave");

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2]);
    }

    #[test]
    fn test_to_json() {
        let mut registry = PlayerRegistry::new();
        let change = registry.register_player();
        let json = change.to_json();
        assert_eq!(json["user"]["id"], change.player.id.as_str());
        assert_eq!(json["users"].as_array().unwrap().len(), 1);
    }
}
