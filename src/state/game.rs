//! Match state machine.
//!
//! ```text
//! NotStarted ──start()──▶ Ongoing ──winning move / full board──▶ Complete
//! ```
//!
//! A match is created with one seated participant, takes a second through
//! `add_participant`, and only becomes playable after an explicit `start`.
//! Seat one always moves first. `Complete` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::board::{Board, BoardError, Cell, Coord, Grid, GridSize};
use super::error::ErrorKind;
use super::notify::{Observers, SubscriptionId};
use super::timer::TurnTimer;

/// Seats per match.
pub const MAX_PARTICIPANTS: usize = 2;

/// One of the two participant slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// Moves first, places `MarkA`
    One,
    /// Places `MarkB`
    Two,
}

impl Seat {
    /// Position in the participant list.
    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }

    pub fn mark(&self) -> Cell {
        match self {
            Self::One => Cell::MarkA,
            Self::Two => Cell::MarkB,
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

/// Match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Waiting for players / explicit start
    #[default]
    NotStarted,
    /// Moves are being accepted
    Ongoing,
    /// Won or drawn
    Complete,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Ongoing => "ongoing",
            Self::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Events emitted by a match, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    Started {
        first: Seat,
    },
    TurnExecuted {
        seat: Seat,
        at: Coord,
        /// Seat to move next, `None` once the match is over
        next_turn: Option<Seat>,
    },
    GameComplete {
        /// `None` on a draw
        winner: Option<Seat>,
    },
    /// Raised by an attached [`TurnTimer`]; no state change
    TimeExpired {
        seat: Seat,
    },
}

/// Match errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Match already has two participants")]
    MatchFull,
    #[error("Player {player_id} is already seated in this match")]
    AlreadySeated { player_id: String },
    #[error("Match needs two participants to start, has {seated}")]
    InsufficientPlayers { seated: usize },
    #[error("Match has already started")]
    AlreadyStarted,
    #[error("Match is already complete")]
    AlreadyComplete,
    #[error("It is not player {player_id}'s turn")]
    NotPlayersTurn { player_id: String },
    #[error("Cell ({col}, {row}) is already occupied")]
    CellOccupied { col: usize, row: usize },
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Board(err) => err.kind(),
            _ => ErrorKind::StateConflict,
        }
    }
}

/// Read-only view of a match's game data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSnapshot {
    pub grid: Grid,
    pub size: GridSize,
    pub status: MatchStatus,
    pub turn: Option<Seat>,
    pub winner: Option<Seat>,
}

impl MatchSnapshot {
    pub fn to_json(&self) -> serde_json::Value {
        let grid: Vec<Vec<u8>> = self
            .grid
            .iter()
            .map(|column| column.iter().map(|c| c.as_u8()).collect())
            .collect();

        serde_json::json!({
            "grid": grid,
            "grid_size": self.size.value(),
            "status": self.status.as_str(),
            "turn": self.turn.map(|s| s.index()),
            "winner": self.winner.map(|s| s.index())
        })
    }
}

/// A single game instance.
#[derive(Debug)]
pub struct Match {
    /// Unique match ID
    pub id: String,

    board: Board,

    status: MatchStatus,

    /// Seat holding the turn; `None` unless ongoing
    turn: Option<Seat>,

    winner: Option<Seat>,

    /// Player ids in seat order
    participants: Vec<String>,

    /// Optional countdown fed by this match's events
    timer: Option<TurnTimer>,

    events: Observers<MatchEvent>,

    /// When match was created
    pub created_at: DateTime<Utc>,

    /// When match started (status -> Ongoing)
    pub started_at: Option<DateTime<Utc>>,

    /// When match completed
    pub ended_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Create a match with its first participant seated.
    pub fn new(id: String, size: GridSize, first_participant: String) -> Self {
        Self {
            id,
            board: Board::new(size),
            status: MatchStatus::NotStarted,
            turn: None,
            winner: None,
            participants: vec![first_participant],
            timer: None,
            events: Observers::new(),
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Attach a turn timer.
    pub fn with_timer(mut self, timer: TurnTimer) -> Self {
        self.timer = Some(timer);
        self
    }

    pub fn attach_timer(&mut self, timer: TurnTimer) {
        self.timer = Some(timer);
    }

    pub fn timer(&self) -> Option<&TurnTimer> {
        self.timer.as_ref()
    }

    pub fn size(&self) -> GridSize {
        self.board.size()
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn turn(&self) -> Option<Seat> {
        self.turn
    }

    pub fn winner(&self) -> Option<Seat> {
        self.winner
    }

    pub fn is_not_started(&self) -> bool {
        self.status == MatchStatus::NotStarted
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == MatchStatus::Ongoing
    }

    pub fn is_complete(&self) -> bool {
        self.status == MatchStatus::Complete
    }

    /// Player ids in seat order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Seat held by a player, if seated.
    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        self.participants
            .iter()
            .position(|p| p == player_id)
            .and_then(Seat::from_index)
    }

    /// Seat a second participant.
    pub fn add_participant(&mut self, player_id: String) -> Result<Seat, MatchError> {
        if self.participants.len() >= MAX_PARTICIPANTS {
            return Err(MatchError::MatchFull);
        }

        if self.participants.contains(&player_id) {
            return Err(MatchError::AlreadySeated { player_id });
        }

        self.participants.push(player_id);
        Seat::from_index(self.participants.len() - 1).ok_or(MatchError::MatchFull)
    }

    /// Start the match. Seat one takes the first turn.
    pub fn start(&mut self) -> Result<(), MatchError> {
        match self.status {
            MatchStatus::Ongoing => return Err(MatchError::AlreadyStarted),
            MatchStatus::Complete => return Err(MatchError::AlreadyComplete),
            MatchStatus::NotStarted => {}
        }

        if self.participants.len() != MAX_PARTICIPANTS {
            return Err(MatchError::InsufficientPlayers {
                seated: self.participants.len(),
            });
        }

        let now = Utc::now();
        self.status = MatchStatus::Ongoing;
        self.turn = Some(Seat::One);
        self.started_at = Some(now);
        info!(match_id = %self.id, "Match started");

        self.dispatch(MatchEvent::Started { first: Seat::One }, now);
        Ok(())
    }

    /// Place the mover's mark at `(col, row)`.
    ///
    /// All checks run before the board is touched, so a failed move leaves
    /// the match unchanged. Returns the events emitted by this move.
    pub fn apply_move(
        &mut self,
        player_id: &str,
        col: usize,
        row: usize,
    ) -> Result<Vec<MatchEvent>, MatchError> {
        if self.is_complete() {
            return Err(MatchError::AlreadyComplete);
        }

        let seat = match (self.turn, self.seat_of(player_id)) {
            (Some(turn), Some(seat)) if self.is_ongoing() && turn == seat => seat,
            _ => {
                return Err(MatchError::NotPlayersTurn {
                    player_id: player_id.to_string(),
                })
            }
        };

        if !self.board.get(col, row)?.is_empty() {
            return Err(MatchError::CellOccupied { col, row });
        }

        self.board.set(col, row, seat.mark())?;

        let now = Utc::now();
        if self.board.coordinate_is_winning(col, row)? {
            self.winner = Some(seat);
            self.complete(now);
        } else if self.board.is_full() {
            self.complete(now);
        } else {
            self.turn = Some(seat.other());
        }

        debug!(
            match_id = %self.id,
            player_id,
            col,
            row,
            status = self.status.as_str(),
            "Move applied"
        );

        let mut emitted = vec![MatchEvent::TurnExecuted {
            seat,
            at: Coord::new(col, row),
            next_turn: self.turn,
        }];
        if self.is_complete() {
            emitted.push(MatchEvent::GameComplete {
                winner: self.winner,
            });
        }

        for event in &emitted {
            self.dispatch(event.clone(), now);
        }

        Ok(emitted)
    }

    fn complete(&mut self, now: DateTime<Utc>) {
        self.status = MatchStatus::Complete;
        self.turn = None;
        self.ended_at = Some(now);
        info!(
            match_id = %self.id,
            winner = ?self.winner,
            "Match complete"
        );
    }

    fn dispatch(&mut self, event: MatchEvent, now: DateTime<Utc>) {
        if let Some(timer) = self.timer.as_mut() {
            timer.observe(&event, now);
        }
        self.events.emit(&event);
    }

    /// Check the attached timer, emitting `TimeExpired` if it ran out.
    pub fn poll_timer(&mut self, now: DateTime<Utc>) -> Option<MatchEvent> {
        let seat = self.timer.as_mut()?.poll(now)?;
        let event = MatchEvent::TimeExpired { seat };
        debug!(match_id = %self.id, seat = seat.index(), "Turn timer expired");
        self.events.emit(&event);
        Some(event)
    }

    /// Listen to this match's events.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&MatchEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Immutable copy of the game data.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            grid: self.board.grid(),
            size: self.board.size(),
            status: self.status,
            turn: self.turn,
            winner: self.winner,
        }
    }

    /// ASCII rendering of the board.
    pub fn render(&self) -> String {
        self.board.render()
    }
}
