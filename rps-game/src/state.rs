use crate::commitment::Commitment;
use crate::moves::Move;
use bitcoin::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of players in a game
pub const MAX_PLAYERS: usize = 2;

/// Open game awaiting commits, reveals or settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub entry_fee: Amount,
    pub commit_deadline: DateTime<Utc>,
    /// Unset until the first reveal
    pub reveal_deadline: Option<DateTime<Utc>>,
}

impl Game {
    /// Amount paid out when both stakes go to one player.
    pub fn prize(&self) -> Option<Amount> {
        self.entry_fee.checked_mul(MAX_PLAYERS as u64)
    }

    pub fn commit_window_closed(&self, now: DateTime<Utc>) -> bool {
        now > self.commit_deadline
    }

    pub fn reveal_window_closed(&self, now: DateTime<Utc>) -> bool {
        self.reveal_deadline.is_some_and(|deadline| now > deadline)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommit {
    pub commitment: Commitment,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReveal {
    #[serde(rename = "move")]
    pub mv: Move,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle position derived from the stored records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a second commit
    Open,
    /// Both committed, nobody revealed
    Committed,
    /// At least one reveal recorded
    Revealing,
}

impl GamePhase {
    pub fn from_counts(commits: usize, reveals: usize) -> Self {
        if commits < MAX_PLAYERS {
            GamePhase::Open
        } else if reveals == 0 {
            GamePhase::Committed
        } else {
            GamePhase::Revealing
        }
    }
}
