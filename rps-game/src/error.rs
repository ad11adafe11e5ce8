use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// Broad failure classes. Callers decide whether to resubmit from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; resubmit with corrected values
    Validation,
    /// Game or player state rejects the transition
    Precondition,
    /// Reveal does not open the stored commitment
    Integrity,
    /// A payout could not be applied; the game is retried next round
    Settlement,
    Internal,
}

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Entry fee must be positive")]
    InvalidStake,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid move '{0}': expected rock, paper or scissors")]
    InvalidMove(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Game not found: {0}")]
    GameNotFound(u64),

    #[error("Commit window closed for game {0}")]
    CommitWindowClosed(u64),

    #[error("Player already committed to game {0}")]
    AlreadyCommitted(u64),

    #[error("Game {0} is full")]
    GameFull(u64),

    #[error("Reveal window closed for game {0}")]
    RevealWindowClosed(u64),

    #[error("Player has no commitment in game {0}")]
    NotACommittedPlayer(u64),

    #[error("Game {0} is waiting for a second player")]
    GameNotFull(u64),

    #[error("Move already revealed in game {0}")]
    AlreadyRevealed(u64),

    #[error("Move doesn't match commitment in game {0}")]
    CommitmentMismatch(u64),

    #[error("Unauthorized: expected authority {expected}, got {got}")]
    Unauthorized { expected: String, got: String },

    #[error("Insufficient funds: need {need} sats, have {available} sats")]
    InsufficientFunds { need: u64, available: u64 },

    #[error("Settlement of game {game_id} failed")]
    Settlement {
        game_id: u64,
        #[source]
        source: rps_core::CoreError,
    },

    #[error("Amount overflow: {0}")]
    Overflow(String),

    #[error("Invalid genesis state: {0}")]
    InvalidGenesis(String),

    #[error("Core error: {0}")]
    Core(rps_core::CoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidStake
            | Self::InvalidAddress(_)
            | Self::InvalidMove(_)
            | Self::InvalidParams(_) => ErrorKind::Validation,
            Self::GameNotFound(_)
            | Self::CommitWindowClosed(_)
            | Self::AlreadyCommitted(_)
            | Self::GameFull(_)
            | Self::RevealWindowClosed(_)
            | Self::NotACommittedPlayer(_)
            | Self::GameNotFull(_)
            | Self::AlreadyRevealed(_)
            | Self::Unauthorized { .. }
            | Self::InsufficientFunds { .. } => ErrorKind::Precondition,
            Self::CommitmentMismatch(_) => ErrorKind::Integrity,
            Self::Settlement { .. } => ErrorKind::Settlement,
            Self::Overflow(_) | Self::InvalidGenesis(_) | Self::Core(_) | Self::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// True when a reveal tried to open a commitment to a different move.
    pub fn is_cheating(&self) -> bool {
        matches!(self, Self::CommitmentMismatch(_))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }

    pub fn invalid_genesis(msg: impl Into<String>) -> Self {
        Self::InvalidGenesis(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }
}

impl From<rps_core::CoreError> for GameError {
    fn from(err: rps_core::CoreError) -> Self {
        match err {
            rps_core::CoreError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            rps_core::CoreError::InsufficientFunds {
                need, available, ..
            } => Self::InsufficientFunds { need, available },
            rps_core::CoreError::Overflow(msg) => Self::Overflow(msg),
            other => Self::Core(other),
        }
    }
}
