//! Commit-reveal rock-paper-scissors for a deterministic ledger
//!
//! Players stake an entry fee and commit to `sha256("<move>:<salt>")`. Once both
//! seats are taken they reveal, and the end-of-round sweep pays the winner out of
//! the module pool. Timeouts refund lone creators and award the prize to the only
//! player who revealed.

pub mod commitment;
pub mod error;
pub mod genesis;
pub mod keeper;
pub mod lifecycle;
pub mod moves;
pub mod params;
pub mod settlement;
pub mod state;
pub mod store;

pub use commitment::{generate_salt, Commitment, CommitmentScheme, Sha256MoveScheme};
pub use error::{ErrorKind, GameError, Result};
pub use genesis::{CommitRecord, GenesisState, RevealRecord};
pub use keeper::Keeper;
pub use moves::{decide, Move, Outcome};
pub use params::{GameConfig, Params, SettlementPolicy};
pub use settlement::{sweep, Resolution, Settlement, SweepReport};
pub use state::{Game, GamePhase, MoveCommit, MoveReveal, MAX_PLAYERS};
pub use store::GameStore;

/// Name of the module account that holds staked entry fees
pub const MODULE_NAME: &str = "rps";
