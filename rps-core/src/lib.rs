//! Ledger host primitives for the rock-paper-scissors module
//!
//! Everything the game engine treats as an external collaborator lives here:
//! opaque account addresses and their bech32 text form, the staking pool bank,
//! the block clock, and SQLite persistence for a single-node ledger.

pub mod address;
pub mod bank;
pub mod chain;
pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use address::{AddressCodec, Bech32Codec};
pub use bank::{Accounts, Bank};
pub use chain::{BlockContext, Chain};
pub use config::LedgerConfig;
pub use error::{CoreError, Result};
pub use storage::Storage;
pub use types::{Address, Payout};

pub use ::bitcoin::Amount;
