use crate::{GameError, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Module parameters, windows in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub commit_window: u64,
    pub reveal_window: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            commit_window: 60,
            reveal_window: 60,
        }
    }
}

impl Params {
    pub fn new(commit_window: u64, reveal_window: u64) -> Self {
        Self {
            commit_window,
            reveal_window,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.commit_window == 0 {
            return Err(GameError::invalid_params("commit window must be positive"));
        }

        if self.reveal_window == 0 {
            return Err(GameError::invalid_params("reveal window must be positive"));
        }

        // chrono durations are bounded by i64 milliseconds
        for (name, secs) in [
            ("commit", self.commit_window),
            ("reveal", self.reveal_window),
        ] {
            if i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .is_none()
            {
                return Err(GameError::invalid_params(format!(
                    "{} window of {} seconds is out of range",
                    name, secs
                )));
            }
        }

        Ok(())
    }

    pub fn commit_duration(&self) -> Result<Duration> {
        to_duration(self.commit_window)
    }

    pub fn reveal_duration(&self) -> Result<Duration> {
        to_duration(self.reveal_window)
    }
}

fn to_duration(secs: u64) -> Result<Duration> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| GameError::overflow(format!("window of {} seconds", secs)))
}

/// What the sweep does after a game's payout is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementPolicy {
    /// Stop the sweep at the failing game
    #[default]
    FailFast,
    /// Defer the failing game and keep settling the rest
    Continue,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Params installed at genesis
    pub params: Params,
    pub settlement: SettlementPolicy,
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        self.params.validate()
    }
}
