use serde::{Deserialize, Serialize};
use std::fmt;

/// Trait for commitment schemes
pub trait CommitmentScheme {
    /// Data disclosed at reveal time
    type Opening: ?Sized;

    fn commit(opening: &Self::Opening) -> Commitment;

    fn verify(commitment: &Commitment, opening: &Self::Opening) -> bool {
        Self::commit(opening) == *commitment
    }
}

/// Opaque commitment as submitted by a player.
///
/// Stored verbatim; comparison is exact string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commitment(String);

impl Commitment {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Commitment {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Commitment {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
