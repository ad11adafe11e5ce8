use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header of the block an operation executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub height: u64,
    pub time: DateTime<Utc>,
}

impl BlockContext {
    pub fn new(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }
}

/// Block clock. Heights increase by one and time never goes backwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    height: u64,
    time: DateTime<Utc>,
}

impl Chain {
    pub fn genesis(time: DateTime<Utc>) -> Self {
        Self { height: 0, time }
    }

    /// Resume a clock persisted at `height`.
    pub fn restore(height: u64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn current(&self) -> BlockContext {
        BlockContext::new(self.height, self.time)
    }

    /// Open the next block at `time`.
    pub fn next_block(&mut self, time: DateTime<Utc>) -> Result<BlockContext> {
        if time < self.time {
            return Err(CoreError::NonMonotonicTime {
                current: self.time,
                requested: time,
            });
        }

        self.height += 1;
        self.time = time;

        tracing::debug!("Opened block {} at {}", self.height, self.time);
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_blocks_advance_monotonically() {
        let t0 = DateTime::from_timestamp(1_000, 0).unwrap();
        let mut chain = Chain::genesis(t0);

        let b1 = chain.next_block(t0).unwrap();
        assert_eq!(b1.height, 1);
        assert_eq!(b1.time, t0);

        let b2 = chain.next_block(t0 + Duration::seconds(5)).unwrap();
        assert_eq!(b2.height, 2);

        let err = chain.next_block(t0).unwrap_err();
        assert!(matches!(err, CoreError::NonMonotonicTime { .. }));
        assert_eq!(chain.height(), 2);
    }
}
