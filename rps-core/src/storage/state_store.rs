use crate::chain::Chain;
use crate::error::{CoreError, Result};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;

pub struct StateStore<'a> {
    storage: &'a Storage,
}

impl<'a> StateStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn load_chain(&self) -> Result<Option<Chain>> {
        let conn = self.storage.get_connection().await;

        let row: Option<(i64, i64)> = conn
            .query_row(
                "SELECT height, block_time FROM chain WHERE id = 0",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((height, block_time)) = row else {
            return Ok(None);
        };

        let time = DateTime::<Utc>::from_timestamp_millis(block_time)
            .ok_or_else(|| CoreError::internal(format!("invalid block time {}", block_time)))?;

        Ok(Some(Chain::restore(height as u64, time)))
    }

    pub async fn load_module_state<T: DeserializeOwned>(&self, module: &str) -> Result<Option<T>> {
        let conn = self.storage.get_connection().await;

        let state_json: Option<String> = conn
            .query_row(
                "SELECT state FROM module_state WHERE module = ?1",
                params![module],
                |row| row.get(0),
            )
            .optional()?;

        match state_json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

pub(crate) fn write_chain(conn: &Connection, chain: &Chain) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO chain (id, height, block_time) VALUES (0, ?1, ?2)",
        params![chain.height() as i64, chain.time().timestamp_millis()],
    )?;
    Ok(())
}

pub(crate) fn write_module_state(
    conn: &Connection,
    module: &str,
    height: u64,
    state_json: &str,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO module_state (module, state, height, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![module, state_json, height as i64, Utc::now().timestamp()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Accounts;
    use chrono::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_chain_round_trip() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("rps.db")).await.unwrap();
        let store = StateStore::new(&storage);

        assert!(store.load_chain().await.unwrap().is_none());

        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut chain = Chain::genesis(t0);
        chain.next_block(t0 + Duration::milliseconds(1_500)).unwrap();
        chain.next_block(t0 + Duration::seconds(4)).unwrap();
        storage
            .commit_snapshot(&chain, &Accounts::new("rps"), "rps", &())
            .await
            .unwrap();

        let loaded = store.load_chain().await.unwrap().unwrap();
        assert_eq!(loaded.height(), 2);
        assert_eq!(loaded.time(), t0 + Duration::seconds(4));
    }

    #[tokio::test]
    async fn test_module_state_is_replaced() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::new(&temp_dir.path().join("rps.db")).await.unwrap();
        let store = StateStore::new(&storage);

        let state: Option<Vec<u64>> = store.load_module_state("rps").await.unwrap();
        assert!(state.is_none());

        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut chain = Chain::genesis(t0);
        let accounts = Accounts::new("rps");
        storage
            .commit_snapshot(&chain, &accounts, "rps", &vec![1u64, 2, 3])
            .await
            .unwrap();
        chain.next_block(t0 + Duration::seconds(1)).unwrap();
        storage
            .commit_snapshot(&chain, &accounts, "rps", &vec![9u64])
            .await
            .unwrap();

        let state: Option<Vec<u64>> = store.load_module_state("rps").await.unwrap();
        assert_eq!(state, Some(vec![9]));

        let other: Option<Vec<u64>> = store.load_module_state("gov").await.unwrap();
        assert!(other.is_none());
    }
}
