pub mod account_store;
pub mod state_store;

pub use account_store::AccountStore;
pub use state_store::StateStore;

use crate::bank::Accounts;
use crate::chain::Chain;
use crate::error::{CoreError, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use tokio::sync::Mutex;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::internal(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        // Single-row block clock
        conn.execute(
            "CREATE TABLE IF NOT EXISTS chain (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                height INTEGER NOT NULL,
                block_time INTEGER NOT NULL
            )",
            [],
        )?;

        // Player balances
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                address TEXT PRIMARY KEY,
                balance INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        // Module-owned pools
        conn.execute(
            "CREATE TABLE IF NOT EXISTS module_accounts (
                name TEXT PRIMARY KEY,
                balance INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        // Module state exported as genesis JSON
        conn.execute(
            "CREATE TABLE IF NOT EXISTS module_state (
                module TEXT PRIMARY KEY,
                state TEXT NOT NULL,
                height INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }

    /// Persist the clock, balances and one module's state in a single transaction.
    pub async fn commit_snapshot<T: Serialize>(
        &self,
        chain: &Chain,
        accounts: &Accounts,
        module: &str,
        state: &T,
    ) -> Result<()> {
        let state_json = serde_json::to_string(state)?;

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        state_store::write_chain(&tx, chain)?;
        account_store::write_accounts(&tx, accounts)?;
        state_store::write_module_state(&tx, module, chain.height(), &state_json)?;

        tx.commit()?;

        tracing::debug!(
            "Committed snapshot for '{}' at height {}",
            module,
            chain.height()
        );
        Ok(())
    }
}
