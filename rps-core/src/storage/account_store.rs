use crate::bank::Accounts;
use crate::error::Result;
use crate::storage::Storage;
use crate::types::Address;
use bitcoin::Amount;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

pub struct AccountStore<'a> {
    storage: &'a Storage,
}

impl<'a> AccountStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save_accounts(&self, accounts: &Accounts) -> Result<()> {
        let conn = self.storage.get_connection().await;
        write_accounts(&conn, accounts)
    }

    /// Load every player balance plus the pool of `module`.
    pub async fn load_accounts(&self, module: &str) -> Result<Accounts> {
        let conn = self.storage.get_connection().await;

        let pool: Option<i64> = conn
            .query_row(
                "SELECT balance FROM module_accounts WHERE name = ?1",
                params![module],
                |row| row.get(0),
            )
            .optional()?;

        let mut stmt = conn.prepare("SELECT address, balance FROM accounts ORDER BY address")?;
        let rows = stmt.query_map([], |row| {
            let address: String = row.get(0)?;
            let balance: i64 = row.get(1)?;
            Ok((address, balance))
        })?;

        let mut balances = BTreeMap::new();
        for row in rows {
            let (address, balance) = row?;
            balances.insert(Address::from_hex(&address)?, Amount::from_sat(balance as u64));
        }

        Ok(Accounts::from_parts(
            module.to_string(),
            Amount::from_sat(pool.unwrap_or(0) as u64),
            balances,
        ))
    }
}

pub(crate) fn write_accounts(conn: &Connection, accounts: &Accounts) -> Result<()> {
    let now = Utc::now().timestamp();

    conn.execute(
        "INSERT OR REPLACE INTO module_accounts (name, balance, updated_at)
         VALUES (?1, ?2, ?3)",
        params![
            accounts.module(),
            accounts.pool_balance().to_sat() as i64,
            now
        ],
    )?;

    let mut stmt = conn.prepare(
        "INSERT OR REPLACE INTO accounts (address, balance, updated_at)
         VALUES (?1, ?2, ?3)",
    )?;
    for (address, balance) in accounts.balances() {
        stmt.execute(params![address.to_hex(), balance.to_sat() as i64, now])?;
    }

    Ok(())
}
