use crate::config::CliConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rps_core::storage::{AccountStore, StateStore};
use rps_core::{Accounts, Address, AddressCodec, Amount, Bech32Codec, BlockContext, Chain, Storage};
use rps_game::{GameConfig, GenesisState, Keeper, SweepReport, MODULE_NAME};
use std::path::Path;

pub const DB_FILE: &str = "rps.db";

/// Single-node ledger: the block clock, balances and the game keeper,
/// persisted to SQLite after every block.
pub struct Node {
    storage: Storage,
    chain: Chain,
    accounts: Accounts,
    keeper: Keeper<Bech32Codec>,
}

/// Result of delivering one block
#[derive(Debug)]
pub struct Block<T> {
    pub context: BlockContext,
    pub output: T,
    /// End-of-block sweep. A failure here does not undo the transaction.
    pub settlement: rps_game::Result<SweepReport>,
}

impl<T> Block<T> {
    /// The sweep report, or the settlement failure tagged with the block height.
    pub fn into_report(self) -> Result<SweepReport> {
        let height = self.context.height;
        self.settlement.with_context(|| format!("settling block {}", height))
    }
}

/// How the pool compared with the stakes of an imported snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolAdjustment {
    Matched,
    /// Minted into the pool to back the imported stakes
    Minted(Amount),
    /// Left in the pool with no game staking it
    Surplus(Amount),
}

impl Node {
    pub async fn open(data_dir: &Path, config: &CliConfig) -> Result<Self> {
        let storage = Storage::new(&data_dir.join(DB_FILE)).await?;

        let chain = StateStore::new(&storage)
            .load_chain()
            .await?
            .unwrap_or_else(|| Chain::genesis(DateTime::<Utc>::UNIX_EPOCH));

        let accounts = AccountStore::new(&storage)
            .load_accounts(&config.ledger.module_account)
            .await?;

        let mut keeper = Keeper::new(
            config.ledger.codec()?,
            config.ledger.authority_address()?,
            &config.game,
        )?;

        let state: Option<GenesisState> = StateStore::new(&storage)
            .load_module_state(MODULE_NAME)
            .await?;
        if let Some(state) = state {
            keeper
                .init_genesis(state)
                .context("loading persisted game state")?;
        }

        tracing::debug!(
            "Opened ledger at height {} with {} open games",
            chain.height(),
            keeper.store().len()
        );

        Ok(Self {
            storage,
            chain,
            accounts,
            keeper,
        })
    }

    pub fn keeper(&self) -> &Keeper<Bech32Codec> {
        &self.keeper
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn codec(&self) -> &Bech32Codec {
        self.keeper.codec()
    }

    pub fn address(&self, text: &str) -> Result<Address> {
        Ok(self.codec().string_to_bytes(text)?)
    }

    pub fn balance(&self, text: &str) -> Result<Amount> {
        Ok(self.accounts.balance(&self.address(text)?))
    }

    /// Faucet credit outside of any block.
    pub async fn fund(&mut self, text: &str, amount: Amount) -> Result<Amount> {
        let address = self.address(text)?;
        let balance = self.accounts.mint(&address, amount)?;
        AccountStore::new(&self.storage)
            .save_accounts(&self.accounts)
            .await?;
        Ok(balance)
    }

    /// Run one block at `time`: the transaction, then the sweep, then a single
    /// storage commit.
    ///
    /// A rejected transaction leaves the ledger untouched. A failed sweep is
    /// still persisted, since the transaction and any games settled before the
    /// failure already moved funds, and the block is returned with the error
    /// in `settlement`.
    pub async fn deliver<T, F>(&mut self, time: DateTime<Utc>, tx: F) -> Result<Block<T>>
    where
        F: FnOnce(&mut Keeper<Bech32Codec>, &BlockContext, &mut Accounts) -> rps_game::Result<T>,
    {
        let mut chain = self.chain.clone();
        let context = chain.next_block(time)?;

        let output = tx(&mut self.keeper, &context, &mut self.accounts)?;
        self.chain = chain;

        let settlement = self.keeper.end_round(&context, &mut self.accounts);
        self.persist().await?;

        Ok(Block {
            context,
            output,
            settlement,
        })
    }

    /// Replace the module state with an imported snapshot.
    ///
    /// Stakes the imported games hold are minted into the pool when the pool
    /// cannot cover them. Pool funds beyond those stakes are kept and reported.
    pub async fn import(&mut self, state: GenesisState) -> Result<PoolAdjustment> {
        let mut keeper = Keeper::new(
            self.keeper.codec().clone(),
            self.keeper.authority(),
            &GameConfig {
                params: state.params,
                settlement: self.keeper.policy(),
            },
        )?;
        keeper.init_genesis(state)?;

        let stakes = keeper.outstanding_stakes()?;
        let pool = self.accounts.pool_balance();
        let adjustment = if pool < stakes {
            let shortfall = stakes - pool;
            tracing::warn!(
                "Pool holds {} sats but imported games stake {} sats, minting {} sats",
                pool.to_sat(),
                stakes.to_sat(),
                shortfall.to_sat()
            );
            self.accounts.mint_pool(shortfall)?;
            PoolAdjustment::Minted(shortfall)
        } else if pool > stakes {
            let surplus = pool - stakes;
            tracing::warn!(
                "Pool holds {} sats but imported games stake {} sats, {} sats have no game",
                pool.to_sat(),
                stakes.to_sat(),
                surplus.to_sat()
            );
            PoolAdjustment::Surplus(surplus)
        } else {
            PoolAdjustment::Matched
        };

        self.keeper = keeper;
        self.persist().await?;
        Ok(adjustment)
    }

    async fn persist(&self) -> Result<()> {
        let state = self.keeper.export_genesis()?;
        self.storage
            .commit_snapshot(&self.chain, &self.accounts, MODULE_NAME, &state)
            .await?;
        Ok(())
    }
}
