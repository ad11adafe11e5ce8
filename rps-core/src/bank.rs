use crate::error::{CoreError, Result};
use crate::types::{Address, Payout};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fund movements between player accounts and a module-owned pool.
///
/// Both methods are all-or-nothing: on error no balance has changed.
pub trait Bank {
    /// Move `amount` from `from` into the pool.
    fn send_to_pool(&mut self, from: &Address, amount: Amount) -> Result<()>;

    /// Pay every entry of `payouts` out of the pool as one unit.
    fn send_from_pool(&mut self, payouts: &[Payout]) -> Result<()>;
}

/// In-memory account balances plus the module pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accounts {
    module: String,
    pool: Amount,
    balances: BTreeMap<Address, Amount>,
}

impl Accounts {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            pool: Amount::ZERO,
            balances: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(
        module: String,
        pool: Amount,
        balances: BTreeMap<Address, Amount>,
    ) -> Self {
        Self {
            module,
            pool,
            balances,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn pool_balance(&self) -> Amount {
        self.pool
    }

    pub fn balance(&self, address: &Address) -> Amount {
        self.balances.get(address).copied().unwrap_or(Amount::ZERO)
    }

    pub fn balances(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Credit new funds to an account. Used by faucets and genesis.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<Amount> {
        let updated = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| CoreError::overflow(format!("minting {} sats to {}", amount.to_sat(), to)))?;
        self.balances.insert(to.clone(), updated);

        tracing::debug!("Minted {} sats to {}", amount.to_sat(), to);
        Ok(updated)
    }

    /// Credit new funds straight to the pool, for stakes carried in by imported state.
    pub fn mint_pool(&mut self, amount: Amount) -> Result<Amount> {
        self.pool = self
            .pool
            .checked_add(amount)
            .ok_or_else(|| CoreError::overflow("module pool balance"))?;

        tracing::debug!("Minted {} sats to {} pool", amount.to_sat(), self.module);
        Ok(self.pool)
    }
}

impl Bank for Accounts {
    fn send_to_pool(&mut self, from: &Address, amount: Amount) -> Result<()> {
        let available = self.balance(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| CoreError::InsufficientFunds {
                account: from.to_hex(),
                need: amount.to_sat(),
                available: available.to_sat(),
            })?;
        let pool = self
            .pool
            .checked_add(amount)
            .ok_or_else(|| CoreError::overflow("module pool balance"))?;

        self.balances.insert(from.clone(), remaining);
        self.pool = pool;

        tracing::debug!(
            "Moved {} sats from {} into {} pool",
            amount.to_sat(),
            from,
            self.module
        );
        Ok(())
    }

    fn send_from_pool(&mut self, payouts: &[Payout]) -> Result<()> {
        let total = payouts
            .iter()
            .try_fold(Amount::ZERO, |acc, p| acc.checked_add(p.amount))
            .ok_or_else(|| CoreError::overflow("payout batch total"))?;

        let pool = self
            .pool
            .checked_sub(total)
            .ok_or_else(|| CoreError::InsufficientFunds {
                account: self.module.clone(),
                need: total.to_sat(),
                available: self.pool.to_sat(),
            })?;

        // Stage every credit before touching state
        let mut staged: BTreeMap<Address, Amount> = BTreeMap::new();
        for payout in payouts {
            let current = staged
                .get(&payout.recipient)
                .copied()
                .unwrap_or_else(|| self.balance(&payout.recipient));
            let updated = current.checked_add(payout.amount).ok_or_else(|| {
                CoreError::overflow(format!("balance of {}", payout.recipient))
            })?;
            staged.insert(payout.recipient.clone(), updated);
        }

        self.pool = pool;
        self.balances.extend(staged);

        tracing::debug!(
            "Paid {} sats from {} pool across {} transfers",
            total.to_sat(),
            self.module,
            payouts.len()
        );
        Ok(())
    }
}
