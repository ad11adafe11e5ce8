use crate::params::{GameConfig, Params, SettlementPolicy};
use crate::state::{Game, MoveCommit, MoveReveal};
use crate::store::GameStore;
use crate::{GameError, Result};
use bitcoin::Amount;
use rps_core::{Address, AddressCodec};

/// Owns the module state and applies every game transition.
///
/// Player operations live in `lifecycle`, the end-of-round hook in
/// `settlement`, and snapshot import/export in `genesis`.
#[derive(Debug)]
pub struct Keeper<C: AddressCodec> {
    pub(crate) codec: C,
    /// Only this account may change params
    pub(crate) authority: String,
    pub(crate) params: Params,
    pub(crate) policy: SettlementPolicy,
    pub(crate) store: GameStore,
}

impl<C: AddressCodec> Keeper<C> {
    pub fn new(codec: C, authority: impl Into<String>, config: &GameConfig) -> Result<Self> {
        let authority = authority.into();
        codec
            .string_to_bytes(&authority)
            .map_err(|e| GameError::InvalidAddress(format!("authority: {}", e)))?;
        config.validate()?;

        Ok(Self {
            codec,
            authority,
            params: config.params,
            policy: config.settlement,
            store: GameStore::new(),
        })
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn params(&self) -> Params {
        self.params
    }

    /// All open games in id order.
    pub fn games(&self) -> Vec<Game> {
        self.store.games().cloned().collect()
    }

    pub fn game(&self, id: u64) -> Result<&Game> {
        self.store.game(id).ok_or(GameError::GameNotFound(id))
    }

    /// Number of games ever created, including settled ones.
    pub fn game_count(&self) -> u64 {
        self.store.sequence()
    }

    pub fn commits(&self, id: u64) -> Result<Vec<(Address, MoveCommit)>> {
        self.game(id)?;
        Ok(self
            .store
            .commits(id)
            .into_iter()
            .map(|(player, commit)| (player.clone(), commit.clone()))
            .collect())
    }

    pub fn reveals(&self, id: u64) -> Result<Vec<(Address, MoveReveal)>> {
        self.game(id)?;
        Ok(self
            .store
            .reveals(id)
            .into_iter()
            .map(|(player, reveal)| (player.clone(), reveal.clone()))
            .collect())
    }

    /// Stakes the pool must currently hold: one entry fee per recorded commit.
    pub fn outstanding_stakes(&self) -> Result<Amount> {
        self.store.all_commits().try_fold(Amount::ZERO, |acc, (id, _, _)| {
            let fee = self
                .store
                .game(id)
                .map(|g| g.entry_fee)
                .ok_or_else(|| GameError::invalid_genesis(format!("commit for missing game {}", id)))?;
            acc.checked_add(fee)
                .ok_or_else(|| GameError::overflow("outstanding stakes"))
        })
    }

    /// Replace params. Restricted to the configured authority.
    pub fn update_params(&mut self, authority: &str, params: Params) -> Result<()> {
        self.codec
            .string_to_bytes(authority)
            .map_err(|e| GameError::InvalidAddress(e.to_string()))?;

        if !authority.eq_ignore_ascii_case(&self.authority) {
            return Err(GameError::Unauthorized {
                expected: self.authority.clone(),
                got: authority.to_string(),
            });
        }

        params.validate()?;
        self.params = params;

        tracing::info!(
            "Params updated: commit window {}s, reveal window {}s",
            params.commit_window,
            params.reveal_window
        );
        Ok(())
    }

    pub(crate) fn resolve(&self, player: &str) -> Result<Address> {
        self.codec
            .string_to_bytes(player)
            .map_err(|e| GameError::InvalidAddress(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::commitment::{self, Commitment};
    use crate::moves::Move;
    use chrono::{DateTime, Utc};
    use rps_core::{Accounts, Bech32Codec, BlockContext};

    pub const FEE: u64 = 1_000;
    pub const FUNDS: u64 = 10_000;

    pub struct Fixture {
        pub keeper: Keeper<Bech32Codec>,
        pub bank: Accounts,
        pub authority: String,
        pub alice: String,
        pub bob: String,
        pub carol: String,
    }

    pub fn at(secs: i64) -> BlockContext {
        BlockContext::new(secs as u64, DateTime::<Utc>::from_timestamp(secs, 0).unwrap())
    }

    pub fn salted(mv: Move, salt: &str) -> Commitment {
        commitment::commit(mv, salt)
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with_config(GameConfig::default())
        }

        pub fn with_config(config: GameConfig) -> Self {
            let codec = Bech32Codec::new("rps").unwrap();
            let name = |n: &str| codec.bytes_to_string(&Address::module(n)).unwrap();
            let authority = name("gov");
            let (alice, bob, carol) = (name("alice"), name("bob"), name("carol"));

            let mut bank = Accounts::new("rps");
            for player in [&alice, &bob, &carol] {
                bank.mint(
                    &codec.string_to_bytes(player).unwrap(),
                    Amount::from_sat(FUNDS),
                )
                .unwrap();
            }

            let keeper = Keeper::new(codec, authority.clone(), &config).unwrap();
            Self {
                keeper,
                bank,
                authority,
                alice,
                bob,
                carol,
            }
        }

        pub fn addr(&self, player: &str) -> Address {
            self.keeper.codec().string_to_bytes(player).unwrap()
        }

        pub fn balance(&self, player: &str) -> u64 {
            self.bank.balance(&self.addr(player)).to_sat()
        }

        /// Alice starts at t=0 and Bob joins at t=1.
        pub fn full_game(&mut self, alice_move: Move, bob_move: Move) -> u64 {
            let alice = self.alice.clone();
            let bob = self.bob.clone();
            let id = self
                .keeper
                .start_game(
                    &at(0),
                    &mut self.bank,
                    &alice,
                    salted(alice_move, "alice-salt"),
                    Amount::from_sat(FEE),
                )
                .unwrap();
            self.keeper
                .commit_move(&at(1), &mut self.bank, id, &bob, salted(bob_move, "bob-salt"))
                .unwrap();
            id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::error::ErrorKind;
    use crate::moves::Move;

    #[test]
    fn test_new_rejects_bad_authority() {
        let codec = rps_core::Bech32Codec::new("rps").unwrap();
        let err = Keeper::new(codec, "cosmos1xyz", &GameConfig::default()).unwrap_err();
        assert!(matches!(err, GameError::InvalidAddress(_)));
    }

    #[test]
    fn test_queries_on_fresh_keeper() {
        let f = Fixture::new();
        assert_eq!(f.keeper.params(), Params::new(60, 60));
        assert_eq!(f.keeper.game_count(), 0);
        assert!(f.keeper.games().is_empty());
        assert!(matches!(f.keeper.game(0), Err(GameError::GameNotFound(0))));
    }

    #[test]
    fn test_update_params_by_authority() {
        let mut f = Fixture::new();
        let authority = f.authority.to_uppercase();

        f.keeper
            .update_params(&authority, Params::new(120, 30))
            .unwrap();
        assert_eq!(f.keeper.params(), Params::new(120, 30));
    }

    #[test]
    fn test_update_params_rejects_others() {
        let mut f = Fixture::new();
        let alice = f.alice.clone();

        let err = f
            .keeper
            .update_params(&alice, Params::new(120, 30))
            .unwrap_err();
        assert!(matches!(err, GameError::Unauthorized { .. }));
        assert_eq!(err.kind(), ErrorKind::Precondition);

        let err = f
            .keeper
            .update_params("garbage", Params::new(120, 30))
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidAddress(_)));

        let authority = f.authority.clone();
        let err = f
            .keeper
            .update_params(&authority, Params::new(0, 30))
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidParams(_)));
        assert_eq!(f.keeper.params(), Params::new(60, 60));
    }

    #[test]
    fn test_outstanding_stakes_track_pool() {
        let mut f = Fixture::new();
        f.full_game(Move::Rock, Move::Paper);

        assert_eq!(f.keeper.outstanding_stakes().unwrap(), f.bank.pool_balance());
        assert_eq!(f.bank.pool_balance(), Amount::from_sat(2 * FEE));
    }
}
