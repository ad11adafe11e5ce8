use crate::keeper::Keeper;
use crate::params::Params;
use crate::state::{Game, MoveCommit, MoveReveal, MAX_PLAYERS};
use crate::store::GameStore;
use crate::{GameError, Result};
use bitcoin::Amount;
use rps_core::AddressCodec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub game_id: u64,
    pub player: String,
    #[serde(flatten)]
    pub commit: MoveCommit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealRecord {
    pub game_id: u64,
    pub player: String,
    #[serde(flatten)]
    pub reveal: MoveReveal,
}

/// Full module state as whole records, used for snapshots and import
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    /// Next id the sequence hands out
    pub game_id: u64,
    #[serde(default)]
    pub games: Vec<Game>,
    #[serde(default)]
    pub move_commits: Vec<CommitRecord>,
    #[serde(default)]
    pub move_reveals: Vec<RevealRecord>,
}

impl GenesisState {
    /// Structural checks that need no address codec.
    pub fn validate(&self) -> Result<()> {
        self.params
            .validate()
            .map_err(|e| GameError::invalid_genesis(e.to_string()))?;

        let mut games: BTreeMap<u64, &Game> = BTreeMap::new();
        for game in &self.games {
            if game.id >= self.game_id {
                return Err(GameError::invalid_genesis(format!(
                    "game id {} is not below the sequence {}",
                    game.id, self.game_id
                )));
            }
            if game.entry_fee == Amount::ZERO {
                return Err(GameError::invalid_genesis(format!(
                    "game {} has no entry fee",
                    game.id
                )));
            }
            if game.prize().is_none() {
                return Err(GameError::invalid_genesis(format!(
                    "prize of game {} overflows",
                    game.id
                )));
            }
            if games.insert(game.id, game).is_some() {
                return Err(GameError::invalid_genesis(format!(
                    "duplicate game id {}",
                    game.id
                )));
            }
        }

        let mut commits: BTreeSet<(u64, &str)> = BTreeSet::new();
        let mut commit_counts: BTreeMap<u64, usize> = BTreeMap::new();
        for record in &self.move_commits {
            if !games.contains_key(&record.game_id) {
                return Err(GameError::invalid_genesis(format!(
                    "commit for unknown game {}",
                    record.game_id
                )));
            }
            if !commits.insert((record.game_id, record.player.as_str())) {
                return Err(GameError::invalid_genesis(format!(
                    "duplicate commit by {} in game {}",
                    record.player, record.game_id
                )));
            }
            *commit_counts.entry(record.game_id).or_default() += 1;
        }

        for (id, game) in &games {
            let count = commit_counts.get(id).copied().unwrap_or(0);
            if count == 0 || count > MAX_PLAYERS {
                return Err(GameError::invalid_genesis(format!(
                    "game {} has {} commits",
                    id, count
                )));
            }
            if game.reveal_deadline.is_some() && count != MAX_PLAYERS {
                return Err(GameError::invalid_genesis(format!(
                    "game {} has a reveal deadline before both players committed",
                    id
                )));
            }
        }

        let mut reveals: BTreeSet<(u64, &str)> = BTreeSet::new();
        for record in &self.move_reveals {
            let key = (record.game_id, record.player.as_str());
            if !commits.contains(&key) {
                return Err(GameError::invalid_genesis(format!(
                    "reveal by {} in game {} has no commit",
                    record.player, record.game_id
                )));
            }
            if !reveals.insert(key) {
                return Err(GameError::invalid_genesis(format!(
                    "duplicate reveal by {} in game {}",
                    record.player, record.game_id
                )));
            }
            let revealing = games
                .get(&record.game_id)
                .is_some_and(|g| g.reveal_deadline.is_some());
            if !revealing {
                return Err(GameError::invalid_genesis(format!(
                    "game {} has reveals but no reveal deadline",
                    record.game_id
                )));
            }
        }

        Ok(())
    }
}

impl<C: AddressCodec> Keeper<C> {
    /// Replace params and every record with `state`.
    ///
    /// Nothing changes unless the whole state validates and every player
    /// address decodes.
    pub fn init_genesis(&mut self, state: GenesisState) -> Result<()> {
        state.validate()?;

        let mut store = GameStore::new();
        store.set_sequence(state.game_id);
        for game in state.games {
            store.set_game(game);
        }

        for record in state.move_commits {
            let player = self.decode_player(&record.player)?;
            if store.has_commit(record.game_id, &player) {
                return Err(GameError::invalid_genesis(format!(
                    "duplicate commit by {} in game {}",
                    record.player, record.game_id
                )));
            }
            store.set_commit(record.game_id, player, record.commit);
        }

        for record in state.move_reveals {
            let player = self.decode_player(&record.player)?;
            if store.has_reveal(record.game_id, &player) {
                return Err(GameError::invalid_genesis(format!(
                    "duplicate reveal by {} in game {}",
                    record.player, record.game_id
                )));
            }
            store.set_reveal(record.game_id, player, record.reveal);
        }

        let games = store.len();
        self.params = state.params;
        self.store = store;

        tracing::info!(
            "Imported genesis: {} open games, sequence at {}",
            games,
            self.store.sequence()
        );
        Ok(())
    }

    pub fn export_genesis(&self) -> Result<GenesisState> {
        let move_commits = self
            .store
            .all_commits()
            .map(|(game_id, player, commit)| {
                Ok(CommitRecord {
                    game_id,
                    player: self.codec.bytes_to_string(player)?,
                    commit: commit.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let move_reveals = self
            .store
            .all_reveals()
            .map(|(game_id, player, reveal)| {
                Ok(RevealRecord {
                    game_id,
                    player: self.codec.bytes_to_string(player)?,
                    reveal: reveal.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GenesisState {
            params: self.params,
            game_id: self.store.sequence(),
            games: self.games(),
            move_commits,
            move_reveals,
        })
    }

    fn decode_player(&self, player: &str) -> Result<rps_core::Address> {
        self.codec
            .string_to_bytes(player)
            .map_err(|e| GameError::invalid_genesis(format!("player {}: {}", player, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::Commitment;
    use crate::keeper::test_support::*;
    use crate::moves::Move;

    fn game(id: u64) -> Game {
        Game {
            id,
            entry_fee: Amount::from_sat(FEE),
            commit_deadline: at(60).time,
            reveal_deadline: None,
        }
    }

    fn commit(game_id: u64, player: &str) -> CommitRecord {
        CommitRecord {
            game_id,
            player: player.to_string(),
            commit: MoveCommit {
                commitment: Commitment::new("c"),
                created_at: at(0).time,
            },
        }
    }

    fn reveal(game_id: u64, player: &str) -> RevealRecord {
        RevealRecord {
            game_id,
            player: player.to_string(),
            reveal: MoveReveal {
                mv: Move::Rock,
                salt: "s".to_string(),
                created_at: at(5).time,
            },
        }
    }

    #[test]
    fn test_default_genesis_is_valid() {
        let state = GenesisState::default();
        state.validate().unwrap();
        assert_eq!(state.params, Params::new(60, 60));
        assert_eq!(state.game_id, 0);
    }

    #[test]
    fn test_export_then_import_restores_state() {
        let mut f = Fixture::new();
        let id = f.full_game(Move::Rock, Move::Paper);
        let alice = f.alice.clone();
        f.keeper
            .reveal_move(&at(5), id, &alice, "rock", "alice-salt")
            .unwrap();
        let lone = f
            .keeper
            .start_game(&at(6), &mut f.bank, &alice, salted(Move::Paper, "x"), Amount::from_sat(FEE))
            .unwrap();

        let exported = f.keeper.export_genesis().unwrap();
        exported.validate().unwrap();
        assert_eq!(exported.game_id, 2);
        assert_eq!(exported.move_commits.len(), 3);
        assert_eq!(exported.move_reveals.len(), 1);
        assert_eq!(exported.move_reveals[0].player, alice);

        let json = serde_json::to_string(&exported).unwrap();
        assert!(json.contains("\"move\":\"rock\""));
        let parsed: GenesisState = serde_json::from_str(&json).unwrap();

        let mut restored = Fixture::new();
        restored.keeper.init_genesis(parsed).unwrap();
        assert_eq!(restored.keeper.store(), f.keeper.store());
        assert!(restored.keeper.game(lone).is_ok());

        // the sequence continues past imported ids
        let bob = restored.bob.clone();
        let next = restored
            .keeper
            .start_game(&at(7), &mut restored.bank, &bob, salted(Move::Rock, "y"), Amount::from_sat(FEE))
            .unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn test_validate_rejects_bad_states() {
        let f = Fixture::new();
        let (a, b, c) = (f.alice.clone(), f.bob.clone(), f.carol.clone());

        let base = GenesisState {
            params: Params::default(),
            game_id: 1,
            games: vec![game(0)],
            move_commits: vec![commit(0, &a)],
            move_reveals: vec![],
        };
        base.validate().unwrap();

        let cases: Vec<(&str, GenesisState)> = vec![
            (
                "zero window",
                GenesisState {
                    params: Params::new(0, 60),
                    ..base.clone()
                },
            ),
            (
                "id beyond sequence",
                GenesisState {
                    game_id: 0,
                    ..base.clone()
                },
            ),
            (
                "duplicate id",
                GenesisState {
                    game_id: 2,
                    games: vec![game(0), game(0)],
                    ..base.clone()
                },
            ),
            (
                "no commits",
                GenesisState {
                    move_commits: vec![],
                    ..base.clone()
                },
            ),
            (
                "three commits",
                GenesisState {
                    move_commits: vec![commit(0, &a), commit(0, &b), commit(0, &c)],
                    ..base.clone()
                },
            ),
            (
                "orphan commit",
                GenesisState {
                    move_commits: vec![commit(0, &a), commit(5, &b)],
                    ..base.clone()
                },
            ),
            (
                "reveal without commit",
                GenesisState {
                    games: vec![Game {
                        reveal_deadline: Some(at(70).time),
                        ..game(0)
                    }],
                    move_commits: vec![commit(0, &a), commit(0, &b)],
                    move_reveals: vec![reveal(0, &c)],
                    ..base.clone()
                },
            ),
            (
                "reveal without deadline",
                GenesisState {
                    move_commits: vec![commit(0, &a), commit(0, &b)],
                    move_reveals: vec![reveal(0, &a)],
                    ..base.clone()
                },
            ),
            (
                "deadline before game full",
                GenesisState {
                    games: vec![Game {
                        reveal_deadline: Some(at(70).time),
                        ..game(0)
                    }],
                    ..base.clone()
                },
            ),
            (
                "prize overflow",
                GenesisState {
                    games: vec![Game {
                        entry_fee: Amount::from_sat(u64::MAX),
                        ..game(0)
                    }],
                    ..base.clone()
                },
            ),
        ];

        for (name, state) in cases {
            let err = state.validate().unwrap_err();
            assert!(matches!(err, GameError::InvalidGenesis(_)), "{}: {:?}", name, err);
        }
    }

    #[test]
    fn test_init_genesis_rejects_bad_address_and_keeps_state() {
        let mut f = Fixture::new();
        let id = f.full_game(Move::Rock, Move::Paper);

        let state = GenesisState {
            params: Params::new(5, 5),
            game_id: 1,
            games: vec![game(0)],
            move_commits: vec![commit(0, "cosmos1notours")],
            move_reveals: vec![],
        };
        let err = f.keeper.init_genesis(state).unwrap_err();
        assert!(matches!(err, GameError::InvalidGenesis(_)));

        assert_eq!(f.keeper.params(), Params::default());
        assert_eq!(f.keeper.commits(id).unwrap().len(), 2);
    }

    #[test]
    fn test_init_genesis_catches_case_variant_duplicates() {
        let mut f = Fixture::new();
        let alice = f.alice.clone();

        let state = GenesisState {
            params: Params::default(),
            game_id: 1,
            games: vec![game(0)],
            move_commits: vec![commit(0, &alice), commit(0, &alice.to_uppercase())],
            move_reveals: vec![],
        };
        let err = f.keeper.init_genesis(state).unwrap_err();
        assert!(matches!(err, GameError::InvalidGenesis(_)));
    }
}
