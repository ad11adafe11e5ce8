use crate::keeper::Keeper;
use crate::moves::{decide, Move, Outcome};
use crate::params::SettlementPolicy;
use crate::state::{Game, MAX_PLAYERS};
use crate::store::GameStore;
use crate::{GameError, Result};
use bitcoin::Amount;
use chrono::{DateTime, Utc};
use rps_core::{Address, AddressCodec, Bank, BlockContext, Payout};
use serde::Serialize;

/// How a game left the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// Nobody joined before the commit window closed
    Refunded { player: Address },
    /// Both committed but neither revealed in time
    Abandoned,
    /// Only one player revealed in time
    Forfeit { winner: Address },
    Won {
        winner: Address,
        loser: Address,
        winning_move: Move,
        losing_move: Move,
    },
    Draw {
        #[serde(rename = "move")]
        mv: Move,
    },
    /// No commits at all; removed without payouts
    Empty,
}

/// Transfers that close out one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    pub game_id: u64,
    pub resolution: Resolution,
    pub payouts: Vec<Payout>,
}

impl Settlement {
    pub fn total(&self) -> Option<Amount> {
        self.payouts
            .iter()
            .try_fold(Amount::ZERO, |acc, p| acc.checked_add(p.amount))
    }
}

/// Outcome of one end-of-round pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub height: u64,
    pub settled: Vec<Settlement>,
    /// Games whose payout was rejected and stay open
    pub deferred: Vec<u64>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.settled.is_empty() && self.deferred.is_empty()
    }
}

/// Decide whether `game` closes at `now` and with which payouts.
pub fn plan_game(now: DateTime<Utc>, store: &GameStore, game: &Game) -> Result<Option<Settlement>> {
    let commits = store.commits(game.id);

    if commits.len() < MAX_PLAYERS {
        if !game.commit_window_closed(now) {
            return Ok(None);
        }

        let settlement = match commits.first() {
            Some((player, _)) => Settlement {
                game_id: game.id,
                resolution: Resolution::Refunded {
                    player: (*player).clone(),
                },
                payouts: vec![Payout::new((*player).clone(), game.entry_fee)],
            },
            None => Settlement {
                game_id: game.id,
                resolution: Resolution::Empty,
                payouts: Vec::new(),
            },
        };
        return Ok(Some(settlement));
    }

    let Some(reveal_deadline) = game.reveal_deadline else {
        return Ok(None);
    };

    let reveals = store.reveals(game.id);
    if reveals.len() < MAX_PLAYERS && now < reveal_deadline {
        return Ok(None);
    }

    let prize = game
        .prize()
        .ok_or_else(|| GameError::overflow(format!("prize of game {}", game.id)))?;

    let (resolution, payouts) = match reveals.as_slice() {
        [] => (
            Resolution::Abandoned,
            commits
                .iter()
                .map(|(player, _)| Payout::new((*player).clone(), game.entry_fee))
                .collect(),
        ),
        [(winner, _)] => (
            Resolution::Forfeit {
                winner: (*winner).clone(),
            },
            vec![Payout::new((*winner).clone(), prize)],
        ),
        [(first, a), (second, b), ..] => match decide(a.mv, b.mv) {
            Outcome::Draw => (
                Resolution::Draw { mv: a.mv },
                vec![
                    Payout::new((*first).clone(), game.entry_fee),
                    Payout::new((*second).clone(), game.entry_fee),
                ],
            ),
            Outcome::FirstWins => (
                Resolution::Won {
                    winner: (*first).clone(),
                    loser: (*second).clone(),
                    winning_move: a.mv,
                    losing_move: b.mv,
                },
                vec![Payout::new((*first).clone(), prize)],
            ),
            Outcome::SecondWins => (
                Resolution::Won {
                    winner: (*second).clone(),
                    loser: (*first).clone(),
                    winning_move: b.mv,
                    losing_move: a.mv,
                },
                vec![Payout::new((*second).clone(), prize)],
            ),
        },
    };

    Ok(Some(Settlement {
        game_id: game.id,
        resolution,
        payouts,
    }))
}

/// Plan a full sweep without moving funds.
///
/// Returns the store as it would look after every settlement applied, plus the
/// settlements in game id order.
pub fn sweep(now: DateTime<Utc>, store: &GameStore) -> Result<(GameStore, Vec<Settlement>)> {
    let mut next = store.clone();
    let mut settlements = Vec::new();

    for game in store.games() {
        if let Some(settlement) = plan_game(now, store, game)? {
            next.remove_game(game.id);
            settlements.push(settlement);
        }
    }

    Ok((next, settlements))
}

impl<C: AddressCodec> Keeper<C> {
    /// End-of-round hook: settle every game that is due at `ctx.time`.
    ///
    /// Each game's payouts and record removal land together. Under
    /// `FailFast` the first rejected payout aborts the pass with
    /// `GameError::Settlement`; games settled before it stay settled.
    pub fn end_round<B: Bank>(&mut self, ctx: &BlockContext, bank: &mut B) -> Result<SweepReport> {
        let mut report = SweepReport {
            height: ctx.height,
            ..SweepReport::default()
        };

        for id in self.store.game_ids() {
            let Some(game) = self.store.game(id) else {
                continue;
            };

            let settlement = match plan_game(ctx.time, &self.store, game) {
                Ok(Some(settlement)) => settlement,
                Ok(None) => continue,
                Err(e) => {
                    self.on_failure(id, e, &mut report)?;
                    continue;
                }
            };

            if let Err(source) = bank.send_from_pool(&settlement.payouts) {
                let err = GameError::Settlement { game_id: id, source };
                self.on_failure(id, err, &mut report)?;
                continue;
            }

            self.store.remove_game(id);
            log_settlement(&settlement);
            report.settled.push(settlement);
        }

        if !report.is_empty() {
            tracing::debug!(
                "Round {} settled {} games, deferred {}",
                ctx.height,
                report.settled.len(),
                report.deferred.len()
            );
        }
        Ok(report)
    }

    fn on_failure(&self, id: u64, err: GameError, report: &mut SweepReport) -> Result<()> {
        let cause = std::error::Error::source(&err)
            .map(|source| format!(": {}", source))
            .unwrap_or_default();
        match self.policy {
            SettlementPolicy::FailFast => {
                tracing::error!("Sweep stopped at game {}: {}{}", id, err, cause);
                Err(err)
            }
            SettlementPolicy::Continue => {
                tracing::warn!("Deferring game {} to next round: {}{}", id, err, cause);
                report.deferred.push(id);
                Ok(())
            }
        }
    }
}

fn log_settlement(settlement: &Settlement) {
    let id = settlement.game_id;
    match &settlement.resolution {
        Resolution::Refunded { player } => {
            tracing::info!("Game {} expired without opponent, refunded {}", id, player)
        }
        Resolution::Abandoned => {
            tracing::info!("Game {} abandoned without reveals, both stakes refunded", id)
        }
        Resolution::Forfeit { winner } => {
            tracing::info!("Game {} forfeited, {} takes the prize", id, winner)
        }
        Resolution::Won {
            winner,
            winning_move,
            losing_move,
            ..
        } => tracing::info!(
            "Game {} completed. Winner: {} ({} beats {})",
            id,
            winner,
            winning_move,
            losing_move
        ),
        Resolution::Draw { mv } => tracing::info!("Game {} drawn on {}, stakes refunded", id, mv),
        Resolution::Empty => tracing::warn!("Game {} had no commits, removed without payout", id),
    }
}
