use crate::commitment::{self, Commitment};
use crate::keeper::Keeper;
use crate::moves::Move;
use crate::state::{Game, MoveCommit, MoveReveal, MAX_PLAYERS};
use crate::{GameError, Result};
use bitcoin::Amount;
use rps_core::{AddressCodec, Bank, BlockContext};

// Every operation runs its checks before the bank call and writes the store
// only after the bank call succeeds, so a failure leaves nothing behind.
impl<C: AddressCodec> Keeper<C> {
    /// Open a new game staked by `player` and record their commitment.
    pub fn start_game<B: Bank>(
        &mut self,
        ctx: &BlockContext,
        bank: &mut B,
        player: &str,
        commitment: Commitment,
        entry_fee: Amount,
    ) -> Result<u64> {
        if entry_fee == Amount::ZERO {
            return Err(GameError::InvalidStake);
        }

        let player_addr = self.resolve(player)?;

        let commit_deadline = ctx
            .time
            .checked_add_signed(self.params.commit_duration()?)
            .ok_or_else(|| GameError::overflow("commit deadline"))?;

        let prize = entry_fee
            .checked_mul(MAX_PLAYERS as u64)
            .ok_or_else(|| GameError::overflow("prize for entry fee"))?;

        if self.store.sequence().checked_add(1).is_none() {
            return Err(GameError::overflow("game id sequence exhausted"));
        }

        bank.send_to_pool(&player_addr, entry_fee)?;

        let id = self
            .store
            .next_game_id()
            .ok_or_else(|| GameError::overflow("game id sequence exhausted"))?;

        self.store.set_game(Game {
            id,
            entry_fee,
            commit_deadline,
            reveal_deadline: None,
        });
        self.store.set_commit(
            id,
            player_addr,
            MoveCommit {
                commitment,
                created_at: ctx.time,
            },
        );

        tracing::info!(
            "Game {} created by {} with entry fee {} sats (prize {} sats), commits close at {}",
            id,
            player,
            entry_fee.to_sat(),
            prize.to_sat(),
            commit_deadline
        );
        Ok(id)
    }

    /// Join `game_id` as the second player.
    pub fn commit_move<B: Bank>(
        &mut self,
        ctx: &BlockContext,
        bank: &mut B,
        game_id: u64,
        player: &str,
        commitment: Commitment,
    ) -> Result<()> {
        let player_addr = self.resolve(player)?;

        let game = self
            .store
            .game(game_id)
            .ok_or(GameError::GameNotFound(game_id))?;
        let entry_fee = game.entry_fee;

        // A full game stays full no matter when the attempt arrives
        if self.store.commit_count(game_id) >= MAX_PLAYERS {
            return Err(GameError::GameFull(game_id));
        }

        if game.commit_window_closed(ctx.time) {
            return Err(GameError::CommitWindowClosed(game_id));
        }

        if self.store.has_commit(game_id, &player_addr) {
            return Err(GameError::AlreadyCommitted(game_id));
        }

        bank.send_to_pool(&player_addr, entry_fee)?;

        self.store.set_commit(
            game_id,
            player_addr,
            MoveCommit {
                commitment,
                created_at: ctx.time,
            },
        );

        tracing::info!("Player {} committed to game {}", player, game_id);
        Ok(())
    }

    /// Open a stored commitment. The first reveal starts the reveal window.
    pub fn reveal_move(
        &mut self,
        ctx: &BlockContext,
        game_id: u64,
        player: &str,
        mv: &str,
        salt: &str,
    ) -> Result<()> {
        let player_addr = self.resolve(player)?;
        let mv: Move = mv.parse()?;

        let mut game = self
            .store
            .game(game_id)
            .cloned()
            .ok_or(GameError::GameNotFound(game_id))?;

        if game.reveal_window_closed(ctx.time) {
            return Err(GameError::RevealWindowClosed(game_id));
        }

        let commit = self
            .store
            .commit(game_id, &player_addr)
            .ok_or(GameError::NotACommittedPlayer(game_id))?;

        if self.store.commit_count(game_id) != MAX_PLAYERS {
            return Err(GameError::GameNotFull(game_id));
        }

        if self.store.has_reveal(game_id, &player_addr) {
            return Err(GameError::AlreadyRevealed(game_id));
        }

        if !commitment::verify(mv, salt, &commit.commitment) {
            tracing::warn!(
                "Player {} revealed {} in game {} but it doesn't match their commitment",
                player,
                mv,
                game_id
            );
            return Err(GameError::CommitmentMismatch(game_id));
        }

        if game.reveal_deadline.is_none() {
            let deadline = ctx
                .time
                .checked_add_signed(self.params.reveal_duration()?)
                .ok_or_else(|| GameError::overflow("reveal deadline"))?;
            game.reveal_deadline = Some(deadline);
            self.store.set_game(game);

            tracing::info!("Game {} reveal window closes at {}", game_id, deadline);
        }

        self.store.set_reveal(
            game_id,
            player_addr,
            MoveReveal {
                mv,
                salt: salt.to_string(),
                created_at: ctx.time,
            },
        );

        tracing::info!("Player {} revealed in game {}", player, game_id);
        Ok(())
    }
}
