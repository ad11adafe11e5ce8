use crate::state::{Game, MoveCommit, MoveReveal};
use rps_core::Address;
use std::collections::BTreeMap;

type PlayerKey = (u64, Address);

/// Game records keyed for ordered scans by game id.
///
/// Commits and reveals share the `(game id, player)` key, so every record of
/// one game sits in a contiguous range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStore {
    next_id: u64,
    games: BTreeMap<u64, Game>,
    commits: BTreeMap<PlayerKey, MoveCommit>,
    reveals: BTreeMap<PlayerKey, MoveReveal>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the current sequence value and advance it.
    pub fn next_game_id(&mut self) -> Option<u64> {
        let id = self.next_id;
        self.next_id = id.checked_add(1)?;
        Some(id)
    }

    /// Lifetime count of ids handed out.
    pub fn sequence(&self) -> u64 {
        self.next_id
    }

    pub(crate) fn set_sequence(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    pub fn game(&self, id: u64) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    pub fn game_ids(&self) -> Vec<u64> {
        self.games.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn set_game(&mut self, game: Game) {
        self.games.insert(game.id, game);
    }

    pub fn commit(&self, id: u64, player: &Address) -> Option<&MoveCommit> {
        self.commits.get(&(id, player.clone()))
    }

    pub fn has_commit(&self, id: u64, player: &Address) -> bool {
        self.commit(id, player).is_some()
    }

    /// Commits of one game in player-address order.
    pub fn commits(&self, id: u64) -> Vec<(&Address, &MoveCommit)> {
        prefix(&self.commits, id).collect()
    }

    pub fn commit_count(&self, id: u64) -> usize {
        prefix(&self.commits, id).count()
    }

    pub fn set_commit(&mut self, id: u64, player: Address, commit: MoveCommit) {
        self.commits.insert((id, player), commit);
    }

    pub fn has_reveal(&self, id: u64, player: &Address) -> bool {
        self.reveals.contains_key(&(id, player.clone()))
    }

    /// Reveals of one game in player-address order.
    pub fn reveals(&self, id: u64) -> Vec<(&Address, &MoveReveal)> {
        prefix(&self.reveals, id).collect()
    }

    pub fn reveal_count(&self, id: u64) -> usize {
        prefix(&self.reveals, id).count()
    }

    pub fn set_reveal(&mut self, id: u64, player: Address, reveal: MoveReveal) {
        self.reveals.insert((id, player), reveal);
    }

    /// Every commit record across all games.
    pub fn all_commits(&self) -> impl Iterator<Item = (u64, &Address, &MoveCommit)> {
        self.commits.iter().map(|((id, player), c)| (*id, player, c))
    }

    /// Every reveal record across all games.
    pub fn all_reveals(&self) -> impl Iterator<Item = (u64, &Address, &MoveReveal)> {
        self.reveals.iter().map(|((id, player), r)| (*id, player, r))
    }

    /// Drop a game together with its commits and reveals.
    pub fn remove_game(&mut self, id: u64) -> Option<Game> {
        let players: Vec<Address> = prefix(&self.commits, id)
            .map(|(player, _)| player.clone())
            .chain(prefix(&self.reveals, id).map(|(player, _)| player.clone()))
            .collect();

        for player in players {
            let key = (id, player);
            self.commits.remove(&key);
            self.reveals.remove(&key);
        }

        self.games.remove(&id)
    }
}

fn prefix<V>(map: &BTreeMap<PlayerKey, V>, id: u64) -> impl Iterator<Item = (&Address, &V)> {
    // The empty address sorts before every other address
    map.range((id, Address::default())..)
        .take_while(move |((gid, _), _)| *gid == id)
        .map(|((_, player), value)| (player, value))
}
