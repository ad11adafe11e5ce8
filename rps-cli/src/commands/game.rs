use crate::node::Node;
use anyhow::Result;
use chrono::{DateTime, Utc};
use rps_core::Amount;
use rps_game::commitment::commit;
use rps_game::{generate_salt, Move, Params, Resolution, SweepReport};

pub async fn new_game(
    node: &mut Node,
    time: DateTime<Utc>,
    player: &str,
    mv: &str,
    fee: u64,
    salt: Option<String>,
) -> Result<()> {
    let mv: Move = mv.parse()?;
    let salt = salt.unwrap_or_else(generate_salt);
    let commitment = commit(mv, &salt);

    let block = node
        .deliver(time, |keeper, ctx, bank| {
            keeper.start_game(ctx, bank, player, commitment.clone(), Amount::from_sat(fee))
        })
        .await?;
    let game_id = block.output;

    println!("Created game {} at block {}", game_id, block.context.height);
    println!("Entry fee: {} sats", fee);
    println!("Commitment: {}", commitment);
    println!("Salt: {}", salt);
    println!("Keep the salt secret until you reveal.");
    println!();
    println!("Share this command with another player:");
    println!("rps commit-move <their-address> {} <move>", game_id);
    print_report(node, &block.into_report()?);

    Ok(())
}

pub async fn commit_move(
    node: &mut Node,
    time: DateTime<Utc>,
    player: &str,
    game_id: u64,
    mv: &str,
    salt: Option<String>,
) -> Result<()> {
    let mv: Move = mv.parse()?;
    let salt = salt.unwrap_or_else(generate_salt);
    let commitment = commit(mv, &salt);

    let block = node
        .deliver(time, |keeper, ctx, bank| {
            keeper.commit_move(ctx, bank, game_id, player, commitment.clone())
        })
        .await?;

    println!("Committed to game {} at block {}", game_id, block.context.height);
    println!("Commitment: {}", commitment);
    println!("Salt: {}", salt);
    println!();
    println!("Both players can now reveal:");
    println!("rps reveal-move {} {} {} {}", player, game_id, mv, salt);
    print_report(node, &block.into_report()?);

    Ok(())
}

pub async fn reveal_move(
    node: &mut Node,
    time: DateTime<Utc>,
    player: &str,
    game_id: u64,
    mv: &str,
    salt: &str,
) -> Result<()> {
    let block = node
        .deliver(time, |keeper, ctx, _| {
            keeper.reveal_move(ctx, game_id, player, mv, salt)
        })
        .await?;

    println!("Revealed {} in game {} at block {}", mv, game_id, block.context.height);
    if let Ok(game) = node.keeper().game(game_id) {
        if let Some(deadline) = game.reveal_deadline {
            println!(
                "Reveal window closes at {}",
                deadline.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    print_report(node, &block.into_report()?);

    Ok(())
}

/// Empty block that only runs the settlement sweep.
pub async fn tick(node: &mut Node, time: DateTime<Utc>) -> Result<()> {
    let block = node.deliver(time, |_, _, _| Ok(())).await?;

    println!("Block {} at {}", block.context.height, block.context.time);
    let report = block.into_report()?;
    if report.is_empty() {
        println!("No games due for settlement.");
    }
    print_report(node, &report);

    Ok(())
}

pub async fn update_params(
    node: &mut Node,
    time: DateTime<Utc>,
    authority: &str,
    commit_window: u64,
    reveal_window: u64,
) -> Result<()> {
    let params = Params::new(commit_window, reveal_window);
    let block = node
        .deliver(time, |keeper, _, _| keeper.update_params(authority, params))
        .await?;

    println!("Params updated at block {}", block.context.height);
    println!("Commit window: {}s", params.commit_window);
    println!("Reveal window: {}s", params.reveal_window);
    print_report(node, &block.into_report()?);

    Ok(())
}

pub(crate) fn print_report(node: &Node, report: &SweepReport) {
    for settlement in &report.settled {
        let id = settlement.game_id;
        match &settlement.resolution {
            Resolution::Refunded { player } => println!(
                "Game {} expired, refunded {}",
                id,
                super::display_address(node, player)
            ),
            Resolution::Abandoned => println!("Game {} abandoned, both stakes refunded", id),
            Resolution::Forfeit { winner } => println!(
                "Game {} forfeited, {} wins",
                id,
                super::display_address(node, winner)
            ),
            Resolution::Won {
                winner,
                winning_move,
                losing_move,
                ..
            } => println!(
                "Game {} won by {} ({} beats {})",
                id,
                super::display_address(node, winner),
                winning_move,
                losing_move
            ),
            Resolution::Draw { mv } => println!("Game {} drawn ({}), stakes refunded", id, mv),
            Resolution::Empty => println!("Game {} removed without payout", id),
        }
    }

    for id in &report.deferred {
        println!("Game {} settlement deferred to the next block", id);
    }
}
