use crate::node::Node;
use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Table};
use rps_game::{sweep, GamePhase, SweepReport};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn list_games(node: &Node) -> Result<()> {
    let keeper = node.keeper();
    let games = keeper.games();

    if games.is_empty() {
        println!("No open games.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Game ID",
        "Entry Fee (sats)",
        "Players",
        "Reveals",
        "Phase",
        "Commit Deadline",
        "Reveal Deadline",
    ]);

    for game in &games {
        let commits = keeper.store().commit_count(game.id);
        let reveals = keeper.store().reveal_count(game.id);
        table.add_row(vec![
            game.id.to_string(),
            game.entry_fee.to_sat().to_string(),
            format!("{}/2", commits),
            reveals.to_string(),
            format!("{:?}", GamePhase::from_counts(commits, reveals)),
            game.commit_deadline.format(TIME_FORMAT).to_string(),
            game.reveal_deadline
                .map(|d| d.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
    println!("Total: {} open games", games.len());
    Ok(())
}

pub fn show_game(node: &Node, game_id: u64) -> Result<()> {
    let keeper = node.keeper();
    let game = keeper.game(game_id)?;
    let commits = keeper.commits(game_id)?;
    let reveals = keeper.reveals(game_id)?;

    println!("Game {}", game.id);
    println!("Entry fee: {} sats", game.entry_fee.to_sat());
    println!(
        "Phase: {:?}",
        GamePhase::from_counts(commits.len(), reveals.len())
    );
    println!(
        "Commit deadline: {}",
        game.commit_deadline.format(TIME_FORMAT)
    );
    if let Some(deadline) = game.reveal_deadline {
        println!("Reveal deadline: {}", deadline.format(TIME_FORMAT));
    }
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Player", "Commitment", "Committed", "Move", "Revealed"]);

    for (player, commit) in &commits {
        let reveal = reveals.iter().find(|(p, _)| p == player).map(|(_, r)| r);
        table.add_row(vec![
            super::display_address(node, player),
            format!("{}...", commit.commitment.as_str().chars().take(16).collect::<String>()),
            commit.created_at.format(TIME_FORMAT).to_string(),
            reveal
                .map(|r| r.mv.to_string())
                .unwrap_or_else(|| "hidden".to_string()),
            reveal
                .map(|r| r.created_at.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
    Ok(())
}

pub fn show_count(node: &Node) -> Result<()> {
    println!("Games created: {}", node.keeper().game_count());
    println!("Open games: {}", node.keeper().store().len());
    Ok(())
}

pub fn show_params(node: &Node) -> Result<()> {
    let params = node.keeper().params();
    println!("Commit window: {}s", params.commit_window);
    println!("Reveal window: {}s", params.reveal_window);
    println!("Authority: {}", node.keeper().authority());
    println!("Settlement policy: {:?}", node.keeper().policy());
    Ok(())
}

/// Dry run of the sweep at `time`, without opening a block.
pub fn show_pending(node: &Node, time: DateTime<Utc>) -> Result<()> {
    let (remaining, settlements) = sweep(time, node.keeper().store())?;

    if settlements.is_empty() {
        println!("No games due for settlement at {}.", time.format(TIME_FORMAT));
        return Ok(());
    }

    let report = SweepReport {
        height: node.chain().height() + 1,
        settled: settlements,
        deferred: Vec::new(),
    };
    println!(
        "At {} the next block would settle {} games:",
        time.format(TIME_FORMAT),
        report.settled.len()
    );
    super::game::print_report(node, &report);
    println!("{} games would remain open", remaining.len());
    Ok(())
}
