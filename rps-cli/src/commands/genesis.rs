use crate::node::{Node, PoolAdjustment};
use anyhow::{Context, Result};
use clap::Subcommand;
use rps_game::GenesisState;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum GenesisCommands {
    /// Write the module state as genesis JSON
    Export {
        /// Output file (stdout if omitted)
        file: Option<PathBuf>,
    },
    /// Replace the module state from a genesis JSON file
    Import {
        /// Genesis file to read
        file: PathBuf,
    },
}

pub async fn handle_genesis_command(cmd: GenesisCommands, node: &mut Node) -> Result<()> {
    match cmd {
        GenesisCommands::Export { file } => {
            let state = node.keeper().export_genesis()?;
            let json = serde_json::to_string_pretty(&state)?;

            match file {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!(
                        "Exported {} games to {}",
                        state.games.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        GenesisCommands::Import { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let state: GenesisState = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file.display()))?;
            let games = state.games.len();

            let adjustment = node.import(state).await?;

            println!("Imported {} games from {}", games, file.display());
            println!("Next game id: {}", node.keeper().game_count());
            match adjustment {
                PoolAdjustment::Matched => {}
                PoolAdjustment::Minted(amount) => {
                    println!("Minted {} sats into the pool to back imported stakes", amount.to_sat())
                }
                PoolAdjustment::Surplus(amount) => {
                    println!("Pool keeps {} sats not staked by any game", amount.to_sat())
                }
            }
        }
    }

    Ok(())
}
