mod commands;
mod config;
mod node;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::CliConfig;
use node::Node;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rps")]
#[command(about = "Commit-reveal rock-paper-scissors on a local ledger")]
#[command(version)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Block time as unix seconds (defaults to now)
    #[arg(long, global = true)]
    at: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management commands
    #[command(subcommand)]
    Account(commands::AccountCommands),
    /// Start a new game with a hidden move
    NewGame {
        /// Creator address
        player: String,
        /// rock, paper or scissors
        #[arg(value_name = "MOVE")]
        mv: String,
        /// Entry fee in satoshis
        fee: u64,
        /// Salt to hide the move (random if omitted)
        #[arg(long)]
        salt: Option<String>,
    },
    /// Join an open game with a hidden move
    CommitMove {
        /// Player address
        player: String,
        /// Game ID
        game_id: u64,
        /// rock, paper or scissors
        #[arg(value_name = "MOVE")]
        mv: String,
        /// Salt to hide the move (random if omitted)
        #[arg(long)]
        salt: Option<String>,
    },
    /// Reveal a committed move
    RevealMove {
        /// Player address
        player: String,
        /// Game ID
        game_id: u64,
        /// Move that was committed
        #[arg(value_name = "MOVE")]
        mv: String,
        /// Salt printed at commit time
        salt: String,
    },
    /// Produce an empty block and settle due games
    Tick,
    /// List open games
    Games,
    /// Show one game with its commits and reveals
    Game {
        /// Game ID
        game_id: u64,
    },
    /// Show the lifetime game counter
    Count,
    /// Show module params
    Params,
    /// Preview which games the next block would settle
    Pending,
    /// Change the commit and reveal windows (authority only)
    UpdateParams {
        /// Authority address
        authority: String,
        /// Commit window in seconds
        commit_window: u64,
        /// Reveal window in seconds
        reveal_window: u64,
    },
    /// Genesis import and export
    #[command(subcommand)]
    Genesis(commands::GenesisCommands),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "rps={},rps_game={},rps_core={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rps")
    });

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    let config = CliConfig::load_or_create(&data_dir).await?;
    let mut node = Node::open(&data_dir, &config).await?;

    let time = match cli.at {
        Some(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
            .with_context(|| format!("block time {} is out of range", secs))?,
        None => Utc::now(),
    };

    // Execute command
    let result = match cli.command {
        Commands::Account(cmd) => commands::handle_account_command(cmd, &mut node).await,
        Commands::NewGame {
            player,
            mv,
            fee,
            salt,
        } => commands::game::new_game(&mut node, time, &player, &mv, fee, salt).await,
        Commands::CommitMove {
            player,
            game_id,
            mv,
            salt,
        } => commands::game::commit_move(&mut node, time, &player, game_id, &mv, salt).await,
        Commands::RevealMove {
            player,
            game_id,
            mv,
            salt,
        } => commands::game::reveal_move(&mut node, time, &player, game_id, &mv, &salt).await,
        Commands::Tick => commands::game::tick(&mut node, time).await,
        Commands::Games => commands::query::list_games(&node),
        Commands::Game { game_id } => commands::query::show_game(&node, game_id),
        Commands::Count => commands::query::show_count(&node),
        Commands::Params => commands::query::show_params(&node),
        Commands::Pending => commands::query::show_pending(&node, time),
        Commands::UpdateParams {
            authority,
            commit_window,
            reveal_window,
        } => {
            commands::game::update_params(&mut node, time, &authority, commit_window, reveal_window)
                .await
        }
        Commands::Genesis(cmd) => commands::handle_genesis_command(cmd, &mut node).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
