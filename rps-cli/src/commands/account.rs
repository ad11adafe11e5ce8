use crate::node::Node;
use anyhow::Result;
use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use rand::RngCore;
use rps_core::{Address, AddressCodec, Amount};

/// Length of freshly generated account addresses
const ACCOUNT_LEN: usize = 20;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Generate a new account address
    New,
    /// Credit an account from the faucet
    Fund {
        /// Account address
        address: String,
        /// Amount in satoshis
        amount: u64,
    },
    /// Show an account balance
    Balance {
        /// Account address
        address: String,
    },
    /// List all balances and the staking pool
    List,
}

pub async fn handle_account_command(cmd: AccountCommands, node: &mut Node) -> Result<()> {
    match cmd {
        AccountCommands::New => {
            let mut bytes = [0u8; ACCOUNT_LEN];
            rand::thread_rng().fill_bytes(&mut bytes);
            let address = node.codec().bytes_to_string(&Address::new(bytes.to_vec()))?;

            println!("New account: {}", address);
            println!();
            println!("Fund it with:");
            println!("rps account fund {} <sats>", address);
        }
        AccountCommands::Fund { address, amount } => {
            let balance = node.fund(&address, Amount::from_sat(amount)).await?;
            println!("Funded {} with {} sats", address, amount);
            println!("Balance: {} sats", balance.to_sat());
        }
        AccountCommands::Balance { address } => {
            let balance = node.balance(&address)?;
            println!("{}: {} sats", address, balance.to_sat());
        }
        AccountCommands::List => {
            let accounts = node.accounts();

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Account", "Balance (sats)"]);

            for (address, balance) in accounts.balances() {
                table.add_row(vec![
                    super::display_address(node, address),
                    balance.to_sat().to_string(),
                ]);
            }
            table.add_row(vec![
                format!("{} (pool)", accounts.module()),
                accounts.pool_balance().to_sat().to_string(),
            ]);

            println!("{}", table);
        }
    }

    Ok(())
}
