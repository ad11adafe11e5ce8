pub mod account;
pub mod game;
pub mod genesis;
pub mod query;

pub use account::{handle_account_command, AccountCommands};
pub use genesis::{handle_genesis_command, GenesisCommands};

use crate::node::Node;
use rps_core::{Address, AddressCodec};

/// Bech32 form of `address`, falling back to hex for bytes the codec rejects.
pub(crate) fn display_address(node: &Node, address: &Address) -> String {
    node.codec()
        .bytes_to_string(address)
        .unwrap_or_else(|_| address.to_hex())
}
