use crate::address::{AddressCodec, Bech32Codec};
use crate::error::{CoreError, Result};
use crate::types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Human-readable bech32 prefix for account addresses
    pub address_prefix: String,
    /// Name of the module that owns the staking pool
    pub module_account: String,
    /// Name of the module allowed to change game params
    pub authority_module: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            address_prefix: "rps".to_string(),
            module_account: "rps".to_string(),
            authority_module: "gov".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.address_prefix.is_empty() {
            return Err(CoreError::config("Address prefix cannot be empty"));
        }

        if self.module_account.is_empty() {
            return Err(CoreError::config("Module account name cannot be empty"));
        }

        if self.authority_module.is_empty() {
            return Err(CoreError::config("Authority module name cannot be empty"));
        }

        if self.module_account == self.authority_module {
            return Err(CoreError::config(
                "Authority module must differ from the pool module",
            ));
        }

        Bech32Codec::new(&self.address_prefix)?;
        Ok(())
    }

    pub fn codec(&self) -> Result<Bech32Codec> {
        Bech32Codec::new(&self.address_prefix)
    }

    /// Bech32 form of the authority module address.
    pub fn authority_address(&self) -> Result<String> {
        self.codec()?
            .bytes_to_string(&Address::module(&self.authority_module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LedgerConfig::default();
        config.validate().unwrap();

        let authority = config.authority_address().unwrap();
        assert!(authority.starts_with("rps1"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LedgerConfig::default();
        config.address_prefix = String::new();
        assert!(config.validate().is_err());

        let mut config = LedgerConfig::default();
        config.authority_module = "rps".to_string();
        assert!(config.validate().is_err());
    }
}
