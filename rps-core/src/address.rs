use crate::error::{CoreError, Result};
use crate::types::Address;
use bitcoin::bech32::{self, Bech32, Hrp};

/// Maximum address payload accepted by the codec.
pub const MAX_ADDRESS_LEN: usize = 255;

/// Converts between the textual account form players submit and raw address bytes.
pub trait AddressCodec {
    fn string_to_bytes(&self, text: &str) -> Result<Address>;
    fn bytes_to_string(&self, address: &Address) -> Result<String>;
}

/// Bech32 codec bound to a single human-readable prefix.
#[derive(Debug, Clone)]
pub struct Bech32Codec {
    hrp: Hrp,
}

impl Bech32Codec {
    pub fn new(prefix: &str) -> Result<Self> {
        let hrp = Hrp::parse(prefix)
            .map_err(|e| CoreError::config(format!("invalid bech32 prefix '{}': {}", prefix, e)))?;
        Ok(Self { hrp })
    }

    pub fn prefix(&self) -> &str {
        self.hrp.as_str()
    }
}

impl AddressCodec for Bech32Codec {
    fn string_to_bytes(&self, text: &str) -> Result<Address> {
        if text.trim().is_empty() {
            return Err(CoreError::invalid_address("empty address string"));
        }

        let (hrp, data) = bech32::decode(text)
            .map_err(|e| CoreError::invalid_address(format!("{}: {}", text, e)))?;

        if !hrp.as_str().eq_ignore_ascii_case(self.hrp.as_str()) {
            return Err(CoreError::invalid_address(format!(
                "{}: expected prefix '{}', got '{}'",
                text,
                self.hrp.as_str(),
                hrp.as_str()
            )));
        }

        if data.is_empty() || data.len() > MAX_ADDRESS_LEN {
            return Err(CoreError::invalid_address(format!(
                "{}: address length {} out of range",
                text,
                data.len()
            )));
        }

        Ok(Address::new(data))
    }

    fn bytes_to_string(&self, address: &Address) -> Result<String> {
        if address.is_empty() {
            return Err(CoreError::invalid_address("empty address bytes"));
        }

        bech32::encode::<Bech32>(self.hrp, address.as_bytes())
            .map_err(|e| CoreError::invalid_address(format!("{}: {}", address, e)))
    }
}
