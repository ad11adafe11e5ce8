use bitcoin::Amount;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of addresses derived for module accounts.
pub const MODULE_ADDRESS_LEN: usize = 20;

/// Opaque account address. The ledger never interprets the bytes.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(Vec<u8>);

impl Address {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Deterministic address owned by a module rather than a key holder.
    pub fn module(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        Self(digest[..MODULE_ADDRESS_LEN].to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn from_hex(s: &str) -> crate::Result<Self> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| crate::CoreError::invalid_address(format!("{}: {}", s, e)))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A single credit out of the module pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub recipient: Address,
    pub amount: Amount,
}

impl Payout {
    pub fn new(recipient: Address, amount: Amount) -> Self {
        Self { recipient, amount }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_address_is_stable() {
        let a = Address::module("rps");
        let b = Address::module("rps");
        assert_eq!(a, b);
        assert_eq!(a.as_bytes().len(), MODULE_ADDRESS_LEN);
        assert_ne!(a, Address::module("gov"));
    }

    #[test]
    fn test_address_serializes_as_hex() {
        let addr = Address::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"deadbeef\"");

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
        assert!(serde_json::from_str::<Address>("\"zz\"").is_err());
    }
}
