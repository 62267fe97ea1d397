//! Account address type.

use crate::error::TypesError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte account address, rendered as `0x`-prefixed lowercase hex.
///
/// Address derivation belongs to the host environment; the ledger only
/// compares and stores addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose numeric value is `value` (big-endian, zero padded).
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The numeric value of this address if it fits in a `u64`.
    pub fn low_u64(&self) -> Option<u64> {
        if self.0[..12].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[12..]);
        Some(u64::from_be_bytes(low))
    }

    /// Whether this address, read as a number, is no greater than `limit`.
    pub fn is_numeric_at_most(&self, limit: u64) -> bool {
        self.low_u64().is_some_and(|value| value <= limit)
    }

    /// Parse a hex address, with or without the `0x` prefix.
    ///
    /// Short forms such as `0xf4240` are left-padded with zeros.
    pub fn parse(s: &str) -> Result<Self, TypesError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() || digits.len() > Self::LEN * 2 {
            return Err(TypesError::InvalidAddress(s.to_string()));
        }
        let padded = format!("{:0>40}", digits);
        let decoded =
            hex::decode(&padded).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::parse(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; 20]>::deserialize(deserializer).map(Self)
        }
    }
}
