//! Account identity: a 20-byte address rendered as lower-case `0x` hex.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// An account identity (governor, institution, student or proposal target).
///
/// Parsing is case-insensitive and the `0x` prefix is optional, so two
/// spellings of the same address always compare equal.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity([u8; 20]);

impl Identity {
    /// Length of the raw address in bytes.
    pub const LEN: usize = 20;

    /// The zero address. Never a valid proposal target.
    pub const ZERO: Self = Self([0u8; 20]);

    /// The standard prefix of the textual form.
    pub const PREFIX: &'static str = "0x";

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parse an address from its hex form, with or without `0x`.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix(Self::PREFIX)
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != Self::LEN * 2 {
            return Err(TypesError::InvalidIdentity(raw.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| TypesError::InvalidIdentity(raw.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}..)", hex::encode(&self.0[..4]))
    }
}

impl FromStr for Identity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIXED: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    #[test]
    fn parsing_normalizes_case() {
        let upper = Identity::parse(MIXED).unwrap();
        let lower = Identity::parse(&MIXED.to_lowercase()).unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.to_string(), MIXED.to_lowercase());
    }

    #[test]
    fn prefix_is_optional() {
        let with = Identity::parse(MIXED).unwrap();
        let without = Identity::parse(&MIXED[2..]).unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn rejects_wrong_length_and_bad_digits() {
        assert!(Identity::parse("0x1234").is_err());
        assert!(Identity::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(Identity::parse("").is_err());
    }

    #[test]
    fn zero_identity_is_detected() {
        let zero = Identity::parse("0x0000000000000000000000000000000000000000").unwrap();
        assert!(zero.is_zero());
        assert_eq!(zero, Identity::ZERO);
        assert!(!Identity::parse(MIXED).unwrap().is_zero());
    }

    #[test]
    fn serializes_as_display_string() {
        let id = Identity::parse(MIXED).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", MIXED.to_lowercase()));
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn bincode_round_trip_preserves_identity() {
        let id = Identity::new([7u8; 20]);
        let bytes = bincode::serialize(&id).unwrap();
        let back: Identity = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, id);
    }
}
