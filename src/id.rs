use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Opaque record handle, rendered as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(transparent)]
pub struct RecordId(Uuid);

#[derive(Debug, thiserror::Error)]
#[error("invalid record id")]
pub struct InvalidId;

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the fixed-width hex form is accepted, not hyphenated uuids.
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidId);
        }
        Uuid::try_parse(s).map(Self).map_err(|_| InvalidId)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_fixed_width_hex() {
        let id = RecordId::new();
        let s = id.to_string();
        assert_eq!(s.len(), 32);
        assert!(s.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(s.parse::<RecordId>().unwrap(), id);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("".parse::<RecordId>().is_err());
        assert!("not-an-id".parse::<RecordId>().is_err());
        assert!("0123456789abcdef0123456789abcdeg".parse::<RecordId>().is_err());
        assert!("67e55044-10b1-426f-9247-bb680e5fe0c8"
            .parse::<RecordId>()
            .is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id: RecordId = "67e5504410b1426f9247bb680e5fe0c8".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"67e5504410b1426f9247bb680e5fe0c8\"");
    }
}
