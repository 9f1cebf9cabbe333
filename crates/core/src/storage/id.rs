//! Entry identifiers.
//!
//! An identifier is 128 bits from the OS CSPRNG with the UUID version 4
//! version and variant bits fixed, rendered as 32 lowercase hex digits.
//! Uniqueness and unguessability are what matter; the v4 shape is a
//! convenient, well-known container for them.

use std::fmt;
use std::str::FromStr;

use rand_core::{OsRng, TryRngCore};
use uuid::{Builder, Uuid};

use super::error::StorageError;

/// Length of the textual form of an [`EntryId`].
pub const ENTRY_ID_LEN: usize = 32;

/// Unique, unguessable key naming an entry's directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Draws a fresh identifier from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::IdGeneration` if the random source is unavailable.
    pub fn generate() -> Result<Self, StorageError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StorageError::id_generation(e.to_string()))?;
        Ok(Self::from_random_bytes(bytes))
    }

    /// Builds an identifier from caller-supplied random bytes.
    ///
    /// Version and variant bits are overwritten.
    #[must_use]
    pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
        Self(Builder::from_random_bytes(bytes).into_uuid())
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for EntryId {
    type Err = StorageError;

    /// Accepts exactly the form produced by `Display`: 32 lowercase hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == ENTRY_ID_LEN
            && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !well_formed {
            return Err(StorageError::InvalidId(s.to_string()));
        }

        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| StorageError::InvalidId(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_v4_lower_hex() {
        let id = EntryId::generate().expect("os rng available");
        let text = id.to_string();

        assert_eq!(text.len(), ENTRY_ID_LEN);
        assert!(text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')));
        assert_eq!(id.as_uuid().get_version_num(), 4);
        assert_eq!(id.as_uuid().get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn test_generate_does_not_repeat() {
        let ids: HashSet<EntryId> = (0..1000)
            .map(|_| EntryId::generate().expect("os rng available"))
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_version_and_variant_bits_fixed() {
        let id = EntryId::from_random_bytes([0xff; 16]);
        let text = id.to_string();

        // Nibble 12 carries the version, nibble 16 the variant.
        assert_eq!(&text[12..13], "4");
        assert_eq!(&text[16..17], "b");

        let id = EntryId::from_random_bytes([0x00; 16]);
        assert_eq!(id.to_string(), "00000000000040008000000000000000");
    }

    #[test]
    fn test_parse_round_trip() {
        let id = EntryId::generate().expect("os rng available");
        let parsed: EntryId = id.to_string().parse().expect("valid id");
        assert_eq!(parsed, id);
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("3F2A9C0E8B7D4E1FA6C5B4D3E2F10987")]
    #[case("3f2a9c0e-8b7d-4e1f-a6c5-b4d3e2f10987")]
    #[case("3f2a9c0e8b7d4e1fa6c5b4d3e2f1098")]
    #[case("3f2a9c0e8b7d4e1fa6c5b4d3e2f10987a")]
    #[case("zz2a9c0e8b7d4e1fa6c5b4d3e2f10987")]
    #[case("../../../../../../../../etc/pass")]
    fn test_parse_rejects_malformed(#[case] input: &str) {
        let err = input.parse::<EntryId>().unwrap_err();
        assert!(matches!(err, StorageError::InvalidId(_)));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Any 16 random bytes become a parseable, v4-shaped identifier.
    proptest! {
        #[test]
        fn prop_any_bytes_make_valid_id(bytes in any::<[u8; 16]>()) {
            let id = EntryId::from_random_bytes(bytes);
            let text = id.to_string();

            prop_assert_eq!(text.len(), ENTRY_ID_LEN);
            prop_assert_eq!(id.as_uuid().get_version_num(), 4);
            prop_assert_eq!(text.parse::<EntryId>().ok(), Some(id));
        }
    }
}
