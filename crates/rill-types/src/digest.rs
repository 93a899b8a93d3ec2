//! Content digests.
//!
//! Everything Rill stores -- message bodies and the header nodes that
//! chain them -- is addressed by the BLAKE3 hash of its bytes. A
//! [`Digest`] is that address: it keys the object store, names the
//! `data` and `prev` targets inside a header, and keys the header cache
//! during gap recovery.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of a digest in bytes (BLAKE3 output size).
pub const DIGEST_LEN: usize = 32;

/// Content address of a stored blob or node.
///
/// Equal bytes hash to equal digests, so republishing a body reuses the
/// stored blob, while the headers pointing at it stay distinct (their
/// `seq` and `prev` differ). Cheap to copy; `Ord` and `Hash` so digests
/// can key maps and sort deterministically.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest. No real content hashes to it; it stands for
    /// "no object" where an address is syntactically required.
    pub const ZERO: Self = Self([0u8; DIGEST_LEN]);

    /// Hash `data` and return its address.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Wrap a hash computed elsewhere (e.g. by a domain-separated hasher).
    pub const fn from_hash(hash: [u8; DIGEST_LEN]) -> Self {
        Self(hash)
    }

    /// Whether this is the [`Digest::ZERO`] sentinel.
    pub fn is_null(&self) -> bool {
        *self == Self::ZERO
    }

    /// The underlying hash bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Full lowercase hex form, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex form (first four bytes) for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl FromStr for Digest {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 2 * DIGEST_LEN {
            return Err(TypeError::InvalidLength {
                expected: 2 * DIGEST_LEN,
                actual: s.len(),
            });
        }
        let mut hash = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut hash).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Ok(Self(hash))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}..)", self.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_bytes_share_an_address() {
        let body = b"same message body";
        assert_eq!(Digest::from_bytes(body), Digest::from_bytes(body));
        assert_ne!(Digest::from_bytes(body), Digest::from_bytes(b"other"));
    }

    #[test]
    fn zero_sentinel_never_matches_content() {
        assert!(Digest::ZERO.is_null());
        assert!(!Digest::from_bytes(b"").is_null());
        assert_eq!(Digest::ZERO.as_bytes(), &[0u8; DIGEST_LEN]);
    }

    #[test]
    fn display_is_parseable_hex() {
        let d = Digest::from_bytes(b"round trip");
        let shown = d.to_string();
        assert_eq!(shown.len(), 2 * DIGEST_LEN);
        assert_eq!(shown.parse::<Digest>().unwrap(), d);
    }

    #[test]
    fn short_hex_prefixes_the_full_form() {
        let d = Digest::from_bytes(b"abbrev");
        assert_eq!(d.short_hex().len(), 8);
        assert!(d.to_hex().starts_with(&d.short_hex()));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(matches!(
            "abcd".parse::<Digest>(),
            Err(TypeError::InvalidLength { .. })
        ));
    }

    #[test]
    fn parse_rejects_non_hex() {
        let not_hex = "zz".repeat(DIGEST_LEN);
        assert!(matches!(
            not_hex.parse::<Digest>(),
            Err(TypeError::InvalidHex(_))
        ));
    }

    proptest! {
        #[test]
        fn any_hash_survives_hex_roundtrip(hash in prop::array::uniform32(any::<u8>())) {
            let d = Digest::from_hash(hash);
            prop_assert_eq!(d.to_hex().parse::<Digest>().unwrap(), d);
        }
    }
}
