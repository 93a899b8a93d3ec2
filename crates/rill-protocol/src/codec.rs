//! Announcement codec.
//!
//! The transport payload for a new head is `[1-byte tag][bincode(Header)]`.
//! Payloads come off a best-effort broadcast so decoding must be strict:
//! anything that does not parse is dropped by the subscriber as malformed.

use crate::error::{ProtocolError, ProtocolResult};
use crate::header::Header;

/// Tag byte for a head announcement.
pub const TAG_ANNOUNCE: u8 = 1;

/// Maximum accepted announcement payload size.
pub const MAX_ANNOUNCEMENT_SIZE: usize = 1024 * 1024;

/// Encode a header announcement: `[tag][bincode payload]`.
pub fn encode_announcement(header: &Header) -> ProtocolResult<Vec<u8>> {
    let payload =
        bincode::serialize(header).map_err(|e| ProtocolError::Serialization(e.to_string()))?;
    if payload.len() + 1 > MAX_ANNOUNCEMENT_SIZE {
        return Err(ProtocolError::TooLarge {
            size: payload.len() + 1,
            max: MAX_ANNOUNCEMENT_SIZE,
        });
    }
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(TAG_ANNOUNCE);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a header announcement.
pub fn decode_announcement(data: &[u8]) -> ProtocolResult<Header> {
    let (&tag, payload) = data.split_first().ok_or(ProtocolError::Empty)?;
    if tag != TAG_ANNOUNCE {
        return Err(ProtocolError::UnknownTag(tag));
    }
    if data.len() > MAX_ANNOUNCEMENT_SIZE {
        return Err(ProtocolError::TooLarge {
            size: data.len(),
            max: MAX_ANNOUNCEMENT_SIZE,
        });
    }
    bincode::deserialize(payload).map_err(|e| ProtocolError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rill_store::DagLink;
    use rill_types::Digest;

    fn header(seq: u64) -> Header {
        Header {
            digest: Digest::from_bytes(&seq.to_le_bytes()),
            seq,
            links: vec![DagLink::new("data", Digest::from_bytes(b"body"))],
        }
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(matches!(decode_announcement(&[]), Err(ProtocolError::Empty)));
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(matches!(
            decode_announcement(&[42, 0, 0]),
            Err(ProtocolError::UnknownTag(42))
        ));
    }

    #[test]
    fn rejects_truncated_body() {
        let mut encoded = encode_announcement(&header(5)).unwrap();
        encoded.truncate(encoded.len() / 2);
        assert!(matches!(
            decode_announcement(&encoded),
            Err(ProtocolError::Deserialization(_))
        ));
    }

    #[test]
    fn rejects_garbage_after_tag() {
        // Valid tag, body that is not a bincode Header.
        let data = [TAG_ANNOUNCE, 0xff, 0xff, 0xff];
        assert!(matches!(
            decode_announcement(&data),
            Err(ProtocolError::Deserialization(_))
        ));
    }

    proptest! {
        #[test]
        fn announcement_roundtrip(seq in any::<u64>()) {
            let h = header(seq);
            let encoded = encode_announcement(&h).unwrap();
            let decoded = decode_announcement(&encoded).unwrap();
            prop_assert_eq!(decoded, h);
        }
    }
}
