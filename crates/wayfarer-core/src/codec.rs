//! Text transport for binary tile and glyph payloads.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use wayfarer_types::BinaryPayload;

/// Encodes bytes as padded standard base64 (RFC 4648).
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Wraps an optional lookup result as a payload.
#[must_use]
pub fn payload(bytes: Option<&[u8]>) -> BinaryPayload {
    bytes.map_or_else(BinaryPayload::missing, |found| {
        BinaryPayload::found(encode(found))
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::empty(b"".as_slice(), "")]
    #[case::one_byte(b"\x1a".as_slice(), "Gg==")]
    #[case::two_bytes(b"\x1a\x45".as_slice(), "GkU=")]
    #[case::five_bytes(b"tiles".as_slice(), "dGlsZXM=")]
    fn encodes_with_padding(#[case] input: &[u8], #[case] expected: &str) {
        assert_eq!(encode(input), expected);
    }

    #[rstest]
    #[case::empty(Vec::new())]
    #[case::one_byte(vec![0xff])]
    #[case::not_multiple_of_three((0_u8..=10).collect())]
    fn decoding_restores_input(#[case] input: Vec<u8>) {
        let decoded = STANDARD.decode(encode(&input)).expect("decode base64");
        assert_eq!(decoded, input);
    }

    #[rstest]
    fn absent_bytes_are_not_found() {
        assert!(!payload(None).is_found());
        assert_eq!(payload(Some(b"\x1a")).data_base64(), Some("Gg=="));
    }
}
