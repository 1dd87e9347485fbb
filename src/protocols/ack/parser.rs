//! Chunk decoding and response formatting.

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::ServerId;

const RESPONSE_PREFIX: &[u8] = b"Your request handled by server No. ";
const RESPONSE_INFIX: &[u8] = b". he received this: \"";
const RESPONSE_SUFFIX: &[u8] = b"\"";

/// Decode a received chunk as text and strip surrounding whitespace.
///
/// Invalid UTF-8 is replaced with U+FFFD. A leading or trailing byte
/// order mark is stripped along with the whitespace.
pub fn decode(chunk: &[u8]) -> String {
    String::from_utf8_lossy(chunk)
        .trim_matches(is_trimmable)
        .to_owned()
}

/// Unicode White_Space except U+0085 (NEL), plus the BOM.
fn is_trimmable(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Build the acknowledgment for one message.
pub fn format_response(id: &ServerId, message: &str) -> Bytes {
    let id = id.as_str().as_bytes();
    let mut out = BytesMut::with_capacity(
        RESPONSE_PREFIX.len()
            + id.len()
            + RESPONSE_INFIX.len()
            + message.len()
            + RESPONSE_SUFFIX.len(),
    );
    out.put_slice(RESPONSE_PREFIX);
    out.put_slice(id);
    out.put_slice(RESPONSE_INFIX);
    out.put_slice(message.as_bytes());
    out.put_slice(RESPONSE_SUFFIX);
    out.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_trims_whitespace() {
        assert_eq!(decode(b"  hello world  \n"), "hello world");
        assert_eq!(decode(b"\r\n\tping\r\n"), "ping");
        assert_eq!(decode(b"inner  spaces stay"), "inner  spaces stay");
    }

    #[test]
    fn test_decode_blank() {
        assert_eq!(decode(b""), "");
        assert_eq!(decode(b" \t\r\n "), "");
    }

    #[test]
    fn test_decode_unicode_whitespace_and_bom() {
        assert_eq!(decode("\u{feff}\u{a0}héllo\u{2003}".as_bytes()), "héllo");
    }

    #[test]
    fn test_decode_keeps_next_line() {
        assert_eq!(decode("\u{85}x".as_bytes()), "\u{85}x");
        assert_eq!(decode(" x\u{85} ".as_bytes()), "x\u{85}");
        assert_eq!(decode("\u{2028}x\u{3000}".as_bytes()), "x");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert_eq!(decode(b" ab\xffcd "), "ab\u{fffd}cd");
    }

    #[test]
    fn test_format_response() {
        let id = ServerId::new("7");
        assert_eq!(
            &format_response(&id, "hello world")[..],
            b"Your request handled by server No. 7. he received this: \"hello world\""
        );
    }

    #[test]
    fn test_format_response_empty_message() {
        let id = ServerId::new("2");
        assert_eq!(
            &format_response(&id, "")[..],
            b"Your request handled by server No. 2. he received this: \"\""
        );
    }

    #[test]
    fn test_format_response_no_escaping() {
        let id = ServerId::new("a b");
        let response = format_response(&id, "say \"hi\"");
        assert_eq!(
            std::str::from_utf8(&response).unwrap(),
            "Your request handled by server No. a b. he received this: \"say \"hi\"\""
        );
    }
}
