use bytes::{Buf, Bytes, BytesMut};

use crate::command::Command;
use crate::error::{FrameError, FramingKind, Result};
use crate::register::{Operation, Register};

/// Frame start marker.
pub const HEADER: &str = "AA55";

/// Frame end marker.
pub const FOOTER: &str = "55AA";

pub(crate) const LENGTH_FIELD_LEN: usize = 2;
const CHECKSUM_FIELD_LEN: usize = 8;

/// Characters surrounding the payload: header (4) + length (2) + checksum (8) + footer (4).
pub const FRAMING_OVERHEAD: usize =
    HEADER.len() + LENGTH_FIELD_LEN + CHECKSUM_FIELD_LEN + FOOTER.len();

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// Longest possible frame text.
pub const MAX_FRAME_LEN: usize = FRAMING_OVERHEAD + MAX_PAYLOAD * 2;

/// Payload size of a register command (operation, register, value).
pub const COMMAND_PAYLOAD_LEN: usize = 3;

/// Frame text length of a register command.
pub const COMMAND_FRAME_LEN: usize = FRAMING_OVERHEAD + COMMAND_PAYLOAD_LEN * 2;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// CRC-32 (IEEE 802.3) over raw payload bytes.
pub fn checksum(data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Encode a register command into its frame text.
///
/// Wire format:
/// ```text
/// ┌────────┬──────────┬──────────────────┬──────────────┬────────┐
/// │ "AA55" │ LEN (2)  │ PAYLOAD (LEN*2)  │ CRC-32 (8)   │ "55AA" │
/// │        │ hex      │ op ‖ reg ‖ value │ over raw     │        │
/// │        │          │ hex              │ payload      │        │
/// └────────┴──────────┴──────────────────┴──────────────┴────────┘
/// ```
///
/// All fields are uppercase ASCII hex, so a command frame is always 24 characters.
pub fn encode_frame(operation: Operation, register: Register, value: u8) -> String {
    let payload = [operation.as_u8(), register.as_u8(), value];
    let mut out = String::with_capacity(COMMAND_FRAME_LEN);
    write_frame(&mut out, &payload);
    out
}

/// Encode an arbitrary payload of up to 255 bytes.
pub fn encode_payload(payload: &[u8]) -> Result<String> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let mut out = String::with_capacity(FRAMING_OVERHEAD + payload.len() * 2);
    write_frame(&mut out, payload);
    Ok(out)
}

fn write_frame(out: &mut String, payload: &[u8]) {
    out.push_str(HEADER);
    push_hex(out, payload.len() as u32, LENGTH_FIELD_LEN);
    for &byte in payload {
        push_hex(out, u32::from(byte), 2);
    }
    push_hex(out, checksum(payload), CHECKSUM_FIELD_LEN);
    out.push_str(FOOTER);
}

/// A frame that passed structural and checksum validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Payload length in bytes, as declared by the length field.
    pub length: usize,
    /// Payload hex text, exactly as received.
    pub payload: String,
    /// Checksum hex text, exactly as received.
    pub checksum: String,
    bytes: Bytes,
}

impl DecodedFrame {
    /// The raw payload bytes the checksum was verified over.
    pub fn payload_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Split a 3-byte payload into a typed register command.
    pub fn command(&self) -> Result<Command> {
        Command::from_payload(self.payload_bytes())
    }

    /// The total frame text length this frame occupied on the wire.
    pub fn wire_len(&self) -> usize {
        FRAMING_OVERHEAD + self.length * 2
    }
}

/// Decode and validate frame text.
///
/// Checks, in order: header and footer, hex length field, payload long enough
/// for the declared length, hex checksum field, then the CRC-32 itself.
///
/// Length and payload hex may be either case. The checksum must match the
/// uppercase rendering exactly.
pub fn decode_frame(frame: &str) -> Result<DecodedFrame> {
    decode_frame_bytes(frame.as_bytes())
}

/// Decode and validate frame text held as raw bytes.
///
/// Non-ASCII input is rejected as a framing error rather than panicking.
pub fn decode_frame_bytes(frame: &[u8]) -> Result<DecodedFrame> {
    if !frame.starts_with(HEADER.as_bytes()) {
        return Err(FramingKind::MissingHeader.into());
    }
    if !frame.ends_with(FOOTER.as_bytes()) {
        return Err(FramingKind::MissingFooter.into());
    }

    // Header and footer may overlap on very short input ("AA55AA").
    let body = frame
        .get(HEADER.len()..frame.len().saturating_sub(FOOTER.len()))
        .ok_or(FrameError::Framing(FramingKind::InvalidLength))?;

    let length = body
        .get(..LENGTH_FIELD_LEN)
        .and_then(parse_hex_u8)
        .ok_or(FrameError::Framing(FramingKind::InvalidLength))? as usize;

    let payload_end = LENGTH_FIELD_LEN + length * 2;
    let payload_text = body
        .get(LENGTH_FIELD_LEN..payload_end)
        .ok_or(FrameError::Framing(FramingKind::TruncatedPayload))?;
    let payload = unhex(payload_text).ok_or(FrameError::Framing(FramingKind::InvalidPayload))?;

    let checksum_end = payload_end + CHECKSUM_FIELD_LEN;
    let checksum_text = body
        .get(payload_end..checksum_end)
        .ok_or(FrameError::Framing(FramingKind::InvalidChecksumField))?;
    let expected = parse_hex_u32(checksum_text)
        .ok_or(FrameError::Framing(FramingKind::InvalidChecksumField))?;

    if body.len() != checksum_end {
        return Err(FramingKind::TrailingData.into());
    }

    // Sent uppercase only, so compare as text.
    let actual = checksum(&payload);
    let mut rendered = String::with_capacity(CHECKSUM_FIELD_LEN);
    push_hex(&mut rendered, actual, CHECKSUM_FIELD_LEN);
    if checksum_text != rendered.as_bytes() {
        tracing::debug!(expected, actual, "frame checksum mismatch");
        return Err(FrameError::ChecksumMismatch { expected, actual });
    }

    Ok(DecodedFrame {
        length,
        payload: ascii_text(payload_text),
        checksum: ascii_text(checksum_text),
        bytes: Bytes::from(payload),
    })
}

/// Pull the next complete frame's text out of a receive buffer.
///
/// Bytes before a header are discarded (line noise, CR/LF between frames).
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet. On
/// a bad length field or an oversized declared frame, the header is consumed
/// so the next call resynchronizes on the following one.
///
/// If the footer is not where the length field puts it, the frame was cut
/// short. Only the text up to the next header is returned, so decoding it
/// reports the error and the frame after it is still delivered.
pub fn take_frame(src: &mut BytesMut, max_frame_len: usize) -> Result<Option<BytesMut>> {
    let header = HEADER.as_bytes();

    match find(src, header) {
        Some(0) => {}
        Some(pos) => {
            tracing::debug!(skipped = pos, "discarding bytes before frame header");
            src.advance(pos);
        }
        None => {
            let keep = partial_header_suffix(src);
            let discard = src.len() - keep;
            if discard > 0 {
                tracing::debug!(skipped = discard, "discarding bytes without frame header");
                src.advance(discard);
            }
            return Ok(None);
        }
    }

    if src.len() < header.len() + LENGTH_FIELD_LEN {
        return Ok(None); // Need more data
    }

    let Some(length) = parse_hex_u8(&src[header.len()..header.len() + LENGTH_FIELD_LEN]) else {
        src.advance(header.len());
        return Err(FramingKind::InvalidLength.into());
    };

    let total = FRAMING_OVERHEAD + length as usize * 2;
    if total > max_frame_len {
        src.advance(header.len());
        return Err(FrameError::FrameTooLong {
            size: total,
            max: max_frame_len,
        });
    }

    if src.len() < total {
        return Ok(None); // Need more data
    }

    if src[total - FOOTER.len()..total] == *FOOTER.as_bytes() {
        return Ok(Some(src.split_to(total)));
    }

    // A header can't overlap itself, so searching past it is safe.
    let cut = match find(&src[header.len()..total], header) {
        Some(pos) => header.len() + pos,
        None => total - partial_header_suffix(&src[..total]),
    };
    tracing::debug!(declared = total, kept = cut, "frame cut short before its footer");
    Ok(Some(src.split_to(cut)))
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum accepted frame text length. Default: [`MAX_FRAME_LEN`].
    pub max_frame_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_len: MAX_FRAME_LEN,
        }
    }
}

impl FrameConfig {
    /// Only accept frames shaped like register commands.
    pub fn commands_only() -> Self {
        Self {
            max_frame_len: COMMAND_FRAME_LEN,
        }
    }
}

fn push_hex(out: &mut String, value: u32, digits: usize) {
    for shift in (0..digits).rev() {
        let nibble = (value >> (shift * 4)) & 0xF;
        out.push(HEX_DIGITS[nibble as usize] as char);
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

pub(crate) fn parse_hex_u8(pair: &[u8]) -> Option<u8> {
    match pair {
        [hi, lo] => Some(hex_value(*hi)? << 4 | hex_value(*lo)?),
        _ => None,
    }
}

fn parse_hex_u32(text: &[u8]) -> Option<u32> {
    if text.len() != CHECKSUM_FIELD_LEN {
        return None;
    }
    text.iter()
        .try_fold(0u32, |acc, &c| Some(acc << 4 | u32::from(hex_value(c)?)))
}

fn unhex(text: &[u8]) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.chunks_exact(2).map(parse_hex_u8).collect()
}

fn ascii_text(text: &[u8]) -> String {
    text.iter().map(|&c| c as char).collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn partial_header_suffix(buf: &[u8]) -> usize {
    let header = HEADER.as_bytes();
    (1..header.len())
        .rev()
        .find(|&k| buf.ends_with(&header[..k]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WDR_ON: &str = "AA5503000C03CAFDC7A455AA";

    #[test]
    fn test_encode_known_frame() {
        let frame = encode_frame(Operation::Write, Register::Wdr, 0x03);
        assert_eq!(frame, WDR_ON);
        assert_eq!(frame.len(), COMMAND_FRAME_LEN);
    }

    #[test]
    fn test_checksum_over_raw_bytes() {
        assert_eq!(checksum(&[0x00, 0x0C, 0x03]), 0xCAFD_C7A4);
        assert_ne!(checksum(b"000C03"), 0xCAFD_C7A4);
    }

    #[test]
    fn test_encode_is_uppercase_and_padded() {
        let frame = encode_frame(Operation::Read, Register::Overlay, 0x0a);
        assert!(frame.starts_with("AA550301"));
        assert_eq!(&frame[6..12], "013C0A");
        assert!(frame
            .bytes()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_decode_known_frame() {
        let decoded = decode_frame(WDR_ON).unwrap();
        assert_eq!(decoded.length, 3);
        assert_eq!(decoded.payload, "000C03");
        assert_eq!(decoded.checksum, "CAFDC7A4");
        assert_eq!(decoded.payload_bytes(), &[0x00, 0x0C, 0x03]);
        assert_eq!(decoded.wire_len(), WDR_ON.len());

        let command = decoded.command().unwrap();
        assert_eq!(command, Command::write(Register::Wdr, 0x03));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for register in Register::ALL {
            for operation in [Operation::Write, Operation::Read] {
                for value in [0x00, 0x01, 0x7F, 0xA4, 0xFF] {
                    let frame = encode_frame(operation, register, value);
                    let command = decode_frame(&frame).unwrap().command().unwrap();
                    assert_eq!(command.operation, operation);
                    assert_eq!(command.register, register);
                    assert_eq!(command.value, value);
                }
            }
        }
    }

    #[test]
    fn test_decode_missing_header() {
        let err = decode_frame(&WDR_ON[1..]).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::MissingHeader)));
    }

    #[test]
    fn test_decode_missing_footer() {
        let err = decode_frame(&WDR_ON[..WDR_ON.len() - 1]).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::MissingFooter)));
    }

    #[test]
    fn test_decode_non_hex_length() {
        let bad = WDR_ON.replacen("AA5503", "AA55G3", 1);
        let err = decode_frame(&bad).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::InvalidLength)));
    }

    #[test]
    fn test_decode_overlapping_markers() {
        let err = decode_frame("AA55AA").unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::InvalidLength)));
    }

    #[test]
    fn test_decode_truncated_payload() {
        let err = decode_frame("AA5503000C55AA").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Framing(FramingKind::TruncatedPayload)
        ));
    }

    #[test]
    fn test_decode_short_checksum_field() {
        let err = decode_frame("AA5503000C03CAFD55AA").unwrap_err();
        assert!(matches!(
            err,
            FrameError::Framing(FramingKind::InvalidChecksumField)
        ));
    }

    #[test]
    fn test_decode_non_hex_checksum_field() {
        let bad = WDR_ON.replace("CAFDC7A4", "CAFDC7AZ");
        let err = decode_frame(&bad).unwrap_err();
        assert!(matches!(
            err,
            FrameError::Framing(FramingKind::InvalidChecksumField)
        ));
    }

    #[test]
    fn test_decode_non_hex_payload() {
        let bad = WDR_ON.replace("000C03", "000CX3");
        let err = decode_frame(&bad).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::InvalidPayload)));
    }

    #[test]
    fn test_decode_trailing_data() {
        let bad = WDR_ON.replace("C7A455AA", "C7A40055AA");
        let err = decode_frame(&bad).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::TrailingData)));
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        let bad = WDR_ON.replace("000C03", "000C02");
        match decode_frame(&bad).unwrap_err() {
            FrameError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, 0xCAFD_C7A4);
                assert_eq!(actual, checksum(&[0x00, 0x0C, 0x02]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_flipped_checksum_chars() {
        let start = HEADER.len() + LENGTH_FIELD_LEN + COMMAND_PAYLOAD_LEN * 2;
        for pos in start..start + CHECKSUM_FIELD_LEN {
            let mut bytes = WDR_ON.as_bytes().to_vec();
            bytes[pos] = if bytes[pos] == b'0' { b'1' } else { b'0' };
            let err = decode_frame_bytes(&bytes).unwrap_err();
            assert!(
                matches!(err, FrameError::ChecksumMismatch { .. }),
                "position {pos}: {err:?}"
            );
        }
    }

    #[test]
    fn test_decode_accepts_lowercase_payload_hex() {
        let decoded = decode_frame("AA5503000c03CAFDC7A455AA").unwrap();
        assert_eq!(decoded.payload, "000c03");
        assert_eq!(decoded.command().unwrap().register, Register::Wdr);
    }

    #[test]
    fn test_decode_lowercase_checksum_is_mismatch() {
        for frame in ["AA5503000C03CAFDC7a455AA", "AA5503000c03cafdc7a455AA"] {
            match decode_frame(frame).unwrap_err() {
                FrameError::ChecksumMismatch { expected, actual } => {
                    assert_eq!(expected, 0xCAFD_C7A4);
                    assert_eq!(actual, 0xCAFD_C7A4);
                }
                other => panic!("{frame}: unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_decode_non_ascii_does_not_panic() {
        let err = decode_frame("AA5503000C\u{e9}3CAFDC7A455AA").unwrap_err();
        assert!(err.is_framing());
    }

    #[test]
    fn test_encode_payload_generic_length() {
        let frame = encode_payload(&[0x01, 0x02]).unwrap();
        assert!(frame.starts_with("AA55020102"));
        let decoded = decode_frame(&frame).unwrap();
        assert_eq!(decoded.length, 2);
        assert!(matches!(
            decoded.command(),
            Err(FrameError::Framing(FramingKind::UnexpectedLength(2)))
        ));

        let empty = encode_payload(&[]).unwrap();
        assert_eq!(empty.len(), FRAMING_OVERHEAD);
        assert_eq!(decode_frame(&empty).unwrap().length, 0);
    }

    #[test]
    fn test_encode_payload_too_large() {
        let err = encode_payload(&[0u8; MAX_PAYLOAD + 1]).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 256, .. }));
    }

    #[test]
    fn test_take_frame_skips_noise() {
        let mut buf = BytesMut::from(format!("\r\nxx{WDR_ON}AA55").as_bytes());
        let text = take_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(text.as_ref(), WDR_ON.as_bytes());
        assert_eq!(buf.as_ref(), b"AA55");
        assert!(take_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());
    }

    #[test]
    fn test_take_frame_incomplete() {
        let mut buf = BytesMut::from(&WDR_ON.as_bytes()[..10]);
        assert!(take_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_take_frame_keeps_partial_header() {
        let mut buf = BytesMut::from(&b"garbageAA5"[..]);
        assert!(take_frame(&mut buf, MAX_FRAME_LEN).unwrap().is_none());
        assert_eq!(buf.as_ref(), b"AA5");
    }

    #[test]
    fn test_take_frame_bad_length_resyncs() {
        let mut buf = BytesMut::from(format!("AA55ZZ{WDR_ON}").as_bytes());
        let err = take_frame(&mut buf, MAX_FRAME_LEN).unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::InvalidLength)));
        let text = take_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(text.as_ref(), WDR_ON.as_bytes());
    }

    #[test]
    fn test_take_frame_short_frame_keeps_next_header() {
        let next = encode_frame(Operation::Write, Register::Overlay, 0x01);
        let short = "AA5503000C03CAFDC7A55AA";
        let mut buf = BytesMut::from(format!("{short}{next}").as_bytes());

        let text = take_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert!(short.as_bytes().starts_with(&text));
        assert!(matches!(
            decode_frame_bytes(&text),
            Err(FrameError::Framing(FramingKind::MissingFooter))
        ));

        let text = take_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(text.as_ref(), next.as_bytes());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_take_frame_short_frame_keeps_partial_next_header() {
        let mut buf = BytesMut::from(&b"AA5503000C03CAFDC7A55AAA"[..]);
        let text = take_frame(&mut buf, MAX_FRAME_LEN).unwrap().unwrap();
        assert_eq!(text.as_ref(), b"AA5503000C03CAFDC7A55A");
        assert_eq!(buf.as_ref(), b"AA");
    }

    #[test]
    fn test_take_frame_too_long() {
        let mut buf = BytesMut::from(&b"AA55FF"[..]);
        let err = take_frame(&mut buf, COMMAND_FRAME_LEN).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLong { size: 528, max: 24 }));
    }

    #[test]
    fn test_frame_config_defaults() {
        assert_eq!(FrameConfig::default().max_frame_len, MAX_FRAME_LEN);
        assert_eq!(FrameConfig::commands_only().max_frame_len, 24);
        assert_eq!(MAX_FRAME_LEN, 528);
    }
}
