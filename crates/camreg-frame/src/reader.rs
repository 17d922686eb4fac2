use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::codec::{
    decode_frame_bytes, take_frame, DecodedFrame, FrameConfig, HEADER, LENGTH_FIELD_LEN,
};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;

/// Reads complete frames from any `Read` stream the caller already owns.
///
/// Handles partial reads and inter-frame noise internally. A frame that fails
/// validation is consumed and reported as an error; the next call continues
/// with the bytes after it.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    rejected: Option<Bytes>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            rejected: None,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<DecodedFrame> {
        loop {
            match take_frame(&mut self.buf, self.config.max_frame_len) {
                Ok(Some(text)) => {
                    let text = text.freeze();
                    return decode_frame_bytes(&text).inspect_err(|err| {
                        tracing::warn!(error = %err, "rejected frame");
                        self.rejected = Some(text.clone());
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    // The header was consumed; the length field is still buffered.
                    let seen = &self.buf[..self.buf.len().min(LENGTH_FIELD_LEN)];
                    let mut text = BytesMut::from(HEADER.as_bytes());
                    text.extend_from_slice(seen);
                    tracing::warn!(error = %err, "rejected frame header");
                    self.rejected = Some(text.freeze());
                    return Err(err);
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Text of the most recently rejected frame.
    ///
    /// When the length field itself was bad, only the header and length field.
    pub fn last_rejected(&self) -> Option<&[u8]> {
        self.rejected.as_deref()
    }

    /// Bytes received but not yet part of a complete frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<DecodedFrame>;

    /// Yields frames and per-frame errors until the stream ends.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Err(FrameError::ConnectionClosed) => None,
            other => Some(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::{encode_frame, FrameConfig};
    use crate::error::FramingKind;
    use crate::register::{Operation, Register};
    use crate::Command;

    fn wire(commands: &[Command]) -> Vec<u8> {
        commands
            .iter()
            .flat_map(|c| c.encode().into_bytes())
            .collect()
    }

    #[test]
    fn read_single_frame() {
        let bytes = encode_frame(Operation::Write, Register::Brightness, 0x80).into_bytes();
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let frame = reader.read_frame().unwrap();

        assert_eq!(
            frame.command().unwrap(),
            Command::write(Register::Brightness, 0x80)
        );
    }

    #[test]
    fn read_multiple_frames_with_line_endings() {
        let mut bytes = Vec::new();
        for command in [
            Command::write(Register::Mirror, 0x01),
            Command::read(Register::FirmwareId),
            Command::write(Register::Shutter, 0x45),
        ] {
            bytes.extend_from_slice(command.encode().as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }

        let reader = FrameReader::new(Cursor::new(bytes));
        let commands: Vec<Command> = reader
            .map(|frame| frame.unwrap().command().unwrap())
            .collect();

        assert_eq!(
            commands,
            vec![
                Command::write(Register::Mirror, 0x01),
                Command::read(Register::FirmwareId),
                Command::write(Register::Shutter, 0x45),
            ]
        );
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[Command::write(Register::Contrast, 0x10)]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.payload, "003010");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let bytes = wire(&[Command::write(Register::Wdr, 0x03)]);
        let mut reader = FrameReader::new(Cursor::new(bytes[..15].to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.buffered(), 15);
    }

    #[test]
    fn corrupted_frame_is_skipped() {
        let mut bytes = "AA5503000C02CAFDC7A455AA".as_bytes().to_vec();
        bytes.extend(wire(&[Command::write(Register::Overlay, 0x01)]));

        let mut reader = FrameReader::new(Cursor::new(bytes));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));

        let frame = reader.read_frame().unwrap();
        assert_eq!(
            frame.command().unwrap(),
            Command::write(Register::Overlay, 0x01)
        );
    }

    #[test]
    fn short_frame_does_not_swallow_next() {
        let mut bytes = b"AA5503000C03CAFDC7A55AA".to_vec();
        bytes.extend(wire(&[Command::write(Register::Overlay, 0x01)]));

        let results: Vec<_> = FrameReader::new(Cursor::new(bytes)).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(
            results[0],
            Err(FrameError::Framing(FramingKind::MissingFooter))
        ));
        assert_eq!(
            results[1].as_ref().unwrap().command().unwrap(),
            Command::write(Register::Overlay, 0x01)
        );
    }

    #[test]
    fn short_frame_byte_by_byte() {
        let mut bytes = b"AA5503000C03CAFDC7A55AA".to_vec();
        bytes.extend(wire(&[Command::read(Register::SensorId)]));
        let mut reader = FrameReader::new(ByteByByteReader { bytes, pos: 0 });

        assert!(reader.read_frame().unwrap_err().is_framing());
        assert_eq!(
            reader.read_frame().unwrap().command().unwrap(),
            Command::read(Register::SensorId)
        );
    }

    #[test]
    fn rejected_text_is_kept() {
        let mut reader = FrameReader::new(Cursor::new(b"AA5503000C02CAFDC7A455AA".to_vec()));
        assert!(reader.last_rejected().is_none());
        reader.read_frame().unwrap_err();
        assert_eq!(reader.last_rejected(), Some(&b"AA5503000C02CAFDC7A455AA"[..]));

        let mut reader = FrameReader::new(Cursor::new(b"AA55ZZ00".to_vec()));
        reader.read_frame().unwrap_err();
        assert_eq!(reader.last_rejected(), Some(&b"AA55ZZ"[..]));
    }

    #[test]
    fn oversized_frame_in_stream() {
        let mut reader = FrameReader::with_config(
            Cursor::new(b"AA5510".to_vec()),
            FrameConfig::commands_only(),
        );
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLong { .. }));
    }

    #[test]
    fn bad_footer_in_stream() {
        let bytes = "AA5503000C03CAFDC7A455AB".as_bytes().to_vec();
        let mut reader = FrameReader::new(Cursor::new(bytes));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Framing(FramingKind::MissingFooter)));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }
}
