use std::io::{ErrorKind, Write};

use crate::codec::{encode_payload, FrameConfig};
use crate::command::Command;
use crate::error::{FrameError, Result};
use crate::register::{Operation, Register};

/// Writes complete frames to any `Write` stream the caller already owns.
pub struct FrameWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Write a register command frame (blocking).
    pub fn write_command(&mut self, command: &Command) -> Result<()> {
        tracing::debug!(%command, "writing command frame");
        self.write_text(&command.encode())
    }

    /// Encode and send a single register operation.
    pub fn send(&mut self, operation: Operation, register: Register, value: u8) -> Result<()> {
        self.write_command(&Command::new(operation, register, value))
    }

    /// Encode and send an arbitrary payload.
    pub fn write_payload(&mut self, payload: &[u8]) -> Result<()> {
        let text = encode_payload(payload)?;
        self.write_text(&text)
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        if text.len() > self.config.max_frame_len {
            return Err(FrameError::FrameTooLong {
                size: text.len(),
                max: self.config.max_frame_len,
            });
        }

        let bytes = text.as_bytes();
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;
    use crate::reader::FrameReader;

    #[test]
    fn write_command_produces_frame_text() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .write_command(&Command::write(Register::Wdr, 0x03))
            .unwrap();
        assert_eq!(writer.into_inner(), b"AA5503000C03CAFDC7A455AA");
    }

    #[test]
    fn writer_to_reader_roundtrip() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(Operation::Write, Register::Denoise, 0x09).unwrap();
        writer.send(Operation::Read, Register::SensorHwId, 0x00).unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(
            reader.read_frame().unwrap().command().unwrap(),
            Command::write(Register::Denoise, 0x09)
        );
        assert_eq!(
            reader.read_frame().unwrap().command().unwrap(),
            Command::read(Register::SensorHwId)
        );
    }

    #[test]
    fn command_only_writer_rejects_long_payload() {
        let mut writer = FrameWriter::with_config(Vec::new(), FrameConfig::commands_only());
        let err = writer.write_payload(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLong { size: 26, max: 24 }));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn interrupted_writes_are_retried() {
        let mut writer = FrameWriter::new(FlakyWriter {
            written: Vec::new(),
            interrupts: 2,
        });
        writer
            .write_command(&Command::write(Register::Overlay, 0x00))
            .unwrap();
        assert_eq!(writer.get_ref().written.len(), 24);
    }

    #[test]
    fn zero_length_write_is_closed() {
        let mut writer = FrameWriter::new(ClosedWriter);
        let err = writer
            .write_command(&Command::read(Register::FirmwareId))
            .unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    struct FlakyWriter {
        written: Vec<u8>,
        interrupts: usize,
    }

    impl Write for FlakyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.interrupts > 0 {
                self.interrupts -= 1;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            let n = buf.len().min(5);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
