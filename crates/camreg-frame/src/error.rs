use std::fmt;

/// The specific way a frame failed structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingKind {
    /// The text does not start with the `AA55` header.
    MissingHeader,
    /// The text does not end with the `55AA` footer.
    MissingFooter,
    /// The two length characters are absent or not hex digits.
    InvalidLength,
    /// Fewer payload characters than the length field declares.
    TruncatedPayload,
    /// The payload contains non-hex characters.
    InvalidPayload,
    /// The eight checksum characters are absent or not hex digits.
    InvalidChecksumField,
    /// Extra characters sit between the checksum and the footer.
    TrailingData,
    /// The payload is not the 3-byte operation/register/value shape.
    UnexpectedLength(usize),
    /// The operation byte is neither write nor read.
    UnknownOperation(u8),
    /// The register byte is not a known register address.
    UnknownRegister(u8),
}

impl fmt::Display for FramingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingKind::MissingHeader => write!(f, "missing AA55 header"),
            FramingKind::MissingFooter => write!(f, "missing 55AA footer"),
            FramingKind::InvalidLength => write!(f, "length field is not two hex digits"),
            FramingKind::TruncatedPayload => write!(f, "payload shorter than declared length"),
            FramingKind::InvalidPayload => write!(f, "payload contains non-hex characters"),
            FramingKind::InvalidChecksumField => {
                write!(f, "checksum field is not eight hex digits")
            }
            FramingKind::TrailingData => write!(f, "unexpected characters before footer"),
            FramingKind::UnexpectedLength(len) => {
                write!(f, "expected a 3-byte command payload, got {len} bytes")
            }
            FramingKind::UnknownOperation(op) => write!(f, "unknown operation 0x{op:02X}"),
            FramingKind::UnknownRegister(reg) => write!(f, "unknown register 0x{reg:02X}"),
        }
    }
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame text is structurally malformed.
    #[error("framing error: {0}")]
    Framing(FramingKind),

    /// The transmitted checksum does not match the one computed over the payload.
    #[error("checksum mismatch (expected {expected:08X}, computed {actual:08X})")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// The payload does not fit in the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A declared frame exceeds the configured maximum text length.
    #[error("frame too long ({size} characters, max {max})")]
    FrameTooLong { size: usize, max: usize },

    /// A register or operation name could not be resolved.
    #[error("unknown name: {0}")]
    UnknownName(String),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// Returns true for structural framing failures.
    pub fn is_framing(&self) -> bool {
        matches!(self, FrameError::Framing(_))
    }
}

impl From<FramingKind> for FrameError {
    fn from(kind: FramingKind) -> Self {
        FrameError::Framing(kind)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
