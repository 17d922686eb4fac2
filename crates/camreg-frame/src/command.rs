use std::fmt;

use crate::codec::{encode_frame, COMMAND_PAYLOAD_LEN};
use crate::error::{FramingKind, Result};
use crate::register::{Operation, Register};

/// A single register read or write: the payload of every command frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub operation: Operation,
    pub register: Register,
    pub value: u8,
}

impl Command {
    pub fn new(operation: Operation, register: Register, value: u8) -> Self {
        Self {
            operation,
            register,
            value,
        }
    }

    /// Write `value` to `register`.
    pub fn write(register: Register, value: u8) -> Self {
        Self::new(Operation::Write, register, value)
    }

    /// Request the current value of `register`. The value byte is sent as zero.
    pub fn read(register: Register) -> Self {
        Self::new(Operation::Read, register, 0x00)
    }

    /// The raw payload bytes: operation, register, value.
    pub fn payload(&self) -> [u8; COMMAND_PAYLOAD_LEN] {
        [self.operation.as_u8(), self.register.as_u8(), self.value]
    }

    /// Encode into frame text ready for transmission.
    pub fn encode(&self) -> String {
        encode_frame(self.operation, self.register, self.value)
    }

    /// Split a decoded payload into its fixed one-byte fields.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let [op, reg, value] = payload else {
            return Err(FramingKind::UnexpectedLength(payload.len()).into());
        };
        Ok(Self {
            operation: Operation::try_from(*op)?,
            register: Register::try_from(*reg)?,
            value: *value,
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operation {
            Operation::Write => write!(f, "WRITE {}=0x{:02X}", self.register, self.value),
            Operation::Read => write!(f, "READ {}", self.register),
        }
    }
}
