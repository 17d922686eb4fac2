//! ASCII-hex register command framing for serial image-sensor control.
//!
//! Every command is framed as uppercase hex text:
//! - A 4-character header (`AA55`)
//! - A 2-character payload length in bytes
//! - The payload: operation, register and value, two characters each
//! - An 8-character CRC-32 computed over the raw payload bytes
//! - A 4-character footer (`55AA`)
//!
//! Encoding and decoding are pure; opening and configuring the port is the caller's job.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod register;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

#[cfg(feature = "async")]
pub use async_codec::AsciiFrameCodec;
pub use codec::{
    checksum, decode_frame, decode_frame_bytes, encode_frame, encode_payload, take_frame,
    DecodedFrame, FrameConfig, COMMAND_FRAME_LEN, COMMAND_PAYLOAD_LEN, FOOTER, FRAMING_OVERHEAD,
    HEADER, MAX_FRAME_LEN, MAX_PAYLOAD,
};
pub use command::Command;
pub use error::{FrameError, FramingKind, Result};
pub use reader::FrameReader;
pub use register::{
    Operation, Register, AESPEED_REG, AGC_REG, BRIGHT_REG, CONTRAST_REG, DAYNIGHT_REG,
    DENOISE_REG, FIRM_ID, LOWLIGHT_REG, MIRROR_REG, OVERLAY_REG, READ_OP, SAT_REG, SENSHW_ID,
    SENS_ID, SHARP_REG, SHUTTER_REG, WDR_REG, WRITE_OP,
};
pub use writer::FrameWriter;
