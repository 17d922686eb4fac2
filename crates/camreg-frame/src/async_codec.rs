//! `tokio_util` codec for callers driving an async serial stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame_bytes, take_frame, DecodedFrame, FrameConfig};
use crate::command::Command;
use crate::error::FrameError;

/// Decodes validated frames and encodes register commands.
#[derive(Debug, Clone, Default)]
pub struct AsciiFrameCodec {
    config: FrameConfig,
}

impl AsciiFrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }
}

impl Decoder for AsciiFrameCodec {
    type Item = DecodedFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match take_frame(src, self.config.max_frame_len)? {
            Some(text) => decode_frame_bytes(&text).map(Some),
            None => Ok(None),
        }
    }
}

impl Encoder<Command> for AsciiFrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.encode().as_bytes());
        Ok(())
    }
}
