//! `<length>#<json>` framing for backend links.
//!
//! Each frame is the ASCII decimal byte length of a JSON document, a `#`
//! delimiter, then the document itself. The codec is generic over the
//! packet type so both ends of a link can share it.

use std::io;
use std::marker::PhantomData;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Frame delimiter between the length prefix and the JSON body.
const DELIMITER: u8 = b'#';

/// Largest frame accepted by default (16 MiB).
pub const DEFAULT_MAX_FRAME: usize = 16 * 1024 * 1024;

/// Longest length prefix we will scan for before giving up.
const MAX_PREFIX_DIGITS: usize = 20;

/// Errors produced while framing packets.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Socket-level failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The length prefix was not a decimal number.
    #[error("invalid frame length prefix: {0:?}")]
    InvalidLength(String),
    /// The announced frame exceeds the configured maximum.
    #[error("frame of {0} bytes exceeds the maximum frame size")]
    FrameTooLarge(usize),
    /// The frame body was not a valid packet.
    #[error("malformed packet: {0}")]
    Json(#[from] serde_json::Error),
}

/// Frames packets of type `In` on the way in and any `Serialize` on the way out.
#[derive(Debug)]
pub struct PacketCodec<In> {
    max_frame: usize,
    /// Body length of the frame currently being read, once its prefix is consumed.
    pending_len: Option<usize>,
    _marker: PhantomData<fn() -> In>,
}

impl<In> PacketCodec<In> {
    /// Creates a codec with the default maximum frame size.
    pub fn new() -> Self {
        Self::with_max_frame(DEFAULT_MAX_FRAME)
    }

    /// Creates a codec with a custom maximum frame size.
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self {
            max_frame,
            pending_len: None,
            _marker: PhantomData,
        }
    }

    fn read_prefix(&mut self, src: &mut BytesMut) -> Result<Option<usize>, CodecError> {
        let Some(pos) = src.iter().position(|b| *b == DELIMITER) else {
            if src.len() > MAX_PREFIX_DIGITS {
                return Err(CodecError::InvalidLength(
                    String::from_utf8_lossy(&src[..MAX_PREFIX_DIGITS]).into_owned(),
                ));
            }
            return Ok(None);
        };

        let digits = &src[..pos];
        let text = std::str::from_utf8(digits)
            .map_err(|_| CodecError::InvalidLength(String::from_utf8_lossy(digits).into_owned()))?;
        let len: usize = text
            .parse()
            .map_err(|_| CodecError::InvalidLength(text.to_string()))?;
        if len > self.max_frame {
            return Err(CodecError::FrameTooLarge(len));
        }

        src.advance(pos + 1);
        Ok(Some(len))
    }
}

impl<In> Default for PacketCodec<In> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: DeserializeOwned> Decoder for PacketCodec<In> {
    type Item = In;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let len = match self.pending_len {
            Some(len) => len,
            None => match self.read_prefix(src)? {
                Some(len) => {
                    self.pending_len = Some(len);
                    len
                }
                None => return Ok(None),
            },
        };

        if src.len() < len {
            src.reserve(len - src.len());
            return Ok(None);
        }

        self.pending_len = None;
        let body = src.split_to(len);
        let packet = serde_json::from_slice(&body)?;
        Ok(Some(packet))
    }
}

impl<In, Out: Serialize> Encoder<Out> for PacketCodec<In> {
    type Error = CodecError;

    fn encode(&mut self, item: Out, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = serde_json::to_vec(&item)?;
        if body.len() > self.max_frame {
            return Err(CodecError::FrameTooLarge(body.len()));
        }
        let prefix = body.len().to_string();
        dst.reserve(prefix.len() + 1 + body.len());
        dst.put_slice(prefix.as_bytes());
        dst.put_u8(DELIMITER);
        dst.put_slice(&body);
        Ok(())
    }
}
