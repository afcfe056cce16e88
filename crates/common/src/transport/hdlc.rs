//! HDLC-style byte stuffing used on the shared-instance socket
//!
//! Each frame is `FLAG || escape(payload) || FLAG`. Inside the payload, `FLAG`
//! and `ESC` bytes are replaced by `ESC, byte ^ ESC_MASK`.

use bytes::{BufMut, Bytes, BytesMut};

pub const FLAG: u8 = 0x7E;
pub const ESC: u8 = 0x7D;
pub const ESC_MASK: u8 = 0x20;

/// Largest payload accepted from the socket; longer frames are discarded
pub const MAX_FRAME_SIZE: usize = 512;

/// Wrap a payload into a complete frame
pub fn frame(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 2);
    out.put_u8(FLAG);
    for &byte in payload {
        if byte == FLAG || byte == ESC {
            out.put_u8(ESC);
            out.put_u8(byte ^ ESC_MASK);
        } else {
            out.put_u8(byte);
        }
    }
    out.put_u8(FLAG);
    out.freeze()
}

/// Incremental frame decoder
///
/// Bytes can arrive split at arbitrary points; `push` returns every frame
/// completed by the new input.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: BytesMut,
    in_frame: bool,
    escape: bool,
    overflow: bool,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();

        for &byte in data {
            if byte == FLAG {
                if self.in_frame && !self.buffer.is_empty() && !self.overflow {
                    frames.push(self.buffer.split().freeze());
                }
                // a closing flag doubles as the opening flag of the next frame
                self.buffer.clear();
                self.in_frame = true;
                self.escape = false;
                self.overflow = false;
                continue;
            }

            if !self.in_frame || self.overflow {
                continue;
            }

            if byte == ESC {
                self.escape = true;
                continue;
            }

            let byte = if self.escape {
                self.escape = false;
                byte ^ ESC_MASK
            } else {
                byte
            };

            if self.buffer.len() >= MAX_FRAME_SIZE {
                tracing::debug!("discarding oversized frame");
                self.overflow = true;
                self.buffer.clear();
                continue;
            }
            self.buffer.put_u8(byte);
        }

        frames
    }
}
