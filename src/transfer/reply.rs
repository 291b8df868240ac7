use crate::foundation::error::{SkyframeError, SkyframeResult};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// A finished frame, RGBA8 premultiplied, tightly packed, row-major.
///
/// Move-only: there is no `Clone`. Handing a buffer to a channel moves the allocation, so the
/// sender cannot read it afterwards.
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub(crate) fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            data,
        }
    }

    /// Width in physical pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in physical pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames are always premultiplied alpha.
    pub fn premultiplied(&self) -> bool {
        true
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the allocation.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// One pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight-alpha copy, as image encoders expect.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Serialize for PixelBuffer {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut st = s.serialize_struct("PixelBuffer", 3)?;
        st.serialize_field("width", &self.width)?;
        st.serialize_field("height", &self.height)?;
        st.serialize_field("byteLength", &self.data.len())?;
        st.end()
    }
}

/// Successful render: the frame and how long compositing took.
#[derive(Debug, Serialize)]
pub struct RenderReply {
    #[serde(rename = "imageData")]
    image_data: PixelBuffer,
    #[serde(rename = "drawTime")]
    draw_time_ms: f64,
}

impl RenderReply {
    pub(crate) fn new(image_data: PixelBuffer, draw_time_ms: f64) -> Self {
        Self {
            image_data,
            draw_time_ms,
        }
    }

    /// Wall-clock compositing time in milliseconds.
    pub fn draw_time_ms(&self) -> f64 {
        self.draw_time_ms
    }

    /// Borrow the frame.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.image_data
    }

    /// Take ownership of the frame.
    pub fn into_pixels(self) -> PixelBuffer {
        self.image_data
    }
}

/// Failure reply with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    /// What went wrong.
    pub error: String,
}

/// Everything the renderer sends back.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Reply {
    /// A rendered frame.
    Render(RenderReply),
    /// A failed command.
    Error(ErrorReply),
}

impl Reply {
    /// Convert a command outcome into its reply.
    pub fn from_outcome(outcome: SkyframeResult<RenderReply>) -> Self {
        match outcome {
            Ok(r) => Self::Render(r),
            Err(e) => Self::Error(ErrorReply {
                error: e.to_string(),
            }),
        }
    }

    /// The render payload, if this is one.
    pub fn into_render(self) -> Option<RenderReply> {
        match self {
            Self::Render(r) => Some(r),
            Self::Error(_) => None,
        }
    }

    /// The error message, if this is an error.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Render(_) => None,
            Self::Error(e) => Some(&e.error),
        }
    }
}

/// Outbound half of the renderer's mailbox.
///
/// Replies are moved into the channel; the sender keeps nothing.
#[derive(Clone)]
pub struct TransferChannel {
    tx: crossbeam_channel::Sender<Reply>,
}

impl TransferChannel {
    /// Wrap the sending end of the reply channel.
    pub fn new(tx: crossbeam_channel::Sender<Reply>) -> Self {
        Self { tx }
    }

    /// Emit a reply for `outcome`, consuming it.
    pub fn respond(&self, outcome: SkyframeResult<RenderReply>) -> SkyframeResult<()> {
        self.send(Reply::from_outcome(outcome))
    }

    /// Emit an already-built reply.
    pub fn send(&self, reply: Reply) -> SkyframeResult<()> {
        match &reply {
            Reply::Render(r) => tracing::debug!(
                w = r.image_data.width,
                h = r.image_data.height,
                draw_time_ms = r.draw_time_ms,
                "sending frame"
            ),
            Reply::Error(e) => tracing::warn!(error = %e.error, "sending error reply"),
        }
        self.tx
            .send(reply)
            .map_err(|_| SkyframeError::channel("reply receiver is gone"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transfer/reply.rs"]
mod tests;
