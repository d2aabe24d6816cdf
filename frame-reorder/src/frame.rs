/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Contains the decoded frame handle that moves through the reorder buffer.

use serde::{Deserialize, Serialize};

/// Planar layout of the raw samples carried by a [`DecodedFrame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit Y plane followed by quarter-size U and V planes.
    Yuv420p,
    /// 8-bit Y plane followed by half-width, full-height U and V planes.
    Yuv422p,
    /// 8-bit Y, U and V planes at full resolution.
    Yuv444p,
    /// A single 8-bit luma plane.
    Gray8,
}

impl PixelFormat {
    /// Number of bytes a tightly packed picture of this format occupies.
    pub fn frame_size(&self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        let luma = w * h;
        let chroma = match self {
            PixelFormat::Yuv420p => w.div_ceil(2) * h.div_ceil(2),
            PixelFormat::Yuv422p => w.div_ceil(2) * h,
            PixelFormat::Yuv444p => luma,
            PixelFormat::Gray8 => 0,
        };
        luma + 2 * chroma
    }
}

/// A decoded picture plus the sequence metadata used to put it in order.
///
/// The frame is owned by exactly one stage at a time: the decoder, then the
/// heap, then the writer. Nothing in this crate clones frame payloads.
#[derive(Debug, Serialize, Deserialize)]
pub struct DecodedFrame {
    /// Index in bitstream decode order, assigned by the decoder.
    pub coded_index: u64,
    /// Index in presentation order. When the decoder does not know it, the
    /// controller fills it in from its arrival counter.
    pub display_index: Option<u64>,
    /// Synthetic presentation timestamp, set when the frame is emitted.
    pub pts: Option<u64>,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    /// Planar sample data, tightly packed.
    pub data: Vec<u8>,
}

impl DecodedFrame {
    pub fn new(
        coded_index: u64,
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            coded_index,
            display_index: None,
            pts: None,
            width,
            height,
            pixel_format,
            data,
        }
    }

    /// Tags the frame with a display index known to the decoder.
    pub fn with_display_index(mut self, display_index: u64) -> Self {
        self.display_index = Some(display_index);
        self
    }

    /// A frame with no picture data, handy for exercising ordering logic.
    pub fn empty(coded_index: u64) -> Self {
        Self::new(coded_index, 0, 0, PixelFormat::Yuv420p, Vec::new())
    }

    /// Whether the payload length matches the declared geometry and format.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.pixel_format.frame_size(self.width, self.height)
    }
}
