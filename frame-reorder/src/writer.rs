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

//! The downstream side of the reorder buffer.

use crate::frame::DecodedFrame;

/// Receives frames in their final order. Ownership of each frame moves into
/// the writer; there is no retry if writing fails.
pub trait FrameWriter {
    fn write_frame(&mut self, frame: DecodedFrame) -> anyhow::Result<()>;
}

impl<W: FrameWriter + ?Sized> FrameWriter for &mut W {
    fn write_frame(&mut self, frame: DecodedFrame) -> anyhow::Result<()> {
        (**self).write_frame(frame)
    }
}

impl<W: FrameWriter + ?Sized> FrameWriter for Box<W> {
    fn write_frame(&mut self, frame: DecodedFrame) -> anyhow::Result<()> {
        (**self).write_frame(frame)
    }
}

/// Keeps every frame it is given, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingWriter {
    frames: Vec<DecodedFrame>,
}

impl CollectingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[DecodedFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<DecodedFrame> {
        self.frames
    }
}

impl FrameWriter for CollectingWriter {
    fn write_frame(&mut self, frame: DecodedFrame) -> anyhow::Result<()> {
        self.frames.push(frame);
        Ok(())
    }
}
