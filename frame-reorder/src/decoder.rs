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

//! The upstream side of the reorder buffer.

use crate::frame::DecodedFrame;

/// Turns one unit of compressed input into zero or one decoded frame.
///
/// Implementations must set `coded_index`. They should also set
/// `display_index` when the bitstream carries it; otherwise the controller
/// derives it from arrival order.
pub trait FrameDecoder {
    /// One unit of compressed input, typically a demuxed packet.
    type Unit;

    /// Returns `Ok(None)` when the unit produced no displayable frame.
    fn decode(&mut self, unit: Self::Unit) -> anyhow::Result<Option<DecodedFrame>>;
}

impl<D: FrameDecoder + ?Sized> FrameDecoder for &mut D {
    type Unit = D::Unit;

    fn decode(&mut self, unit: Self::Unit) -> anyhow::Result<Option<DecodedFrame>> {
        (**self).decode(unit)
    }
}

/// A decoder whose input units are already decoded.
///
/// Useful for replaying a captured decoder output sequence, including the
/// `None` gaps where a real decoder was still buffering.
#[derive(Debug, Default)]
pub struct PassthroughDecoder;

impl FrameDecoder for PassthroughDecoder {
    type Unit = Option<DecodedFrame>;

    fn decode(&mut self, unit: Self::Unit) -> anyhow::Result<Option<DecodedFrame>> {
        Ok(unit)
    }
}
