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

//! A bounded reorder buffer for decoded video frames.
//!
//! Decoders hand back pictures in the order the bitstream lets them finish,
//! which is rarely the order a viewer should see them in. The
//! [`DrainController`] buffers frames in a [`FrameHeap`] and releases them to
//! a [`FrameWriter`] strictly in coded or display order, one index at a time.

pub mod controller;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod heap;
pub mod pipeline;
pub mod stats;
pub mod writer;
pub mod y4m;

pub use controller::{DrainController, ReorderConfig, DEFAULT_FRAME_DURATION};
pub use decoder::FrameDecoder;
pub use error::{ReorderError, Result};
pub use frame::{DecodedFrame, PixelFormat};
pub use heap::{FrameHeap, OrderingMode, MAX_REFERENCE_FRAMES};
pub use stats::ReorderStats;
pub use writer::{CollectingWriter, FrameWriter};
pub use y4m::{Y4mConfig, Y4mWriter};
