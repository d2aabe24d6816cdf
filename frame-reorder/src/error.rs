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

use thiserror::Error;

/// Result type for reorder operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// Faults raised while reordering a frame stream.
///
/// All of these are fatal for the stream they were raised on. The controller
/// is left in a consistent state, but the output already has (or would get) a
/// hole in it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReorderError {
    /// The heap was full when frame `index` arrived. The frame was dropped.
    #[error("Reorder buffer exhausted: frame {index} rejected at capacity {capacity}")]
    BufferExhausted { index: u64, capacity: usize },

    /// The heap minimum was below the next expected index, which means a
    /// duplicate or out-of-range index came from upstream.
    #[error("Frame index {index} is behind the next expected index {next_expected}")]
    IndexBehind { index: u64, next_expected: u64 },

    /// Input ended with frames still buffered behind a missing index.
    #[error("{} frame(s) stranded waiting for index {next_expected}: {indices:?}", .indices.len())]
    Stranded { next_expected: u64, indices: Vec<u64> },

    #[error("Writer failed on frame {index}: {reason}")]
    WriteFailed { index: u64, reason: String },

    #[error("Decoder failed on input unit {unit}: {reason}")]
    DecodeFailed { unit: u64, reason: String },
}
