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

//! The DrainController, which buffers decoded frames and releases them to a
//! writer strictly in order.

use crate::error::{ReorderError, Result};
use crate::frame::DecodedFrame;
use crate::heap::{FrameHeap, OrderingMode};
use crate::stats::ReorderStats;
use crate::writer::FrameWriter;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Presentation time units per frame. 1001 ticks against a 30000 Hz clock
/// gives NTSC's 29.97 fps.
pub const DEFAULT_FRAME_DURATION: u64 = 1001;

/// Per-stream reorder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderConfig {
    /// Which index the output follows
    pub mode: OrderingMode,
    /// Ticks added to the presentation timestamp per emitted frame
    pub frame_duration: u64,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            mode: OrderingMode::Coded,
            frame_duration: DEFAULT_FRAME_DURATION,
        }
    }
}

impl ReorderConfig {
    pub fn with_mode(mode: OrderingMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Reorders one stream.
///
/// Every frame, in order or not, goes through the heap. After each insert the
/// controller pops frames for as long as the heap minimum is exactly the next
/// expected index, then hands control back so the caller can decode more.
pub struct DrainController<W: FrameWriter> {
    heap: FrameHeap,
    /// Index the next emitted frame must carry
    next_expected: u64,
    /// Displayable frames seen so far, used to fill in missing display indices
    arrivals: u64,
    frame_duration: u64,
    stats: ReorderStats,
    writer: W,
}

impl<W: FrameWriter> DrainController<W> {
    pub fn new(config: ReorderConfig, writer: W) -> Self {
        Self {
            heap: FrameHeap::new(config.mode),
            next_expected: 0,
            arrivals: 0,
            frame_duration: config.frame_duration,
            stats: ReorderStats::new(),
            writer,
        }
    }

    /// Buffers `frame` and emits every frame that became eligible.
    ///
    /// Returns how many frames were written. Zero means the heap minimum is
    /// still ahead of the next expected index and more input is needed.
    pub fn ingest(&mut self, mut frame: DecodedFrame) -> Result<usize> {
        if frame.display_index.is_none() {
            frame.display_index = Some(self.arrivals);
        }
        self.arrivals += 1;

        let mode = self.heap.mode();
        let key = mode.key(&frame);
        if self.heap.insert(frame).is_err() {
            let capacity = self.heap.capacity();
            log::error!(
                "Reorder buffer exhausted at {capacity} frames, dropping frame {key} while waiting for {}",
                self.next_expected
            );
            return Err(ReorderError::BufferExhausted {
                index: key,
                capacity,
            });
        }
        self.stats.frame_ingested(key, self.next_expected);
        log::debug!(
            "Buffered frame {key}, next expected {}, {} buffered",
            self.next_expected,
            self.heap.len()
        );

        let emitted = self.drain()?;
        self.stats.buffer_level(self.heap.len());
        Ok(emitted)
    }

    fn drain(&mut self) -> Result<usize> {
        let mode = self.heap.mode();
        let mut emitted = 0;

        while let Some(key) = self.heap.peek_min().map(|f| mode.key(f)) {
            match key.cmp(&self.next_expected) {
                Ordering::Greater => break,
                Ordering::Less => {
                    self.heap.get_min();
                    log::error!(
                        "Frame {key} surfaced after index {} was already emitted",
                        self.next_expected
                    );
                    return Err(ReorderError::IndexBehind {
                        index: key,
                        next_expected: self.next_expected,
                    });
                }
                Ordering::Equal => {
                    let Some(mut frame) = self.heap.get_min() else {
                        break;
                    };
                    frame.pts = Some(self.next_expected * self.frame_duration);
                    self.writer
                        .write_frame(frame)
                        .map_err(|e| ReorderError::WriteFailed {
                            index: key,
                            reason: format!("{e:#}"),
                        })?;
                    log::debug!("Emitted frame {key}");
                    self.next_expected += 1;
                    self.stats.frame_emitted();
                    emitted += 1;
                }
            }
        }
        Ok(emitted)
    }

    /// Ends the stream. Fails if frames are still waiting on a predecessor
    /// that never arrived.
    pub fn finish(self) -> Result<(W, ReorderStats)> {
        if !self.heap.is_empty() {
            let indices = self.heap.keys();
            log::error!(
                "Input ended waiting for frame {}; stranded frames: {indices:?}",
                self.next_expected
            );
            return Err(ReorderError::Stranded {
                next_expected: self.next_expected,
                indices,
            });
        }
        Ok((self.writer, self.stats))
    }

    pub fn mode(&self) -> OrderingMode {
        self.heap.mode()
    }

    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    /// Number of frames waiting in the heap.
    pub fn buffered(&self) -> usize {
        self.heap.len()
    }

    /// Sorted keys of the frames waiting in the heap.
    pub fn buffered_indices(&self) -> Vec<u64> {
        self.heap.keys()
    }

    pub fn stats(&self) -> &ReorderStats {
        &self.stats
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}
