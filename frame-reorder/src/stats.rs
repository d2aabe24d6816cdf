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

use serde::{Deserialize, Serialize};

/// Counters describing how much reordering a stream needed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderStats {
    /// Frames accepted by the controller
    pub frames_ingested: u64,
    /// Frames handed to the writer
    pub frames_emitted: u64,
    /// Frames that had to wait in the heap for a predecessor
    pub out_of_order_frames: u64,
    /// Largest heap occupancy left after draining, i.e. the observed
    /// reference window
    pub peak_buffered: usize,
    /// Largest gap between an arriving key and the next expected index
    pub max_reorder_distance: u64,
}

impl ReorderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn frame_ingested(&mut self, key: u64, next_expected: u64) {
        self.frames_ingested += 1;
        let distance = key.saturating_sub(next_expected);
        if distance > 0 {
            self.out_of_order_frames += 1;
        }
        self.max_reorder_distance = self.max_reorder_distance.max(distance);
    }

    pub(crate) fn frame_emitted(&mut self) {
        self.frames_emitted += 1;
    }

    pub(crate) fn buffer_level(&mut self, buffered: usize) {
        self.peak_buffered = self.peak_buffered.max(buffered);
    }

    /// Frames accepted but not yet emitted.
    pub fn frames_pending(&self) -> u64 {
        self.frames_ingested.saturating_sub(self.frames_emitted)
    }
}
